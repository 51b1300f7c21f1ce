mod client;

pub use client::HttpPersistenceClient;
