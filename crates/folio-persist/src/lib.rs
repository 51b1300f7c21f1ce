pub mod builder;
pub mod error;
pub mod http;
pub mod memory;
pub mod models;
pub mod trait_client;

pub use builder::HttpPersistenceClientBuilder;
pub use error::{PersistError, Result};
pub use http::HttpPersistenceClient;
pub use memory::InMemoryPersistenceClient;
pub use models::{DBMessage, MessageList, ThreadList};
pub use trait_client::PersistenceClient;
