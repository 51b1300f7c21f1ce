pub mod buffer_utils;
pub mod client;
pub mod decoder;
pub mod traits;

pub use buffer_utils::CircularLineBuffer;
pub use client::HttpChatBackend;
pub use decoder::{decode_stream, StreamDecoder, DATA_PREFIX};
pub use traits::{ChatBackend, EventStream};
