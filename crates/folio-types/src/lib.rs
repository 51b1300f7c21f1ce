pub mod config;
pub mod events;
pub mod message;
pub mod pin;
pub mod request;
pub mod thread;
pub mod timestamp;

pub use config::SessionConfig;
pub use events::StreamEvent;
pub use message::{Message, MessageId, MessageRole};
pub use pin::{ContextPin, HighlightContext};
pub use request::QueryRequest;
pub use thread::{Thread, ThreadId};
