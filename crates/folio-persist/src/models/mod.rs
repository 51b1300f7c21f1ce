mod db_message;
mod lists;

pub use db_message::DBMessage;
pub use lists::{MessageList, ThreadList};
