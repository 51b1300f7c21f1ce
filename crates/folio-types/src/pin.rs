use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-selected excerpt queued for the next outgoing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPin {
    pub id: Uuid,
    pub text: String,
    pub page: u32,
}

impl ContextPin {
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            page,
        }
    }
}

/// Wire form of a pinned excerpt inside a query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightContext {
    pub text: String,
    pub page: u32,
}

impl From<&ContextPin> for HighlightContext {
    fn from(pin: &ContextPin) -> Self {
        Self {
            text: pin.text.clone(),
            page: pin.page,
        }
    }
}
