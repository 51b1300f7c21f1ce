pub mod accumulator;
pub mod cache;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod pins;
pub mod update;

pub use accumulator::StreamAccumulator;
pub use cache::{CacheError, MessageCache};
pub use engine::{SessionEngine, SessionHandle};
pub use error::{Result, SessionError};
pub use lifecycle::{LifecycleError, LifecycleState, NewThreadPlan, ThreadLifecycle};
pub use pins::ContextPinStore;
pub use update::{FailureReason, LoadSource, SendReceipt, SessionSnapshot, SessionUpdate, SwitchOutcome};

// Re-export key types from folio-types
pub use folio_types::{
    ContextPin, HighlightContext, Message, MessageId, MessageRole, QueryRequest, SessionConfig,
    StreamEvent, Thread, ThreadId,
};
