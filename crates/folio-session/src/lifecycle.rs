use folio_types::{Message, Thread, ThreadId};
use thiserror::Error;

use crate::cache::{CacheError, MessageCache};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Active thread is not pending")]
    NotPending,

    #[error("No thread switch in progress")]
    NotSwitching,

    #[error("A thread switch is already waiting on the pending thread")]
    SwitchInProgress,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Where the session's active thread stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    NoActiveThread,
    PendingNew,
    Active(String),
    /// Leaving `from` for `to`; held open while `from` awaits its server id
    Switching {
        from: Option<ThreadId>,
        to: ThreadId,
    },
}

impl LifecycleState {
    fn settled(thread_id: ThreadId) -> Self {
        match thread_id {
            ThreadId::Pending => LifecycleState::PendingNew,
            ThreadId::Real(id) => LifecycleState::Active(id),
        }
    }
}

/// What a "new chat" request has to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewThreadPlan {
    /// The pending thread is already active
    Reuse,
    /// No thread was active; the pending thread is now
    Create,
    /// A real thread is active and must be switched away from
    SwitchFrom(ThreadId),
}

/// State machine over the active thread identity
///
/// Owns the Pending to Real transition: `migrate` is the only way a thread
/// changes identity, and it fires at most once per pending thread.
pub struct ThreadLifecycle {
    state: LifecycleState,
    cache: MessageCache,
    migrations: u64,
}

impl ThreadLifecycle {
    pub fn new(cache: MessageCache) -> Self {
        Self {
            state: LifecycleState::NoActiveThread,
            cache,
            migrations: 0,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Thread whose messages are on screen (the source while switching)
    pub fn active(&self) -> Option<ThreadId> {
        match &self.state {
            LifecycleState::NoActiveThread => None,
            LifecycleState::PendingNew => Some(ThreadId::Pending),
            LifecycleState::Active(id) => Some(ThreadId::real(id.as_str())),
            LifecycleState::Switching { from, .. } => from.clone(),
        }
    }

    pub fn is_switching(&self) -> bool {
        matches!(self.state, LifecycleState::Switching { .. })
    }

    pub fn switch_target(&self) -> Option<&ThreadId> {
        match &self.state {
            LifecycleState::Switching { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Number of Pending to Real migrations performed
    pub fn migrations(&self) -> u64 {
        self.migrations
    }

    /// Enter the session; starts on a pending thread if nothing is active
    pub fn start_session(&mut self) -> ThreadId {
        if self.state == LifecycleState::NoActiveThread {
            self.state = LifecycleState::PendingNew;
        }
        self.active().unwrap_or(ThreadId::Pending)
    }

    /// Idempotent: never creates a second pending thread
    pub fn new_thread(&mut self) -> Result<NewThreadPlan, LifecycleError> {
        match &self.state {
            LifecycleState::PendingNew => Ok(NewThreadPlan::Reuse),
            LifecycleState::NoActiveThread => {
                self.state = LifecycleState::PendingNew;
                Ok(NewThreadPlan::Create)
            }
            LifecycleState::Active(id) => Ok(NewThreadPlan::SwitchFrom(ThreadId::real(id.as_str()))),
            LifecycleState::Switching { .. } => Err(LifecycleError::SwitchInProgress),
        }
    }

    /// Start leaving the active thread for `to`, returning the thread being left
    ///
    /// Calling again before `complete_switch` retargets the switch.
    pub fn begin_switch(&mut self, to: ThreadId) -> Option<ThreadId> {
        let from = self.active();
        self.state = LifecycleState::Switching { from: from.clone(), to };
        from
    }

    pub fn complete_switch(&mut self) -> Result<ThreadId, LifecycleError> {
        match std::mem::replace(&mut self.state, LifecycleState::NoActiveThread) {
            LifecycleState::Switching { to, .. } => {
                self.state = LifecycleState::settled(to.clone());
                Ok(to)
            }
            other => {
                self.state = other;
                Err(LifecycleError::NotSwitching)
            }
        }
    }

    /// Abandon a switch and stay on the thread being left
    pub fn cancel_switch(&mut self) -> Result<(), LifecycleError> {
        match std::mem::replace(&mut self.state, LifecycleState::NoActiveThread) {
            LifecycleState::Switching { from, .. } => {
                self.state = from.map(LifecycleState::settled).unwrap_or(LifecycleState::NoActiveThread);
                Ok(())
            }
            other => {
                self.state = other;
                Err(LifecycleError::NotSwitching)
            }
        }
    }

    /// Give the active pending thread its server identity
    ///
    /// `view` is the live message list of the pending thread. It is written
    /// to the pending slot, the slot is moved to `real_id`, and the view is
    /// retagged, so cache and view agree on the new identity afterwards.
    pub async fn migrate(
        &mut self,
        real_id: &str,
        view: &mut [Message],
    ) -> Result<ThreadId, LifecycleError> {
        let leaving_pending = matches!(
            self.state,
            LifecycleState::PendingNew
                | LifecycleState::Switching { from: Some(ThreadId::Pending), .. }
        );
        if !leaving_pending {
            return Err(LifecycleError::NotPending);
        }

        let real = ThreadId::real(real_id);
        self.cache.put(ThreadId::Pending, view.to_vec()).await;
        self.cache.migrate(&ThreadId::Pending, &real).await?;

        for message in view.iter_mut() {
            message.retag(&real);
        }

        self.state = match std::mem::replace(&mut self.state, LifecycleState::NoActiveThread) {
            LifecycleState::Switching { to, .. } => LifecycleState::Switching {
                from: Some(real.clone()),
                to,
            },
            _ => LifecycleState::Active(real_id.to_string()),
        };
        self.migrations += 1;

        tracing::info!("Pending thread acknowledged as {}", real_id);
        Ok(real)
    }

    /// Pick a new active thread after the active one was deleted
    ///
    /// Falls back to the most recently created remaining thread, or a fresh
    /// pending thread when none remain.
    pub fn rehome(&mut self, remaining: &[Thread]) -> ThreadId {
        let next = remaining
            .iter()
            .max_by_key(|t| t.created_at)
            .map(ThreadId::from)
            .unwrap_or(ThreadId::Pending);

        self.state = LifecycleState::settled(next.clone());
        tracing::debug!("Rehomed session onto {}", next);
        next
    }
}
