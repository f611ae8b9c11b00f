//! Session lifecycle events emitted by the client.
//!
//! The client never clears credentials itself; whoever owns the session
//! subscribes with [`ApiClientBuilder::on_session_event`](crate::ApiClientBuilder::on_session_event)
//! and decides what to forget.

use std::fmt;
use std::sync::Arc;

/// Something the session owner should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the bearer credential with HTTP 401.
    AuthExpired {
        /// The endpoint path that was rejected.
        path: String,
    },
}

type Callback = dyn Fn(&SessionEvent) + Send + Sync;

#[derive(Clone)]
pub(crate) struct SessionListener(Arc<Callback>);

impl SessionListener {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn emit(&self, event: &SessionEvent) {
        (self.0)(event);
    }
}

impl fmt::Debug for SessionListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionListener(..)")
    }
}
