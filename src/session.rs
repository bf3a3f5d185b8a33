//! Session state supplying the bearer token for service requests.

use std::time::{Duration, Instant};

use log::info;
use parking_lot::Mutex;

/// Supplies the bearer token for authenticated requests.
pub trait SessionProvider: Send + Sync {
    /// The current token, or `None` when nobody is signed in.
    fn bearer_token(&self) -> Option<String>;
}

struct SessionState {
    token: Option<String>,
    last_activity: Instant,
}

/// A signed-in session that logs itself out after a period of inactivity.
pub struct Session {
    idle_timeout: Duration,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(token: impl Into<String>, idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            state: Mutex::new(SessionState {
                token: Some(token.into()),
                last_activity: Instant::now(),
            }),
        }
    }

    /// Records user activity, postponing the idle logout.
    pub fn touch(&self) {
        let mut state = self.state.lock();
        if state.token.is_some() {
            state.last_activity = Instant::now();
        }
    }

    /// Drops the token immediately.
    pub fn logout(&self) {
        let mut state = self.state.lock();
        if state.token.take().is_some() {
            info!("Session logged out");
        }
    }

    pub fn is_active(&self) -> bool {
        self.bearer_token().is_some()
    }

    fn expire_if_idle(&self, state: &mut SessionState, now: Instant) {
        if state.token.is_some() && now.duration_since(state.last_activity) > self.idle_timeout {
            state.token = None;
            info!(
                "Session expired after {} seconds of inactivity",
                self.idle_timeout.as_secs()
            );
        }
    }
}

impl SessionProvider for Session {
    fn bearer_token(&self) -> Option<String> {
        let mut state = self.state.lock();
        self.expire_if_idle(&mut state, Instant::now());
        state.token.clone()
    }
}
