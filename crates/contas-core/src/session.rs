//! Explicit session state, injected into every operation needing identity.
//!
//! The lifecycle is anonymous, then authenticated, then anonymous again,
//! driven by explicit calls. Out-of-band changes (token refresh, remote
//! sign-out) arrive through the same two calls and fan out to registered
//! listeners, so no service ever reads ambient global auth state.

use std::sync::{Mutex, RwLock};

use uuid::Uuid;

use crate::error::CoreError;

/// Minimum accepted password length on the sign-in form.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Uuid),
}

impl AuthState {
    pub fn user_id(self) -> Option<Uuid> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(user_id) => Some(user_id),
        }
    }
}

type SessionListener = Box<dyn Fn(AuthState) + Send + Sync>;

/// Shared session handle. Cheap to pass by reference into services; the
/// auth transport updates it and interested screens register listeners.
pub struct Session {
    state: RwLock<AuthState>,
    listeners: Mutex<Vec<SessionListener>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            state: RwLock::new(AuthState::Anonymous),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            state: RwLock::new(AuthState::Authenticated(user_id)),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> AuthState {
        *self.state.read().unwrap()
    }

    pub fn current_user(&self) -> Option<Uuid> {
        self.state().user_id()
    }

    /// Marks the session as signed in and notifies listeners. Also used by
    /// the transport when a refreshed token resolves to a (new) identity.
    pub fn authenticate(&self, user_id: Uuid) {
        self.transition(AuthState::Authenticated(user_id));
    }

    pub fn sign_out(&self) {
        self.transition(AuthState::Anonymous);
    }

    /// Registers a listener invoked on every state transition.
    pub fn on_change(&self, listener: impl Fn(AuthState) + Send + Sync + 'static) {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    fn transition(&self, next: AuthState) {
        {
            let mut state = self.state.write().unwrap();
            if *state == next {
                return;
            }
            *state = next;
        }
        for listener in self.listeners.lock().unwrap().iter() {
            listener(next);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Pre-validates sign-in input before the auth transport is involved.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(CoreError::InvalidCredentials(
            "email and password are required".into(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CoreError::InvalidCredentials(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
