//! Conversation session state
//!
//! `SessionState` is the single source of truth for what a front end
//! renders. Only `ConversationSession` mutates it; readers take a
//! `SessionSnapshot` or a read lock through `SharedSessionState`.

use crate::messages::{Message, MessageLog};
use crate::speech::Language;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Whether a responder call is outstanding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingResponse,
}

impl RequestState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, RequestState::AwaitingResponse)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestState::Idle => write!(f, "Idle"),
            RequestState::AwaitingResponse => write!(f, "AwaitingResponse"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub messages: MessageLog,
    pub request: RequestState,
    pub is_recording: bool,
    pub is_speaking: bool,
    pub language: Language,
    /// Text typed but not yet sent
    pub input: String,
    pub has_credential: bool,
    /// Shown next to the credential prompt
    pub credential_error: Option<String>,
    /// Id of the outstanding responder call
    pub(crate) in_flight: Option<Uuid>,
}

impl SessionState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Default::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.request.is_awaiting()
    }

    pub(crate) fn begin_request(&mut self, id: Uuid) {
        self.in_flight = Some(id);
        self.request = RequestState::AwaitingResponse;
    }

    /// Return to idle if `id` is the outstanding call. False for unknown ids.
    pub(crate) fn settle_request(&mut self, id: Uuid) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.in_flight = None;
        self.request = RequestState::Idle;
        true
    }

    /// Conversation actions require a credential
    pub fn is_gated(&self) -> bool {
        !self.has_credential
    }

    pub fn input_disabled(&self) -> bool {
        self.is_pending() || self.is_recording
    }

    /// Whether the send affordance is active
    pub fn can_send(&self) -> bool {
        (!self.input.trim().is_empty() || self.is_recording) && !self.is_pending()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.get_all(),
            pending_request: self.is_pending(),
            is_recording: self.is_recording,
            is_speaking: self.is_speaking,
            language: self.language,
            input: self.input.clone(),
            has_credential: self.has_credential,
            credential_error: self.credential_error.clone(),
        }
    }
}

/// Immutable copy of the session state, detached from the lock
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub pending_request: bool,
    pub is_recording: bool,
    pub is_speaking: bool,
    pub language: Language,
    pub input: String,
    pub has_credential: bool,
    pub credential_error: Option<String>,
}

#[derive(Clone, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.read().is_pending()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.read().is_recording
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.read().is_speaking
    }

    pub fn is_gated(&self) -> bool {
        self.inner.read().is_gated()
    }

    pub fn message_count(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn language(&self) -> Language {
        self.inner.read().language
    }

    pub fn input(&self) -> String {
        self.inner.read().input.clone()
    }

    pub fn credential_error(&self) -> Option<String> {
        self.inner.read().credential_error.clone()
    }
}
