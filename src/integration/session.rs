//! Conversation session: the orchestrator between the user, the credential
//! store, the language responder and the voice adapters
//!
//! All state changes go through the methods here, each of which runs to
//! completion before the next event is handled. A responder call is split in
//! two halves so a front end can await it without holding the session:
//!
//! 1. [`ConversationSession::submit`] records the user turn, enters the
//!    awaiting state and hands back a [`PendingRequest`].
//! 2. The front end runs [`PendingRequest::execute`] and passes the outcome
//!    to [`ConversationSession::complete`].
//!
//! [`ConversationSession::send`] does both in one call.
//!
//! Dropping a [`PendingRequest`] without completing it (including cancelling
//! a `send` future) returns the session to idle.

use crate::credentials::{Credential, CredentialStore, FileBackend};
use crate::integration::config::{AppConfig, SessionConfig, StaleResponsePolicy};
use crate::integration::state::{SessionSnapshot, SessionState, SharedSessionState};
use crate::llm::{cleared_welcome_text, welcome_text, GeminiResponder, Responder};
use crate::messages::{Message, Turn};
use crate::speech::{
    Language, RecognitionEvent, SpeechEvent, SpeechSynthesizer, TTSConfig, VoiceInput, VoiceOutput,
};
use crate::utils::EventBus;
use crate::{JugalError, Result, APOLOGY_TEXT};
use crossbeam_channel::Receiver;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Notifications for front ends. State itself is read from the snapshot.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// Something in the session state changed (trigger a repaint)
    StateChanged,
    /// A turn was added to the log
    MessageAppended(Message),
    /// The credential is gone; show the entry prompt with `error`, if any
    CredentialRequired { error: Option<String> },
    /// Blocking notice for the user, e.g. a missing platform capability
    Notice(String),
}

/// A responder call that has been recorded but not yet answered
#[must_use = "an unanswered request keeps the session awaiting until it is completed or dropped"]
pub struct PendingRequest {
    id: Uuid,
    generation: u64,
    credential: Credential,
    prompt: String,
    history: Vec<Turn>,
    started: Instant,
    state: SharedSessionState,
}

impl PendingRequest {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Prior turns sent along with the prompt
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub async fn execute(&self, responder: &dyn Responder) -> Result<String> {
        responder
            .generate(&self.credential, &self.prompt, &self.history)
            .await
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("prompt", &self.prompt)
            .field("history", &self.history.len())
            .finish()
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        // No-op once completed; otherwise the call was abandoned
        if self.state.write().settle_request(self.id) {
            warn!("Request {} dropped before completion", self.id);
        }
    }
}

pub struct ConversationSession {
    state: SharedSessionState,
    credentials: CredentialStore,
    responder: Arc<dyn Responder>,
    voice_input: VoiceInput,
    voice_output: VoiceOutput,
    events: EventBus<SessionEvent>,
    stale_responses: StaleResponsePolicy,
    /// Bumped whenever the log is replaced; tags requests with the log they belong to
    generation: u64,
}

impl ConversationSession {
    /// Create a session with no voice capabilities
    pub fn new(
        config: &SessionConfig,
        credentials: CredentialStore,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let mut state = SessionState::new(config.language);
        state.messages.add(Message::welcome(welcome_text()));
        state.has_credential = credentials.is_present();

        Self {
            state: SharedSessionState::new(state),
            credentials,
            responder,
            voice_input: VoiceInput::unsupported(config.language),
            voice_output: VoiceOutput::unsupported(),
            events: EventBus::new(),
            stale_responses: config.stale_responses,
            generation: 0,
        }
    }

    /// Session wired to the on-disk credential file and the hosted model
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let path = config.credential_path()?;
        info!("Using credential file {}", path.display());

        let credentials = CredentialStore::new(FileBackend::new(path));
        let responder = Arc::new(GeminiResponder::new(config.llm.clone()));
        Ok(Self::new(&config.session, credentials, responder).with_tts_config(config.tts.clone()))
    }

    /// Pitch and rate for everything spoken from now on
    pub fn with_tts_config(mut self, config: TTSConfig) -> Self {
        self.voice_output.set_config(config);
        self
    }

    /// Speak through `synthesizer` with the session's pitch and rate
    pub fn with_synthesizer(self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        let config = self.voice_output.config().clone();
        self.with_voice_output(VoiceOutput::new(synthesizer, config))
    }

    pub fn with_voice_input(mut self, mut voice_input: VoiceInput) -> Self {
        voice_input.set_language(self.state.language());
        self.voice_input = voice_input;
        self
    }

    pub fn with_voice_output(mut self, voice_output: VoiceOutput) -> Self {
        self.voice_output = voice_output;
        self
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn responder(&self) -> Arc<dyn Responder> {
        self.responder.clone()
    }

    pub fn is_gated(&self) -> bool {
        !self.credentials.is_present()
    }

    // === Credential gate ===

    pub fn save_credential(&mut self, candidate: &str) -> Result<()> {
        match self.credentials.set(candidate) {
            Ok(_) => {
                {
                    let mut s = self.state.write();
                    s.has_credential = true;
                    s.credential_error = None;
                }
                self.events.publish(SessionEvent::StateChanged);
                Ok(())
            }
            Err(e) => {
                warn!("Credential rejected: {}", e);
                let message = e.user_message();
                self.state.write().credential_error = Some(message.clone());
                self.events.publish(SessionEvent::CredentialRequired {
                    error: Some(message),
                });
                Err(e)
            }
        }
    }

    /// Forget the credential and the conversation
    pub fn remove_credential(&mut self) {
        if let Err(e) = self.credentials.clear() {
            error!("Failed to remove stored credential: {}", e);
        }
        self.generation += 1;
        {
            let mut s = self.state.write();
            s.messages.clear();
            s.has_credential = false;
            s.credential_error = None;
        }
        self.events
            .publish(SessionEvent::CredentialRequired { error: None });
        self.events.publish(SessionEvent::StateChanged);
    }

    // === Conversation ===

    /// Replace the log with a fresh welcome message
    pub fn reset_conversation(&mut self) {
        self.generation += 1;
        self.state
            .write()
            .messages
            .replace_with(Message::welcome(cleared_welcome_text()));
        debug!("Conversation reset (generation {})", self.generation);
        self.events.publish(SessionEvent::StateChanged);
    }

    pub fn set_language(&mut self, language: Language) {
        self.voice_input.set_language(language);
        self.state.write().language = language;
        debug!("Language set to {}", language);
        self.events.publish(SessionEvent::StateChanged);
    }

    pub fn set_input(&mut self, text: &str) {
        self.state.write().input = text.to_string();
        self.events.publish(SessionEvent::StateChanged);
    }

    /// Send whatever is in the input buffer
    pub fn submit_input(&mut self) -> Option<PendingRequest> {
        let text = self.state.input();
        self.submit(&text)
    }

    /// Record a user turn and start a responder call.
    ///
    /// Returns `None` without touching state when the text is blank, there is
    /// no credential, or a call is already outstanding. The text is kept as typed.
    pub fn submit(&mut self, text: &str) -> Option<PendingRequest> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }

        let Some(credential) = self.credentials.get().cloned() else {
            debug!("Ignoring submission without a credential");
            return None;
        };

        if self.state.is_pending() {
            warn!("Cannot submit: a response is still pending");
            return None;
        }

        // The submitted text already stands in for the recording's transcript
        if self.voice_input.is_listening() {
            self.voice_input.stop();
        }

        let id = Uuid::new_v4();
        let message = Message::user(text);
        let history = {
            let mut s = self.state.write();
            let history = s.messages.history();
            s.messages.add(message.clone());
            s.input.clear();
            s.is_recording = false;
            s.begin_request(id);
            history
        };

        let request = PendingRequest {
            id,
            generation: self.generation,
            credential,
            prompt: text.to_string(),
            history,
            started: Instant::now(),
            state: self.state.clone(),
        };
        debug!(
            "Submitted request {} with {} prior turns",
            request.id,
            request.history.len()
        );

        self.events.publish(SessionEvent::MessageAppended(message));
        self.events.publish(SessionEvent::StateChanged);
        Some(request)
    }

    /// Apply the outcome of a responder call
    pub fn complete(&mut self, request: PendingRequest, result: Result<String>) {
        if !self.state.write().settle_request(request.id) {
            warn!("Ignoring completion for unknown request {}", request.id);
            return;
        }

        let elapsed_ms = request.started.elapsed().as_millis();
        let stale = request.generation != self.generation;

        match result {
            Err(JugalError::QuotaExceeded) => {
                warn!("Quota exceeded after {}ms", elapsed_ms);
                self.expire_credential(&request.credential);
            }
            _ if stale && self.stale_responses == StaleResponsePolicy::Discard => {
                debug!("Discarding stale response for request {}", request.id);
            }
            Ok(text) => {
                debug!("Response received in {}ms", elapsed_ms);
                self.append(Message::assistant(text));
            }
            Err(e) => {
                error!("Request failed after {}ms: {}", elapsed_ms, e);
                self.append(Message::error(APOLOGY_TEXT));
            }
        }

        self.events.publish(SessionEvent::StateChanged);
    }

    /// Give up on a request without recording any outcome
    pub fn abandon(&mut self, request: PendingRequest) {
        let was_pending = self.state.is_pending();
        debug!("Abandoning request {}", request.id);
        drop(request);
        if was_pending && !self.state.is_pending() {
            self.events.publish(SessionEvent::StateChanged);
        }
    }

    /// Submit `text`, await the responder and apply the outcome.
    ///
    /// Returns whether a request was made. Cancelling the future abandons the call.
    pub async fn send(&mut self, text: &str) -> bool {
        let Some(request) = self.submit(text) else {
            return false;
        };
        let responder = self.responder.clone();
        let result = request.execute(responder.as_ref()).await;
        self.complete(request, result);
        true
    }

    fn append(&mut self, message: Message) {
        self.state.write().messages.add(message.clone());
        self.events.publish(SessionEvent::MessageAppended(message));
    }

    fn expire_credential(&mut self, used: &Credential) {
        // A key entered while the request was in flight is not the one that ran out
        if self.credentials.get() != Some(used) {
            debug!("Quota failure for a credential that is no longer current");
            return;
        }

        if let Err(e) = self.credentials.clear() {
            error!("Failed to remove exhausted credential: {}", e);
        }
        let message = JugalError::QuotaExceeded.user_message();
        {
            let mut s = self.state.write();
            s.has_credential = false;
            s.credential_error = Some(message.clone());
        }
        self.events.publish(SessionEvent::CredentialRequired {
            error: Some(message),
        });
    }

    fn notify_failure(&self, err: &JugalError) {
        if matches!(err, JugalError::CapabilityUnsupported(_)) {
            self.events
                .publish(SessionEvent::Notice(err.user_message()));
        }
    }

    // === Voice input ===

    /// Stop an active recording, or start one (silencing playback first)
    pub fn toggle_recording(&mut self) -> Result<()> {
        if self.voice_input.is_listening() {
            self.voice_input.stop();
            self.state.write().is_recording = false;
            self.events.publish(SessionEvent::StateChanged);
            return Ok(());
        }

        if !self.voice_input.is_supported() {
            let e = JugalError::CapabilityUnsupported("speech recognition".to_string());
            warn!("Cannot record: {}", e);
            self.notify_failure(&e);
            return Err(e);
        }

        self.stop_speaking();

        if let Err(e) = self.voice_input.start() {
            error!("Failed to start recording: {}", e);
            self.notify_failure(&e);
            return Err(e);
        }

        self.state.write().is_recording = true;
        self.events.publish(SessionEvent::StateChanged);
        Ok(())
    }

    /// Feed a recognizer callback. A finished transcript is submitted at once.
    pub fn handle_recognition_event(&mut self, event: RecognitionEvent) -> Option<PendingRequest> {
        let transcript = self.voice_input.handle_event(event);

        if !self.voice_input.is_listening() && self.state.is_recording() {
            self.state.write().is_recording = false;
            self.events.publish(SessionEvent::StateChanged);
        }

        let transcript = transcript?;
        debug!("Transcript received: {}", transcript);
        self.set_input(&transcript);
        self.submit(&transcript)
    }

    // === Voice output ===

    /// Read `text` aloud in the current language
    pub fn speak(&mut self, text: &str) -> Result<()> {
        let language = self.state.language();
        if let Err(e) = self.voice_output.speak(text, language) {
            error!("Failed to speak: {}", e);
            self.notify_failure(&e);
            return Err(e);
        }
        self.sync_speaking();
        Ok(())
    }

    /// Read a logged message aloud
    pub fn speak_message(&mut self, id: Uuid) -> Result<()> {
        let text = self.state.read().messages.get(id).map(|m| m.text.clone());
        match text {
            Some(text) => self.speak(&text),
            None => {
                warn!("Cannot speak unknown message {}", id);
                Ok(())
            }
        }
    }

    pub fn stop_speaking(&mut self) {
        self.voice_output.cancel();
        self.sync_speaking();
    }

    /// Feed a synthesizer callback
    pub fn handle_speech_event(&mut self, event: SpeechEvent) {
        self.voice_output.handle_event(event);
        self.sync_speaking();
    }

    fn sync_speaking(&mut self) {
        let speaking = self.voice_output.is_speaking();
        let changed = {
            let mut s = self.state.write();
            let changed = s.is_speaking != speaking;
            s.is_speaking = speaking;
            changed
        };
        if changed {
            self.events.publish(SessionEvent::StateChanged);
        }
    }
}
