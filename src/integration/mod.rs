//! Session integration layer
//!
//! Connects the credential store, the language responder and the voice
//! adapters behind a single conversation session: Input -> Responder -> Log -> Voice

pub mod config;
pub mod session;
pub mod state;

pub use config::{
    default_config_dir, AppConfig, SessionConfig, StaleResponsePolicy, StorageConfig,
    CONFIG_FILE_NAME,
};
pub use session::{ConversationSession, PendingRequest, SessionEvent};
pub use state::{RequestState, SessionSnapshot, SessionState, SharedSessionState};
