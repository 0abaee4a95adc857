//! Durable storage for the single API credential
//!
//! The credential gates the whole conversation: without one the session
//! refuses to send anything and the front end shows the entry prompt.

pub mod backend;
pub mod store;

pub use backend::{CredentialBackend, FileBackend, MemoryBackend};
pub use store::{Credential, CredentialStore, CREDENTIAL_KEY, MIN_CREDENTIAL_LEN};
