use super::backend::CredentialBackend;
use crate::{JugalError, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Fixed namespace key the credential is stored under
pub const CREDENTIAL_KEY: &str = "jugal_api_key";

/// Shortest trimmed candidate accepted as a credential
pub const MIN_CREDENTIAL_LEN: usize = 10;

/// An API key; never printed in full
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "Credential({}…)", prefix)
    }
}

pub struct CredentialStore {
    backend: Box<dyn CredentialBackend>,
    current: Option<Credential>,
}

impl CredentialStore {
    /// Open the store, picking up whatever the backend already holds
    pub fn new(backend: impl CredentialBackend + 'static) -> Self {
        let current = match backend.load(CREDENTIAL_KEY) {
            Ok(Some(value)) if !value.trim().is_empty() => {
                debug!("Loaded stored credential");
                Some(Credential(value))
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read stored credential: {}", e);
                None
            }
        };

        Self {
            backend: Box::new(backend),
            current,
        }
    }

    pub fn get(&self) -> Option<&Credential> {
        self.current.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.current.is_some()
    }

    /// Validate and persist a candidate. Rejected candidates leave the store untouched.
    pub fn set(&mut self, candidate: &str) -> Result<Credential> {
        let trimmed = candidate.trim();
        if trimmed.chars().count() < MIN_CREDENTIAL_LEN {
            return Err(JugalError::InvalidCredential(format!(
                "expected at least {} characters",
                MIN_CREDENTIAL_LEN
            )));
        }

        self.backend.save(CREDENTIAL_KEY, trimmed)?;
        let credential = Credential(trimmed.to_string());
        self.current = Some(credential.clone());
        info!("Credential stored");
        Ok(credential)
    }

    /// Forget the credential. The in-memory value is dropped even if the backend fails.
    pub fn clear(&mut self) -> Result<()> {
        self.current = None;
        self.backend.remove(CREDENTIAL_KEY)?;
        info!("Credential removed");
        Ok(())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("current", &self.current)
            .finish()
    }
}
