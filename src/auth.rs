//! User identity for history scoping
//!
//! History records are keyed by an opaque, stable user identity supplied by
//! an authentication provider. The pipeline itself never depends on auth;
//! only history subscription and mutation do. The bundled provider signs in
//! anonymously: it mints a uuid on first use and persists it in the user
//! data directory so the same history is seen across runs.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::error::{LenslateError, Result};

/// An opaque, stable user identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned unique id
    pub uid: String,
}

/// Supplies the identity that scopes all history operations
///
/// Failures map to `AuthUnavailable`, which blocks history functionality
/// but never the translation pipeline.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current user identity, signing in anonymously if none exists yet
    async fn current_identity(&self) -> Result<Identity>;
}

/// Anonymous file-persisted identity provider
///
/// The uid lives in a plain text file; deleting the file starts a fresh
/// anonymous identity (and orphans the old history).
pub struct AnonymousAuth {
    identity_path: Option<PathBuf>,
}

impl AnonymousAuth {
    /// Create a provider storing its identity in the platform data directory
    ///
    /// Construction never fails; if no data directory can be determined,
    /// every identity request reports `AuthUnavailable` instead.
    pub fn new(app_id: &str) -> Self {
        Self {
            identity_path: ProjectDirs::from("com", "lenslate", app_id)
                .map(|dirs| dirs.data_dir().join("identity")),
        }
    }

    /// Create a provider storing its identity at the given path
    ///
    /// Primarily useful for tests.
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            identity_path: Some(path.into()),
        }
    }

    fn load_or_create(&self) -> Result<Identity> {
        let identity_path = self.identity_path.as_ref().ok_or_else(|| {
            LenslateError::AuthUnavailable("could not determine data directory".to_string())
        })?;

        if let Ok(existing) = std::fs::read_to_string(identity_path) {
            let uid = existing.trim().to_string();
            if !uid.is_empty() {
                return Ok(Identity { uid });
            }
        }

        let uid = format!("anon-{}", uuid::Uuid::new_v4());
        if let Some(parent) = identity_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LenslateError::AuthUnavailable(format!("cannot create data directory: {}", e))
            })?;
        }
        std::fs::write(identity_path, &uid).map_err(|e| {
            LenslateError::AuthUnavailable(format!("cannot persist identity: {}", e))
        })?;
        tracing::info!("Signed in anonymously as {}", uid);
        Ok(Identity { uid })
    }
}

#[async_trait]
impl AuthProvider for AnonymousAuth {
    async fn current_identity(&self) -> Result<Identity> {
        self.load_or_create()
    }
}
