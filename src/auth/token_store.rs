//! Durable bearer credential persistence
//!
//! The bearer token is the only client state that must survive a restart.
//! [`CredentialStore`] abstracts where it lives; three backends are provided:
//!
//! - [`FileCredentialStore`] -- a JSON file in the user's data directory
//!   (default).
//! - [`KeyringCredentialStore`] -- the operating system's native credential
//!   store (Keychain on macOS, Secret Service on Linux, Windows Credential
//!   Manager on Windows).
//! - [`MemoryCredentialStore`] -- process-local storage for tests and
//!   throwaway clients.
//!
//! Every backend replaces the credential wholesale: readers observe either
//! the previous token or the new one, never a partially written value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{DocaiError, Result};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// An opaque bearer credential issued by `/login` or `/register`.
///
/// The token is never printed by `Debug`.
///
/// # Examples
///
/// ```
/// use docai::auth::token_store::Credential;
///
/// let credential = Credential::bearer("abc123");
/// assert_eq!(credential.access_token, "abc123");
/// assert_eq!(credential.authorization_header(), "Bearer abc123");
/// assert!(!format!("{:?}", credential).contains("abc123"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token string issued by the backend.
    pub access_token: String,

    /// The token type, typically `"bearer"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Credential {
    /// Builds a bearer credential from a raw token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
        }
    }

    /// Value for the `Authorization` header.
    ///
    /// The scheme is always `Bearer` regardless of the casing the server
    /// used in `token_type`.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// A credential with an empty or whitespace token is never attached.
    pub fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Durable storage for the single live credential of a client instance.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Loads the stored credential.
    ///
    /// Returns `Ok(None)` when nothing has been saved, so callers can
    /// distinguish "not logged in" from a storage failure.
    fn load(&self) -> Result<Option<Credential>>;

    /// Replaces the stored credential.
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Removes the stored credential. A no-op when nothing is stored.
    fn clear(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// Stores the credential as JSON in a single file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a concurrent reader never sees a torn token.
///
/// # Examples
///
/// ```
/// use docai::auth::token_store::{Credential, CredentialStore, FileCredentialStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileCredentialStore::new(dir.path().join("credential.json"));
/// store.save(&Credential::bearer("tok")).unwrap();
/// assert_eq!(store.load().unwrap().unwrap().access_token, "tok");
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store in the platform data directory
    /// (e.g. `~/.local/share/docai/credential.json`).
    pub fn in_data_dir() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "docai", "docai")
            .ok_or_else(|| DocaiError::Storage("Could not determine data directory".into()))?;
        Ok(Self::new(proj_dirs.data_dir().join("credential.json")))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credential".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DocaiError::Io(e).into()),
        };
        let credential: Credential = serde_json::from_str(&contents)?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DocaiError::Storage(format!("Failed to create credential directory: {}", e))
            })?;
        }

        let json_str = serde_json::to_string(credential)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json_str)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocaiError::Io(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyringCredentialStore
// ---------------------------------------------------------------------------

/// Stores the credential in the OS native keyring.
///
/// The credential is serialized to JSON and kept under a service name
/// derived from the backend URL, so logins against different servers do not
/// collide.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl KeyringCredentialStore {
    /// Creates a keyring accessor for the given backend base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            service: Self::service_name(base_url),
            account: "default".to_string(),
        }
    }

    /// Builds the keyring service name for a backend.
    ///
    /// The name is prefixed with `docai-` to avoid collisions with other
    /// applications that use the same keyring.
    fn service_name(base_url: &str) -> String {
        format!("docai-{}", base_url.trim_end_matches('/'))
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account).map_err(|e| DocaiError::Keyring(e).into())
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match self.entry()?.get_password() {
            Ok(json_str) => {
                let credential: Credential = serde_json::from_str(&json_str)?;
                Ok(Some(credential))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(DocaiError::Keyring(e).into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let json_str = serde_json::to_string(credential)?;
        self.entry()?
            .set_password(&json_str)
            .map_err(DocaiError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(DocaiError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// Process-local credential storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| DocaiError::Storage("credential lock poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| DocaiError::Storage("credential lock poisoned".into()))?;
        *slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| DocaiError::Storage("credential lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
