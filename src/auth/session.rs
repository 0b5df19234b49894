//! The client's authenticated identity
//!
//! [`AuthSession`] owns access to the one live bearer credential. The
//! [`CredentialStore`] is the single source of truth: nothing is cached in
//! memory, so `AuthSession` and every [`ApiClient`] sharing it always agree
//! on the current token.

use std::sync::Arc;

use crate::api::types::UserProfile;
use crate::api::ApiClient;
use crate::auth::token_store::{Credential, CredentialStore};
use crate::error::{DocaiError, Result};

/// Holds, persists, and clears the bearer credential.
///
/// Cloning shares the underlying store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use docai::auth::{AuthSession, Credential, MemoryCredentialStore};
///
/// let auth = AuthSession::new(Arc::new(MemoryCredentialStore::with_credential(
///     Credential::bearer("tok"),
/// )));
/// assert!(auth.is_authenticated());
/// auth.clear().unwrap();
/// assert!(!auth.is_authenticated());
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    store: Arc<dyn CredentialStore>,
}

impl AuthSession {
    /// Creates a session over `store`, restoring whatever it already holds.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Returns the current credential, if a usable one is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current_credential(&self) -> Result<Option<Credential>> {
        Ok(self.store.load()?.filter(Credential::is_usable))
    }

    /// `true` when a usable credential is stored. Storage failures count as
    /// unauthenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.current_credential(), Ok(Some(_)))
    }

    /// Returns the current credential or fails fast with
    /// [`DocaiError::NotAuthenticated`].
    pub fn require(&self) -> Result<Credential> {
        self.current_credential()?
            .ok_or_else(|| DocaiError::NotAuthenticated.into())
    }

    /// Logs in and persists the returned token as the current credential.
    ///
    /// Server errors (bad password, validation) are surfaced verbatim. No
    /// local password policy is applied.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<Credential> {
        let response = api.login(username, password).await?;
        let credential = self.persist(response.access_token, response.token_type)?;
        tracing::info!(username, "Logged in");
        Ok(credential)
    }

    /// Registers a new account and persists the returned token.
    pub async fn register(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<Credential> {
        let response = api.register(username, password).await?;
        let credential = self.persist(response.access_token, response.token_type)?;
        tracing::info!(username, "Registered new account");
        Ok(credential)
    }

    /// Fetches the profile of the authenticated user.
    pub async fn whoami(&self, api: &ApiClient) -> Result<UserProfile> {
        self.require()?;
        Ok(api.me().await?)
    }

    /// Discards the persisted credential. Later calls behave as
    /// unauthenticated until a new login succeeds.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Cleared stored credential");
        Ok(())
    }

    fn persist(&self, access_token: String, token_type: Option<String>) -> Result<Credential> {
        let mut credential = Credential::bearer(access_token);
        if let Some(token_type) = token_type {
            credential.token_type = token_type;
        }
        if !credential.is_usable() {
            return Err(DocaiError::Api(crate::api::ApiError::new(
                Some(200),
                "server returned an empty access token",
            ))
            .into());
        }
        self.store.save(&credential)?;
        Ok(credential)
    }
}
