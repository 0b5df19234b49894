//! Authentication for the Document AI backend
//!
//! - [`session`]     -- login, registration, logout over a credential store
//! - [`token_store`] -- durable bearer credential persistence

pub mod session;
pub mod token_store;

pub use session::AuthSession;
pub use token_store::{
    Credential, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore,
};
