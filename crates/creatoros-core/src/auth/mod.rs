//! Authentication module for managing the bearer credential.
//!
//! This module provides:
//! - `Credential`: the bearer token attached to backend requests
//! - `TokenStore`: where the current credential lives (memory or session file)
//! - `CredentialSource`: account login credentials used to re-authenticate
//! - `RefreshGuard`: serializes re-authentication so only one login runs at a time

pub mod credentials;
pub mod refresh;
pub mod token_store;

pub use credentials::{
    CredentialSource, CredentialStore, KeyringCredentials, LoginCredentials, NoCredentials,
    StaticCredentials,
};
pub use refresh::RefreshGuard;
pub use token_store::{Credential, FileTokenStore, MemoryTokenStore, TokenStore};
