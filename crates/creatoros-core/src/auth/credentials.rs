use std::fmt;

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Keychain service name the account passwords are filed under
const SERVICE_NAME: &str = "creatoros";

/// Environment variables read by `StaticCredentials::from_env`
const EMAIL_ENV: &str = "CREATOROS_EMAIL";
const PASSWORD_ENV: &str = "CREATOROS_PASSWORD";

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies the account used when the gateway has to log in again.
pub trait CredentialSource: Send + Sync {
    fn login_credentials(&self) -> Result<LoginCredentials>;
}

/// Fixed credentials, typically from configuration or the environment.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: LoginCredentials,
}

impl StaticCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: LoginCredentials::new(email, password),
        }
    }

    /// `CREATOROS_EMAIL` + `CREATOROS_PASSWORD`, when both are set
    pub fn from_env() -> Option<Self> {
        let email = std::env::var(EMAIL_ENV).ok().filter(|v| !v.is_empty())?;
        let password = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty())?;
        Some(Self::new(email, password))
    }
}

impl CredentialSource for StaticCredentials {
    fn login_credentials(&self) -> Result<LoginCredentials> {
        Ok(self.credentials.clone())
    }
}

/// No account available; every refresh fails and 401s reach the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn login_credentials(&self) -> Result<LoginCredentials> {
        Err(anyhow::anyhow!("No account configured for re-authentication"))
    }
}

/// Account passwords kept in the OS keychain.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl CredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, email: &str) -> Result<Entry> {
        Entry::new(&self.service, email).context("Failed to create keyring entry")
    }

    /// Store the password for `email` in the OS keychain
    pub fn store(&self, email: &str, password: &str) -> Result<()> {
        self.entry(email)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    pub fn password(&self, email: &str) -> Result<String> {
        self.entry(email)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    pub fn delete(&self, email: &str) -> Result<()> {
        self.entry(email)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entry(email)
            .and_then(|entry| entry.get_password().map_err(Into::into))
            .is_ok()
    }
}

/// Looks up the password for a known email in the keychain on every refresh,
/// so a password changed through `creatoros login` is picked up immediately.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    email: String,
    store: CredentialStore,
}

impl KeyringCredentials {
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_store(email, CredentialStore::default())
    }

    pub fn with_store(email: impl Into<String>, store: CredentialStore) -> Self {
        Self {
            email: email.into(),
            store,
        }
    }
}

impl CredentialSource for KeyringCredentials {
    fn login_credentials(&self) -> Result<LoginCredentials> {
        let password = self.store.password(&self.email)?;
        Ok(LoginCredentials::new(self.email.clone(), password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_credentials_debug_redacts_password() {
        let creds = LoginCredentials::new("creator@example.com", "hunter22");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("creator@example.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_login_body_shape() {
        let body = serde_json::to_value(LoginCredentials::new("a@b.c", "pw")).unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.c", "password": "pw"}));
    }

    #[test]
    fn test_static_credentials() {
        let source = StaticCredentials::new("a@b.c", "pw");
        let creds = source.login_credentials().unwrap();
        assert_eq!(creds.email, "a@b.c");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn test_no_credentials_fails() {
        assert!(NoCredentials.login_credentials().is_err());
    }
}
