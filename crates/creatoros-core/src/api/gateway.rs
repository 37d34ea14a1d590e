//! Authenticated request gateway.
//!
//! Every call carries the stored bearer credential when there is one. A 401
//! reply triggers one re-authentication through the `RefreshGuard` and, if a
//! new credential comes back, exactly one resend. Anything else, including a
//! second 401, is returned to the caller as is.

use std::sync::Arc;

use anyhow::Context;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::auth::{Credential, CredentialSource, LoginCredentials, RefreshGuard, TokenStore};
use crate::config::Config;
use crate::models::AuthToken;

use super::{ApiError, ApiResponse, HttpRequest, ReqwestTransport, RequestOptions, Transport};

/// Login endpoint, relative to the base URL
const LOGIN_PATH: &str = "/auth/login";

/// Cheap to clone; clones share the transport, token store and refresh guard.
#[derive(Clone)]
pub struct Gateway {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    credentials: Arc<dyn CredentialSource>,
    guard: Arc<RefreshGuard>,
}

impl Gateway {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            transport,
            store,
            credentials,
            guard: Arc::new(RefreshGuard::default()),
        }
    }

    /// Gateway over a `reqwest` transport configured from `config`
    pub fn from_config(
        config: &Config,
        store: Arc<dyn TokenStore>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        Ok(Self::new(&config.base_url(), transport, store, credentials)
            .with_refresh_guard(Arc::new(RefreshGuard::new(config.refresh_wait()))))
    }

    /// Share a refresh guard with other gateways using the same token store
    pub fn with_refresh_guard(mut self, guard: Arc<RefreshGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn refresh_guard(&self) -> &Arc<RefreshGuard> {
        &self.guard
    }

    /// Absolute URLs pass through; anything else is appended to the base URL.
    pub fn resolve_url(&self, path_or_url: &str) -> Result<Url, ApiError> {
        let target = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else if path_or_url.starts_with('/') {
            format!("{}{}", self.base_url, path_or_url)
        } else {
            format!("{}/{}", self.base_url, path_or_url)
        };

        Url::parse(&target).map_err(|e| ApiError::InvalidUrl {
            url: target.clone(),
            reason: e.to_string(),
        })
    }

    /// Send a request with the stored credential, refreshing it once on 401.
    ///
    /// A 401 that survives the refresh (or a refresh that yields nothing) is
    /// returned as an `Ok` response. Transport errors are returned unretried.
    pub async fn request(
        &self,
        path_or_url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.resolve_url(path_or_url)?;

        // Taken before sending so a refresh finishing while we wait on the
        // response is recognised as newer than our credential.
        let observed = self.guard.generation();
        let credential = self.store.get();

        let response = self.send(&url, &options, credential.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(method = %options.method, url = %url, had_credential = credential.is_some(), "Unauthorized, refreshing credential");
        match self.refresh_since(observed).await {
            Some(fresh) => {
                debug!(url = %url, "Retrying with refreshed credential");
                self.send(&url, &options, Some(&fresh)).await
            }
            None => Ok(response),
        }
    }

    /// Log in again with the configured account.
    ///
    /// Concurrent callers share a single login: whoever arrives while one is
    /// in flight waits for it and gets its result. Failures are logged and
    /// yield `None`, leaving the stored credential untouched.
    pub async fn refresh_credential(&self) -> Option<Credential> {
        self.refresh_since(self.guard.generation()).await
    }

    async fn refresh_since(&self, observed: u64) -> Option<Credential> {
        self.guard
            .run(
                observed,
                || self.store.get(),
                || async {
                    match self.reauthenticate().await {
                        Ok(credential) => {
                            if let Err(e) = self.store.set(credential.clone()) {
                                warn!(error = %e, "Failed to persist refreshed credential");
                            }
                            info!("Credential refreshed");
                            Some(credential)
                        }
                        Err(e) => {
                            let reason = format!("{:#}", e);
                            warn!(error = %reason, "Credential refresh failed");
                            None
                        }
                    }
                },
            )
            .await
    }

    /// Store a credential obtained outside the refresh path, such as an
    /// explicit login.
    ///
    /// It is published through the refresh guard, so a request that got a 401
    /// before this call picks the new credential up instead of the outcome of
    /// an earlier refresh.
    pub async fn install_credential(&self, credential: Credential) -> anyhow::Result<()> {
        self.guard
            .publish(credential.clone(), || self.store.set(credential))
            .await
    }

    async fn reauthenticate(&self) -> anyhow::Result<Credential> {
        let credentials = self
            .credentials
            .login_credentials()
            .context("No login credentials available")?;
        let credential = self
            .login(&credentials)
            .await
            .context("Login request failed")?;
        Ok(credential)
    }

    /// `POST /auth/login` without touching the token store.
    pub(crate) async fn login(&self, credentials: &LoginCredentials) -> Result<Credential, ApiError> {
        let url = self.resolve_url(LOGIN_PATH)?;
        let options = RequestOptions::post().json(credentials)?;

        let response = self.send(&url, &options, None).await?.error_for_status()?;
        let token: AuthToken = response.json()?;
        if token.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response carried an empty access_token".to_string(),
            ));
        }
        Ok(Credential::from(token))
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        credential: Option<&Credential>,
    ) -> Result<ApiResponse, ApiError> {
        let mut headers = options.headers.clone();
        if let Some(credential) = credential {
            let mut value = HeaderValue::from_str(&credential.bearer()).map_err(|_| {
                ApiError::InvalidRequest("Stored credential is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        self.transport
            .send(HttpRequest {
                method: options.method.clone(),
                url: url.clone(),
                headers,
                body: options.body.clone(),
            })
            .await
    }
}
