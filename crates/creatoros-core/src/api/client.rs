//! Typed client for the CreatorOS backend.
//!
//! Every method goes through `Gateway::request`, so calls carry the stored
//! credential and survive a token expiry. Non-2xx replies become `ApiError`s.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{Credential, LoginCredentials};
use crate::models::{
    ApiMessage, CheckoutRequest, CheckoutSession, ContentAsset, JobDetails, PortalSession,
    ProcessingAllowance, RegisterData, Subscription, Transcript, UsageReport, User, VideoProgress,
    VideoSource, VideoSubmission, Workspace, WorkspaceWithVideos,
};

use super::{ApiError, ApiResponse, Gateway, RequestOptions};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Clone)]
pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Send through the gateway. Idempotent GETs back off and retry on 429.
    async fn execute(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.gateway.request(path, options.clone()).await?;

            let rate_limited = response.status().as_u16() == 429;
            if !rate_limited || options.method != Method::GET {
                return response.error_for_status();
            }

            retries += 1;
            if retries > MAX_RATE_LIMIT_RETRIES {
                return Err(ApiError::RateLimited);
            }
            warn!(path = path, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms *= 2;
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(path, RequestOptions::get()).await?.json()
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(path, RequestOptions::post().json(body)?).await?.json()
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(path, RequestOptions::delete()).await?.json()
    }

    // ===== Account =====

    /// Log in with explicit credentials and store the resulting token
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Credential, ApiError> {
        let credential = self.gateway.login(credentials).await?;
        self.gateway
            .install_credential(credential.clone())
            .await
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;
        debug!(email = %credentials.email, "Logged in");
        Ok(credential)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<ApiMessage, ApiError> {
        self.post("/auth/register", data).await
    }

    /// Forget the stored credential. The backend keeps no session to end.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.gateway
            .token_store()
            .remove()
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    // ===== Workspaces =====

    pub async fn workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        self.get("/workspaces").await
    }

    pub async fn create_workspace(&self, name: &str) -> Result<ApiMessage, ApiError> {
        self.post("/workspaces", &serde_json::json!({ "name": name })).await
    }

    pub async fn workspace(&self, workspace_id: &str) -> Result<WorkspaceWithVideos, ApiError> {
        self.get(&format!("/workspaces/{}", workspace_id)).await
    }

    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<ApiMessage, ApiError> {
        self.delete(&format!("/workspaces/{}", workspace_id)).await
    }

    // ===== Videos =====

    pub async fn submit_video(&self, workspace_id: &str, youtube_url: &str) -> Result<ApiMessage, ApiError> {
        let submission = VideoSubmission {
            youtube_url: youtube_url.to_string(),
        };
        self.post(&format!("/workspaces/{}/videos", workspace_id), &submission)
            .await
    }

    pub async fn workspace_videos(&self, workspace_id: &str) -> Result<Vec<VideoSource>, ApiError> {
        self.get(&format!("/workspaces/{}/videos", workspace_id)).await
    }

    pub async fn video(&self, video_id: &str) -> Result<VideoSource, ApiError> {
        self.get(&format!("/videos/{}", video_id)).await
    }

    pub async fn delete_video(&self, video_id: &str) -> Result<ApiMessage, ApiError> {
        self.delete(&format!("/videos/{}", video_id)).await
    }

    pub async fn video_progress(&self, video_id: &str) -> Result<VideoProgress, ApiError> {
        self.get(&format!("/videos/{}/progress", video_id)).await
    }

    // ===== Jobs & generated content =====

    pub async fn job(&self, job_id: &str) -> Result<JobDetails, ApiError> {
        self.get(&format!("/jobs/{}", job_id)).await
    }

    pub async fn job_assets(&self, job_id: &str) -> Result<Vec<ContentAsset>, ApiError> {
        self.get(&format!("/jobs/{}/assets", job_id)).await
    }

    pub async fn job_transcript(&self, job_id: &str) -> Result<Transcript, ApiError> {
        self.get(&format!("/jobs/{}/transcript", job_id)).await
    }

    pub async fn asset(&self, asset_id: &str) -> Result<ContentAsset, ApiError> {
        self.get(&format!("/jobs/assets/{}", asset_id)).await
    }

    // ===== Usage & billing =====

    pub async fn usage(&self) -> Result<UsageReport, ApiError> {
        self.get("/usage/current").await
    }

    pub async fn can_process(&self) -> Result<ProcessingAllowance, ApiError> {
        self.get("/usage/can-process").await
    }

    pub async fn subscription(&self) -> Result<Subscription, ApiError> {
        self.get("/billing/subscription").await
    }

    /// Start a Stripe checkout; open `session_url` to pay
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ApiError> {
        self.post("/billing/create-checkout-session", request).await
    }

    pub async fn create_portal_session(&self, return_url: &str) -> Result<PortalSession, ApiError> {
        self.post(
            "/billing/create-portal-session",
            &serde_json::json!({ "return_url": return_url }),
        )
        .await
    }

    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        self.get("/health").await
    }
}
