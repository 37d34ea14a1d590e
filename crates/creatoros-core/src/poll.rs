//! Waiting for processing jobs.
//!
//! Video processing runs on the backend; the client can only ask. The poller
//! fetches a job (or a video's progress) right away and then on a fixed
//! interval until it reaches a terminal status.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{JobDetails, VideoProgress};

/// Delay between checks.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// At the default interval this is ten minutes of waiting.
const DEFAULT_MAX_ATTEMPTS: u32 = 200;

pub struct JobPoller {
    client: ApiClient,
    interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Poll `job_id` until it completes or fails.
    ///
    /// `on_update` sees every successfully fetched snapshot. Failed fetches
    /// are logged and count as attempts, except `Unauthorized`, which is
    /// returned right away since the gateway has already tried to refresh.
    pub async fn wait_for_completion<F>(
        &self,
        job_id: &str,
        on_update: F,
    ) -> Result<JobDetails, ApiError>
    where
        F: FnMut(&JobDetails),
    {
        self.poll(
            job_id,
            || self.client.job(job_id),
            |details: &JobDetails| details.status().is_terminal(),
            on_update,
        )
        .await
    }

    /// Follow `GET /videos/{id}/progress` until the video completes or fails.
    ///
    /// Same attempt and error rules as `wait_for_completion`.
    pub async fn wait_for_video<F>(
        &self,
        video_id: &str,
        on_update: F,
    ) -> Result<VideoProgress, ApiError>
    where
        F: FnMut(&VideoProgress),
    {
        self.poll(
            video_id,
            || self.client.video_progress(video_id),
            VideoProgress::is_terminal,
            on_update,
        )
        .await
    }

    async fn poll<T, Fetch, Fut, F>(
        &self,
        id: &str,
        mut fetch: Fetch,
        is_terminal: fn(&T) -> bool,
        mut on_update: F,
    ) -> Result<T, ApiError>
    where
        Fetch: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        F: FnMut(&T),
    {
        // interval() panics on a zero period
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        for attempt in 1..=self.max_attempts {
            // First tick completes immediately
            ticker.tick().await;

            match fetch().await {
                Ok(snapshot) => {
                    let done = is_terminal(&snapshot);
                    debug!(id, attempt, done, "Polled");
                    on_update(&snapshot);
                    if done {
                        return Ok(snapshot);
                    }
                }
                Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                Err(e) => {
                    warn!(id, attempt, error = %e, "Polling error");
                }
            }
        }

        Err(ApiError::PollTimeout {
            id: id.to_string(),
            attempts: self.max_attempts,
        })
    }
}
