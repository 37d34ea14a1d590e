use serde::{Deserialize, Serialize};

use super::ProcessingJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl VideoStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // pad() so column widths apply in listings
        f.pad(match self {
            VideoStatus::Pending => "Pending",
            VideoStatus::Processing => "Processing",
            VideoStatus::Completed => "Completed",
            VideoStatus::Failed => "Failed",
            VideoStatus::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSource {
    pub id: String,
    pub youtube_url: String,
    pub title: Option<String>,
    pub status: VideoStatus,
    pub workspace_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    // Only present on GET /videos/{id}
    #[serde(default)]
    pub processing_job: Option<ProcessingJob>,
}

impl VideoSource {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(&self.youtube_url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSubmission {
    pub youtube_url: String,
}

/// Reply of `GET /videos/{id}/progress`.
///
/// `step` runs 0 to 4 and `progress` 0 to 100; both reset to 0 on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoProgress {
    pub status: VideoStatus,
    #[serde(default)]
    pub step: u8,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "currentStep", default)]
    pub current_step: Option<String>,
}

impl VideoProgress {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
