use serde::{Deserialize, Serialize};

use super::VideoSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Started,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// No further updates expected once a job reaches this status
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Started => write!(f, "Started"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
            JobStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    pub id: String,
    pub status: JobStatus,
    pub video_source_id: Option<String>,
    pub temporal_workflow_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: ProcessingJob,
    #[serde(default)]
    pub video_source: Option<VideoSource>,
    #[serde(default)]
    pub transcript: Option<Transcript>,
    #[serde(default)]
    pub content_assets: Vec<ContentAsset>,
}

impl JobDetails {
    pub fn status(&self) -> JobStatus {
        self.job.status
    }

    pub fn asset(&self, kind: AssetType) -> Option<&ContentAsset> {
        self.content_assets.iter().find(|a| a.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    BlogPost,
    TwitterThread,
    LinkedinPost,
    Newsletter,
    VideoHighlights,
    Clips,
    Tiktok,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetType::BlogPost => "Blog Post",
            AssetType::TwitterThread => "Twitter Thread",
            AssetType::LinkedinPost => "LinkedIn Post",
            AssetType::Newsletter => "Newsletter",
            AssetType::VideoHighlights => "Video Highlights",
            AssetType::Clips => "Viral Clips",
            AssetType::Tiktok => "TikTok Video",
            AssetType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    Generated,
    Published,
    Archived,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetType,
    pub content: String,
    pub status: AssetStatus,
    pub job_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    /// Raw transcription payload (text, words, chapters, entities...)
    pub full_transcript: serde_json::Value,
    pub job_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Transcript {
    pub fn text(&self) -> Option<&str> {
        self.full_transcript.get("text")?.as_str()
    }

    pub fn summary(&self) -> Option<&str> {
        self.full_transcript.get("summary")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_details() {
        let json = r##"{
            "id": "job-1",
            "temporal_workflow_id": "wf-1",
            "status": "COMPLETED",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:05:00",
            "video_source_id": "v1",
            "video_source": {
                "id": "v1",
                "youtube_url": "https://www.youtube.com/watch?v=abc",
                "title": "Launch talk",
                "status": "COMPLETED",
                "workspace_id": "ws-1"
            },
            "transcript": {
                "id": "t1",
                "full_transcript": {"text": "hello world", "summary": "greeting"},
                "job_id": "job-1"
            },
            "content_assets": [
                {"id": "a1", "type": "BLOG_POST", "content": "# Post", "status": "GENERATED", "job_id": "job-1"},
                {"id": "a2", "type": "TWITTER_THREAD", "content": "1/", "status": "PUBLISHED", "job_id": "job-1"}
            ]
        }"##;

        let details: JobDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.job.id, "job-1");
        assert_eq!(details.status(), JobStatus::Completed);
        assert!(details.status().is_terminal());
        assert_eq!(details.video_source.as_ref().unwrap().display_title(), "Launch talk");
        assert_eq!(details.transcript.as_ref().unwrap().text(), Some("hello world"));
        assert_eq!(details.transcript.as_ref().unwrap().summary(), Some("greeting"));
        assert_eq!(details.asset(AssetType::BlogPost).unwrap().content, "# Post");
        assert!(details.asset(AssetType::Newsletter).is_none());
    }

    #[test]
    fn test_started_is_not_terminal() {
        assert!(!JobStatus::Started.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_asset_type_display() {
        assert_eq!(AssetType::LinkedinPost.to_string(), "LinkedIn Post");
        assert_eq!(AssetType::Clips.to_string(), "Viral Clips");
        let parsed: AssetType = serde_json::from_str("\"LINKEDIN_POST\"").unwrap();
        assert_eq!(parsed, AssetType::LinkedinPost);
        let parsed: AssetType = serde_json::from_str("\"PODCAST\"").unwrap();
        assert_eq!(parsed, AssetType::Unknown);
    }
}
