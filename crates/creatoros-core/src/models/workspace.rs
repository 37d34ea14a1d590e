use serde::{Deserialize, Serialize};

use super::VideoSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceWithVideos {
    #[serde(flatten)]
    pub workspace: Workspace,
    #[serde(default)]
    pub video_sources: Vec<VideoSource>,
}
