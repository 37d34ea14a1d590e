//! Data models exchanged with the CreatorOS backend.
//!
//! - `AuthToken`, `User`, `RegisterData`, `ApiMessage`: accounts and generic replies
//! - `Workspace`, `WorkspaceWithVideos`: containers for submitted videos
//! - `VideoSource`, `VideoStatus`, `VideoProgress`: submitted video links
//! - `JobDetails`, `ContentAsset`, `Transcript`: processing output
//! - `UsageReport`, `ProcessingAllowance`, `Subscription`, checkout and portal
//!   sessions: plan and billing state

pub mod account;
pub mod billing;
pub mod job;
pub mod video;
pub mod workspace;

pub use account::{ApiMessage, AuthToken, RegisterData, User};
pub use billing::{
    CheckoutRequest, CheckoutSession, PortalSession, ProcessingAllowance, Subscription, UsageReport,
};
pub use job::{AssetStatus, AssetType, ContentAsset, JobDetails, JobStatus, ProcessingJob, Transcript};
pub use video::{VideoProgress, VideoSource, VideoStatus, VideoSubmission};
pub use workspace::{Workspace, WorkspaceWithVideos};
