//! REST API layer for the CreatorOS backend.
//!
//! `Gateway` sends requests with the stored bearer credential attached and
//! re-authenticates once when the backend answers 401. `ApiClient` builds the
//! typed endpoint methods on top of it.

pub mod client;
pub mod error;
pub mod gateway;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::Gateway;
pub use request::{ApiResponse, HttpRequest, RequestOptions};
pub use transport::{ReqwestTransport, Transport};
