//! Core library for the CreatorOS client.
//!
//! CreatorOS turns submitted video links into derivative content (blog
//! posts, social threads, newsletters, clips). This crate talks to the
//! CreatorOS backend and provides:
//!
//! - `api::Gateway`: outbound requests with bearer credential attachment and
//!   a single transparent re-authentication retry on 401
//! - `api::ApiClient`: typed endpoint methods built on the gateway
//! - `auth`: token storage, login credential sources and the refresh guard
//! - `poll::JobPoller`: waits for a processing job to finish
//! - `config::Config`: base URL, timeouts and account settings

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod poll;

pub use api::{ApiClient, ApiError, ApiResponse, Gateway, RequestOptions};
pub use auth::{Credential, CredentialSource, LoginCredentials, RefreshGuard, TokenStore};
pub use config::Config;
pub use poll::JobPoller;
