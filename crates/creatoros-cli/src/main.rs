//! CreatorOS CLI - command-line access to the CreatorOS backend.
//!
//! Submits video links, lists workspaces and videos, and follows processing
//! jobs. Requests go through the authenticated gateway, so an expired token
//! is renewed with the account stored by `creatoros login`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use creatoros_core::api::{ApiClient, Gateway, RequestOptions};
use creatoros_core::auth::{
    CredentialSource, CredentialStore, FileTokenStore, KeyringCredentials, LoginCredentials,
    NoCredentials, StaticCredentials, TokenStore,
};
use creatoros_core::models::CheckoutRequest;
use creatoros_core::{Config, JobPoller};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directory for log files; stderr only when unset
const LOG_DIR_ENV: &str = "CREATOROS_LOG_DIR";

#[derive(Parser, Debug)]
#[command(name = "creatoros", about = "Turn videos into content from the command line")]
struct Cli {
    /// Backend API URL (overrides the config file)
    #[arg(long, env = "CREATOROS_API_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the account for automatic re-authentication
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List workspaces
    Workspaces,
    /// Manage a single workspace
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },
    /// List videos in a workspace
    Videos { workspace_id: String },
    /// Submit a YouTube link for processing
    Submit { workspace_id: String, url: String },
    /// Show a processing job and its generated content
    Job {
        job_id: String,
        /// Keep polling until the job completes or fails
        #[arg(long)]
        watch: bool,
        /// Seconds between checks when watching
        #[arg(long, default_value_t = 3)]
        interval: u64,
    },
    /// Show processing progress of a submitted video
    Progress {
        video_id: String,
        /// Keep polling until processing completes or fails
        #[arg(long)]
        watch: bool,
        /// Seconds between checks when watching
        #[arg(long, default_value_t = 3)]
        interval: u64,
    },
    /// Show usage for the current billing period
    Usage,
    /// Subscription checkout and management links
    Billing {
        #[command(subcommand)]
        action: BillingAction,
    },
    /// Send a raw GET through the gateway and print the reply
    Get { path: String },
}

#[derive(Subcommand, Debug)]
enum WorkspaceAction {
    /// Create a workspace
    Create { name: String },
    /// Delete a workspace and its videos
    Delete { workspace_id: String },
}

#[derive(Subcommand, Debug)]
enum BillingAction {
    /// Open a checkout session for a plan
    Checkout {
        #[arg(long)]
        price_id: String,
        #[arg(long)]
        success_url: String,
        #[arg(long)]
        cancel_url: String,
    },
    /// Open the customer portal
    Portal {
        #[arg(long)]
        return_url: String,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr));

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "creatoros.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        _ => {
            registry.init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
    .with_env_overrides();
    if let Some(url) = cli.base_url.clone() {
        config.api_url = Some(url);
    }
    debug!(base_url = %config.base_url(), "Config loaded");

    let client = build_client(&config)?;

    match cli.command {
        Command::Login { email } => login(&client, email.or(config.account_email)).await,
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{} ({})", user.email, user.id);
            Ok(())
        }
        Command::Workspaces => {
            let workspaces = client.workspaces().await?;
            if workspaces.is_empty() {
                println!("No workspaces.");
            }
            for ws in workspaces {
                println!("{}  {}", ws.id, ws.name);
            }
            Ok(())
        }
        Command::Workspace { action } => {
            let reply = match action {
                WorkspaceAction::Create { name } => client.create_workspace(&name).await?,
                WorkspaceAction::Delete { workspace_id } => {
                    client.delete_workspace(&workspace_id).await?
                }
            };
            println!("{}", reply.message);
            Ok(())
        }
        Command::Videos { workspace_id } => {
            let videos = client.workspace_videos(&workspace_id).await?;
            for video in videos {
                println!("{}  {:<10}  {}", video.id, video.status, video.display_title());
            }
            Ok(())
        }
        Command::Submit { workspace_id, url } => {
            let allowance = client.can_process().await?;
            if !allowance.can_process {
                anyhow::bail!(
                    "Cannot process more videos: {}",
                    allowance.message.unwrap_or_else(|| "limit reached".to_string())
                );
            }
            let reply = client.submit_video(&workspace_id, &url).await?;
            println!("{}", reply.message);
            if let Some(job_id) = reply.data_str("job_id") {
                println!("Job: {}", job_id);
            }
            Ok(())
        }
        Command::Job { job_id, watch, interval } => {
            let details = if watch {
                JobPoller::new(client.clone())
                    .interval(Duration::from_secs(interval))
                    .wait_for_completion(&job_id, |job| {
                        eprintln!("{}: {}", job.job.id, job.status());
                    })
                    .await?
            } else {
                client.job(&job_id).await?
            };

            println!("Status: {}", details.status());
            if let Some(ref video) = details.video_source {
                println!("Video:  {}", video.display_title());
            }
            for asset in &details.content_assets {
                println!("\n== {} ==\n{}", asset.kind, asset.content);
            }
            Ok(())
        }
        Command::Progress { video_id, watch, interval } => {
            let progress = if watch {
                JobPoller::new(client.clone())
                    .interval(Duration::from_secs(interval))
                    .wait_for_video(&video_id, |p| {
                        eprintln!("{:>3}%  {}", p.progress, p.current_step.as_deref().unwrap_or("-"));
                    })
                    .await?
            } else {
                client.video_progress(&video_id).await?
            };

            println!("Status:   {}", progress.status);
            println!("Progress: {}% (step {}/4)", progress.progress, progress.step);
            if let Some(message) = progress.message {
                println!("{}", message);
            }
            Ok(())
        }
        Command::Usage => {
            let usage = client.usage().await?;
            println!("{}", serde_json::to_string_pretty(&usage.usage)?);
            Ok(())
        }
        Command::Billing { action } => {
            match action {
                BillingAction::Checkout { price_id, success_url, cancel_url } => {
                    let session = client
                        .create_checkout_session(&CheckoutRequest {
                            price_id,
                            success_url,
                            cancel_url,
                        })
                        .await?;
                    println!("{}", session.session_url);
                }
                BillingAction::Portal { return_url } => {
                    let session = client.create_portal_session(&return_url).await?;
                    println!("{}", session.portal_url);
                }
            }
            Ok(())
        }
        Command::Get { path } => {
            let response = client.gateway().request(&path, RequestOptions::get()).await?;
            eprintln!("{}", response.status());
            println!("{}", response.text());
            Ok(())
        }
    }
}

/// Wire the gateway to the session file and the best available account source
fn build_client(config: &Config) -> Result<ApiClient> {
    let cache_dir = config.cache_dir()?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&cache_dir));

    let credentials: Arc<dyn CredentialSource> = if let Some(env) = StaticCredentials::from_env() {
        debug!("Using account from environment for re-authentication");
        Arc::new(env)
    } else if let Some(ref email) = config.account_email {
        Arc::new(KeyringCredentials::new(email.clone()))
    } else {
        Arc::new(NoCredentials)
    };

    let gateway = Gateway::from_config(config, store, credentials)
        .context("Failed to create API gateway")?;
    Ok(ApiClient::new(gateway))
}

async fn login(client: &ApiClient, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    println!("\nAuthenticating...");
    let credentials = LoginCredentials::new(email.clone(), password);
    client.login(&credentials).await?;

    if let Err(e) = CredentialStore::default().store(&email, &credentials.password) {
        warn!(error = %e, "Failed to store credentials");
    }

    // Persist only the account; env and flag overrides stay out of the file
    let mut stored = Config::load().unwrap_or_default();
    stored.account_email = Some(email);
    if let Err(e) = stored.save() {
        warn!(error = %e, "Failed to save config");
    }

    info!("Login successful");
    println!("Login successful!");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
