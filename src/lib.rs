//! check-usage - Query the cluster accounting service for usage
//!
//! This library provides:
//! - The command-line definition ([`cli::Cli`])
//! - The single-request pipeline behind the binary ([`app::run`])
//!
//! The building blocks live in the workspace crates: `check-usage-core`
//! for errors, timestamps, queries and reports, `check-usage-client` for
//! configuration and HTTP, and `check-usage-terminal` for rendering.
//!
//! # Examples
//!
//! ```no_run
//! use check_usage::app::{OutputOptions, execute};
//! use check_usage_client::{ClientConfig, UsageClient};
//! use check_usage_core::{QueryParameters, Site};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> check_usage::Result<()> {
//!     let query = QueryParameters::builder()
//!         .with_account("fc_physics")
//!         .with_expand(true)
//!         .with_start("2024-01-01")
//!         .build()?;
//!
//!     let config = ClientConfig::new(Site::Brc, Site::Brc.api_url(), "Token abc123")?;
//!     let client = UsageClient::new(config)?;
//!
//!     println!("{}", execute(&query, &client, OutputOptions::default()).await?);
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;

// Re-export commonly used types
pub use check_usage_core::{ErrorKind, Result, UsageError};
