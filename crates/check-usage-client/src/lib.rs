//! Configuration and HTTP client for the check-usage accounting service

pub mod client;
pub mod config;

pub use client::UsageClient;
pub use config::{ClientConfig, ConfigSources, TOKEN_ENV};
