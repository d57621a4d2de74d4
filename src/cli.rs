//! CLI interface for check-usage
//!
//! The short flags (`-u`, `-a`, `-E`, `-s`, `-e`) are the interface users
//! already know. Long flags configure where the request goes and how the
//! answer is shown; most of them can also be set through environment
//! variables.
//!
//! # Example
//!
//! ```bash
//! # Usage of the current user over the service's default window
//! check-usage
//!
//! # Per-user breakdown of an account for January 2024
//! check-usage -a fc_physics -E -s 2024-01-01 -e 2024-01-31T23:59:59
//!
//! # Raw JSON from the Lawrencium service
//! check-usage --site lrc -u alice --json
//! ```

use check_usage_client::{ConfigSources, TOKEN_ENV};
use check_usage_core::{QueryBuilder, Site};
use clap::Parser;
use std::path::PathBuf;

/// Check cluster usage for a user or an account
#[derive(Parser, Debug, Clone)]
#[command(name = "check-usage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Check usage of this user
    #[arg(short = 'u', long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// Check usage of this account
    #[arg(short = 'a', long = "account", value_name = "ACCOUNT")]
    pub account: Option<String>,

    /// Expand user/account usage into a per-user or per-account breakdown
    #[arg(short = 'E', long = "expand")]
    pub expand: bool,

    /// Start time (YYYY-MM-DD[THH:MM:SS], UTC unless an offset is given)
    #[arg(short = 's', long = "start", value_name = "START")]
    pub start: Option<String>,

    /// End time (YYYY-MM-DD[THH:MM:SS], UTC unless an offset is given)
    #[arg(short = 'e', long = "end", value_name = "END")]
    pub end: Option<String>,

    /// Print the service's JSON response instead of text
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show informational output (default is warnings and errors only)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Site to query (brc or lrc); detected from the hostname if omitted
    #[arg(long, env = "CHECK_USAGE_SITE", value_parser = parse_site)]
    pub site: Option<Site>,

    /// Base URL of the accounting API (defaults to the site's portal)
    #[arg(long, env = "CHECK_USAGE_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// File holding the API token
    #[arg(long, env = "CHECK_USAGE_TOKEN_FILE", value_name = "FILE")]
    pub token_file: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, env = "CHECK_USAGE_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Site from the flag or environment, else detected from the hostname
    pub fn resolve_site(&self) -> Site {
        self.site.unwrap_or_else(Site::detect)
    }

    /// Raw query values, not yet validated
    pub fn query_builder(&self) -> QueryBuilder {
        let mut builder = QueryBuilder::default().with_expand(self.expand);
        if let Some(user) = &self.user {
            builder = builder.with_user(user.clone());
        }
        if let Some(account) = &self.account {
            builder = builder.with_account(account.clone());
        }
        if let Some(start) = &self.start {
            builder = builder.with_start(start.clone());
        }
        if let Some(end) = &self.end {
            builder = builder.with_end(end.clone());
        }
        builder
    }

    /// Client settings for `site`; the token itself is only taken from
    /// the environment, never from a flag
    pub fn config_sources(&self, site: Site) -> ConfigSources {
        ConfigSources {
            site: Some(site),
            api_url: self.api_url.clone(),
            token_file: self.token_file.clone(),
            token: std::env::var(TOKEN_ENV).ok(),
            timeout_secs: self.timeout,
        }
    }

    /// Whether text output should carry ANSI colors
    pub fn use_color(&self) -> bool {
        self.color_allowed(
            std::env::var_os("NO_COLOR").is_some(),
            is_terminal::is_terminal(std::io::stdout()),
        )
    }

    fn color_allowed(&self, no_color_env: bool, stdout_is_tty: bool) -> bool {
        !self.no_color && !self.json && !no_color_env && stdout_is_tty
    }
}

fn parse_site(s: &str) -> Result<Site, String> {
    s.parse::<Site>().map_err(|e| e.to_string())
}
