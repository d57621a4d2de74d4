//! Client configuration
//!
//! Settings come from command-line flags and environment variables (both
//! collected by the CLI into [`ConfigSources`]) and fall back to the site's
//! defaults. The API token is read from `CHECK_USAGE_TOKEN` or from a
//! per-site token file.
//!
//! # Example
//!
//! ```
//! use check_usage_client::config::ConfigSources;
//! use check_usage_core::Site;
//!
//! let config = ConfigSources {
//!     site: Some(Site::Lrc),
//!     token: Some("Token abc123".to_string()),
//!     ..Default::default()
//! }
//! .resolve()
//! .unwrap();
//!
//! assert_eq!(config.api_url().as_str(), "https://mylrc.lbl.gov/api/");
//! assert_eq!(config.jobs_url().unwrap().as_str(), "https://mylrc.lbl.gov/api/jobs/");
//! ```

use check_usage_core::{Result, Site, UsageError};
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the API token itself
pub const TOKEN_ENV: &str = "CHECK_USAGE_TOKEN";

/// Path of the jobs endpoint, relative to the API base URL
const JOBS_ENDPOINT: &str = "jobs/";

/// Unresolved settings as collected from flags and the environment
#[derive(Debug, Default, Clone)]
pub struct ConfigSources {
    /// Site, or `None` to detect it from the hostname
    pub site: Option<Site>,
    /// API base URL override
    pub api_url: Option<String>,
    /// Token file override
    pub token_file: Option<PathBuf>,
    /// Token given directly
    pub token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ConfigSources {
    /// Fill in defaults and load the token
    pub fn resolve(self) -> Result<ClientConfig> {
        let site = self.site.unwrap_or_else(Site::detect);
        let api_url = self.api_url.as_deref().unwrap_or(site.api_url());

        let token = match self.token.map(|t| t.trim().to_string()) {
            Some(token) if !token.is_empty() => {
                debug!("Using API token from {}", TOKEN_ENV);
                token
            }
            _ => match &self.token_file {
                Some(path) => read_token_file(path)?,
                None => {
                    let candidates = token_file_candidates(site);
                    let found = candidates.iter().find(|p| p.is_file()).ok_or_else(|| {
                        UsageError::Config(format!(
                            "no API token found; set {} or create one of: {}",
                            TOKEN_ENV,
                            candidates
                                .iter()
                                .map(|p| p.display().to_string())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ))
                    })?;
                    read_token_file(found)?
                }
            },
        };

        let mut config = ClientConfig::new(site, api_url, token)?;
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Resolved settings for [`crate::UsageClient`]
#[derive(Clone)]
pub struct ClientConfig {
    site: Site,
    api_url: Url,
    token: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration, normalising the base URL to end in `/`
    pub fn new(site: Site, api_url: &str, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(UsageError::Config("API token is empty".to_string()));
        }

        Ok(Self {
            site,
            api_url: parse_base_url(api_url)?,
            token,
            timeout: None,
        })
    }

    /// Bound the whole request by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Site this configuration targets
    pub fn site(&self) -> Site {
        self.site
    }

    /// API base URL, always ending in `/`
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Value sent in the `Authorization` header
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Request timeout, `None` for the HTTP client default
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full URL of the jobs endpoint
    pub fn jobs_url(&self) -> Result<Url> {
        self.api_url
            .join(JOBS_ENDPOINT)
            .map_err(|e| UsageError::Config(format!("invalid API URL: {e}")))
    }
}

// Keeps the token out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("site", &self.site)
            .field("api_url", &self.api_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized)
        .map_err(|e| UsageError::Config(format!("invalid API URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UsageError::Config(format!(
            "unsupported API URL scheme '{other}' in '{raw}'"
        ))),
    }
}

/// Places searched for a site's token file, in order
pub fn token_file_candidates(site: Site) -> Vec<PathBuf> {
    let file_name = site.token_file_name();
    let mut candidates = Vec::new();

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("check-usage").join(&file_name));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(&file_name));
        }
    }

    candidates
}

fn read_token_file(path: &Path) -> Result<String> {
    debug!("Reading API token from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| {
        UsageError::Config(format!("cannot read token file {}: {e}", path.display()))
    })?;

    let token = contents.trim();
    if token.is_empty() {
        return Err(UsageError::Config(format!(
            "token file {} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}
