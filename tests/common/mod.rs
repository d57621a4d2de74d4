//! Common test utilities and helpers for check-usage tests
//!
//! Unit tests inside the crates have their own copy of the environment
//! guard; integration tests are separate binaries and cannot reach it.

#![allow(dead_code)]

use check_usage::cli::Cli;
use clap::Parser;
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::{MockServer, Request};

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Token written to every test token file
pub const TEST_TOKEN: &str = "Token 0123456789abcdef";

/// RAII guard that restores environment variables on drop
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        unsafe {
            env::set_var(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// A token file holding [`TEST_TOKEN`]
pub fn token_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{TEST_TOKEN}").unwrap();
    file
}

/// Parse a command line aimed at `server`, authenticating with `token`
///
/// `args` are the user-facing flags, without the program name.
pub fn cli_for(server: &MockServer, token: &NamedTempFile, args: &[&str]) -> Cli {
    let api_url = format!("{}/api/", server.uri());
    let token_path = token.path().to_string_lossy().to_string();

    let mut argv = vec![
        "check-usage".to_string(),
        "--site".to_string(),
        "brc".to_string(),
        "--api-url".to_string(),
        api_url,
        "--token-file".to_string(),
        token_path,
        "--no-color".to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::parse_from(argv)
}

/// Query-string pairs of a recorded request
pub fn query_pairs(request: &Request) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Value of `key` in a recorded request's query string
pub fn query_value(request: &Request, key: &str) -> Option<String> {
    query_pairs(request)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Summary-only response
pub fn summary_body() -> Value {
    json!({
        "count": 12,
        "total_cpu_time": 345.678,
        "total_amount": "1024.50"
    })
}

/// Expanded response for user `alice` in account `teamA`
pub fn expanded_body() -> Value {
    json!({
        "count": 12,
        "total_cpu_time": 345.678,
        "total_amount": "1000.00",
        "breakdown": [
            {"user": "alice", "account": "teamA", "count": 10, "total_cpu_time": 300.0, "total_amount": "800.00", "status": "Active"},
            {"user": "alice", "account": "teamA", "count": 2, "total_cpu_time": 45.678, "total_amount": "200.00", "status": "Removed"}
        ]
    })
}
