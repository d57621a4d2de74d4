//! The parse → validate → request → render pipeline
//!
//! [`run`] is what the binary calls. It validates the query first, so a bad
//! flag fails before configuration is loaded or the network is touched, then
//! makes exactly one request through [`execute`].

use crate::cli::Cli;
use check_usage_client::UsageClient;
use check_usage_core::{QueryParameters, Result, Site, UsageError};
use check_usage_terminal::get_formatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

/// How a fetched report is presented
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Emit the raw JSON document
    pub json: bool,
    /// Color breakdown percentages
    pub color: bool,
    /// Show a spinner on stderr while waiting
    pub spinner: bool,
}

impl OutputOptions {
    /// Options implied by the command line and the attached terminals
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            color: cli.use_color(),
            spinner: is_terminal::is_terminal(std::io::stderr()),
        }
    }
}

/// Run one invocation against `site` and return the text to print
pub async fn run(cli: &Cli, site: Site) -> Result<String> {
    let query = cli.query_builder().build()?;
    let config = cli.config_sources(site).resolve()?;
    info!("Querying {} at {}", config.site(), config.api_url());

    let client = UsageClient::new(config)?;
    execute(&query, &client, OutputOptions::from_cli(cli)).await
}

/// Fetch the report for `query` and render it
pub async fn execute(
    query: &QueryParameters,
    client: &UsageClient,
    options: OutputOptions,
) -> Result<String> {
    if query.start().is_some_and(|start| start.predates_accurate_records()) {
        warn!(
            "Information before 2020-06-01 might be inaccurate; for accurate information {}",
            client.config().site().support_contact()
        );
    }

    if query.account().is_some_and(|account| account.starts_with("ac_")) {
        warn!("Start date shown may be inaccurate for ac_ accounts");
    }

    let progress = options.spinner.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Querying accounting service");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = client.fetch(query).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;
    Ok(get_formatter(options.json, options.color).format_report(query, &report))
}

/// Text printed to stderr for a failed run
///
/// Failures on the service side also name the site's support contact.
pub fn error_report(err: &UsageError, site: Site) -> String {
    let mut text = format!("error: {err}");
    if err.is_remote() {
        text.push_str(&format!(
            "\nIf the problem persists, {}.",
            site.support_contact()
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use check_usage_client::ClientConfig;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn run_logged(account: &str, start: &str) -> (String, String) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "total_cpu_time": 2.0,
                "total_amount": "3.00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let logs = Captured::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let query = QueryParameters::builder()
            .with_account(account)
            .with_start(start)
            .build_with_login(None)
            .unwrap();
        let config =
            ClientConfig::new(Site::Lrc, &format!("{}/api", server.uri()), "Token t").unwrap();
        let client = UsageClient::new(config).unwrap();

        let output = execute(&query, &client, OutputOptions::default())
            .await
            .unwrap();
        (output, logs.text())
    }

    #[tokio::test]
    async fn test_early_start_warns_with_support_contact() {
        let (output, logs) = run_logged("fc_physics", "2019-07-01").await;
        assert!(output.starts_with("Usage for ACCOUNT fc_physics [2019-07-01T00:00:00Z"));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("before 2020-06-01 might be inaccurate"));
        assert!(logs.contains(&Site::Lrc.support_contact()));
        assert!(!logs.contains("ac_ accounts"));
    }

    #[tokio::test]
    async fn test_ac_account_warns_about_start_date() {
        let (_, logs) = run_logged("ac_chemistry", "2024-01-01").await;
        assert!(logs.contains("Start date shown may be inaccurate for ac_ accounts"));
        assert!(!logs.contains("2020-06-01"));
    }

    #[tokio::test]
    async fn test_recent_window_is_quiet() {
        let (_, logs) = run_logged("fc_physics", "2024-01-01").await;
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_error_report_names_support_for_remote_failures() {
        let remote = UsageError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(
            error_report(&remote, Site::Brc),
            format!(
                "error: Accounting service returned HTTP 502: Bad Gateway\nIf the problem persists, {}.",
                Site::Brc.support_contact()
            )
        );

        let local = UsageError::Parameter("Start time is after end time".to_string());
        assert_eq!(
            error_report(&local, Site::Brc),
            "error: Start time is after end time"
        );
    }
}
