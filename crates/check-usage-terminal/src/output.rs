//! Output formatting for usage reports
//!
//! Two formatters are provided:
//! - [`TextFormatter`] prints a one-line summary, optionally followed by a
//!   per-user or per-account breakdown
//! - [`JsonFormatter`] prints the service's response document unchanged
//!
//! # Examples
//!
//! ```
//! use check_usage_core::{QueryParameters, UsageReport};
//! use check_usage_terminal::get_formatter;
//!
//! let query = QueryParameters::builder()
//!     .with_user("alice")
//!     .build_with_login(None)
//!     .unwrap();
//! let report = UsageReport::from_slice(
//!     br#"{"count": 2, "total_cpu_time": 3.5, "total_amount": "7.00"}"#,
//! )
//! .unwrap();
//!
//! let text = get_formatter(false, false).format_report(&query, &report);
//! assert_eq!(
//!     text,
//!     "Usage for USER alice [default, default]: 2 jobs, 3.50 CPUHrs, 7.00 SUs used."
//! );
//! ```

use check_usage_core::{BreakdownEntry, QueryParameters, QueryTarget, UsageReport, UtcTimestamp};
use colored::Colorize;

/// Shares below this percentage are shown in green
const SHARE_WARN_PERCENT: f64 = 75.0;

/// Shares above this percentage are shown in red
const SHARE_OVER_PERCENT: f64 = 100.0;

const REMOVED_PREFIX: &str = "(User removed from account) ";

/// Trait for report formatters
pub trait OutputFormatter {
    /// Render `report`, the answer to `query`
    fn format_report(&self, query: &QueryParameters, report: &UsageReport) -> String;
}

/// Human-readable line output
pub struct TextFormatter {
    /// Whether to color breakdown percentages
    pub color: bool,
}

impl TextFormatter {
    /// Create a new TextFormatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn window_label(query: &QueryParameters) -> String {
        fn bound(ts: Option<&UtcTimestamp>) -> String {
            ts.map_or_else(|| "default".to_string(), ToString::to_string)
        }
        format!("[{}, {}]", bound(query.start()), bound(query.end()))
    }

    fn summary_line(query: &QueryParameters, report: &UsageReport, window: &str) -> String {
        let target = query.target();
        let mut line = format!(
            "Usage for {} {}: {} jobs, {:.2} CPUHrs, {} SUs used",
            target, window, report.count, report.total_cpu_time, report.total_amount
        );

        // The allocation only makes sense against the service's own
        // default window, which starts when the allocation does.
        match (&target, query.start(), report.allocation_display()) {
            (QueryTarget::Account(_), None, Some(allocation)) => {
                line.push_str(&format!(" from an allocation of {allocation} SUs."));
            }
            _ => line.push('.'),
        }
        line
    }

    fn breakdown_line(
        &self,
        query: &QueryParameters,
        report: &UsageReport,
        entry: &BreakdownEntry,
        window: &str,
    ) -> Option<String> {
        let account_scoped = query.account().is_some();

        let (user, account) = if account_scoped {
            (
                entry.user.as_deref()?,
                entry.account.as_deref().or(query.account())?,
            )
        } else {
            (
                entry.user.as_deref().or(query.user())?,
                entry.account.as_deref()?,
            )
        };

        let amount = if account_scoped {
            format!(
                "{} ({}%)",
                entry.total_amount,
                self.share(report.share_of(entry))
            )
        } else {
            entry.total_amount.to_string()
        };

        let prefix = if entry.is_removed() { REMOVED_PREFIX } else { "" };

        Some(format!(
            "\t{prefix}Usage for USER {user} in ACCOUNT {account} {window}: {} jobs, {:.2} CPUHrs, {amount} SUs.",
            entry.count, entry.total_cpu_time
        ))
    }

    fn share(&self, percent: f64) -> String {
        let text = format!("{percent:.2}");
        if !self.color {
            return text;
        }

        if percent < SHARE_WARN_PERCENT {
            text.green().to_string()
        } else if percent > SHARE_OVER_PERCENT {
            text.red().to_string()
        } else {
            text.yellow().to_string()
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, query: &QueryParameters, report: &UsageReport) -> String {
        let window = Self::window_label(query);
        let mut lines = vec![Self::summary_line(query, report, &window)];

        if query.expand() {
            let rows: Vec<String> = report
                .breakdown
                .iter()
                .filter_map(|entry| self.breakdown_line(query, report, entry, &window))
                .collect();

            if rows.is_empty() {
                lines.push("\tNo breakdown returned.".to_string());
            } else {
                lines.extend(rows);
            }
        }

        lines.join("\n")
    }
}

/// Raw JSON output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, _query: &QueryParameters, report: &UsageReport) -> String {
        serde_json::to_string_pretty(report.raw()).unwrap_or_else(|_| report.raw().to_string())
    }
}

/// Pick a formatter for the requested output mode
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TextFormatter::new(color))
    }
}
