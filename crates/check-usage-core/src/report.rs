//! Usage report returned by the accounting service
//!
//! The service owns the shape of its response. [`UsageReport`] is a typed
//! view over the handful of fields the renderer needs; unknown fields are
//! ignored and the original document is kept in [`UsageReport::raw`] so it
//! can be handed on untouched.

use crate::error::{Result, UsageError};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A service-unit quantity, kept exactly as the service wrote it
///
/// The service reports amounts either as JSON numbers or as decimal
/// strings. The text is preserved for display and parsed on demand for
/// arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Amount(String);

impl Amount {
    /// Create an amount from its textual form
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The amount as the service wrote it
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the text is a number
    pub fn as_f64(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self("0".to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Amount(n.to_string())),
            Value::String(s) => Ok(Amount(s)),
            Value::Null => Ok(Amount::default()),
            other => Err(de::Error::custom(format!(
                "expected a number or numeric string, got {other}"
            ))),
        }
    }
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One row of an expanded report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// User the row belongs to
    #[serde(default)]
    pub user: Option<String>,
    /// Account the row belongs to
    #[serde(default, alias = "project")]
    pub account: Option<String>,
    /// Number of jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    /// CPU hours consumed
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cpu_time: f64,
    /// Service units consumed
    #[serde(default)]
    pub total_amount: Amount,
    /// Membership status of the user in the account
    #[serde(default)]
    pub status: Option<String>,
}

impl BreakdownEntry {
    /// Whether the user has been removed from the account
    pub fn is_removed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("removed"))
    }
}

/// Usage figures for one query
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UsageReport {
    /// Number of jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    /// CPU hours consumed
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cpu_time: f64,
    /// Service units consumed
    #[serde(default)]
    pub total_amount: Amount,
    /// Service units granted to the account, when the service reports it
    #[serde(default)]
    pub allocation: Option<Amount>,
    /// Per-user or per-account rows of an expanded report
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakdown: Vec<BreakdownEntry>,
    #[serde(skip)]
    raw: Value,
}

impl UsageReport {
    /// Build the typed view from a parsed JSON document
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(UsageError::ResponseFormat(format!(
                "expected a JSON object, got {}",
                json_type_name(&value)
            )));
        }

        let mut report: UsageReport = serde_json::from_value(value.clone())?;
        report.raw = value;
        Ok(report)
    }

    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// The response document exactly as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Allocation rounded down to whole service units, for display
    pub fn allocation_display(&self) -> Option<String> {
        self.allocation.as_ref().map(|allocation| match allocation.as_f64() {
            Some(v) => format!("{}", v.trunc() as i64),
            None => allocation.to_string(),
        })
    }

    /// Percentage of this report's total that `entry` accounts for
    ///
    /// Zero when either amount is not numeric or the total is zero.
    pub fn share_of(&self, entry: &BreakdownEntry) -> f64 {
        match (entry.total_amount.as_f64(), self.total_amount.as_f64()) {
            (Some(part), Some(total)) if total != 0.0 => part / total * 100.0,
            _ => 0.0,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
