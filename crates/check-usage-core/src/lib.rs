//! Core types, errors, and timestamp handling for check-usage
//!
//! This crate holds everything that does not touch the network or the
//! terminal: the error taxonomy, the known deployment sites, time-window
//! parsing, validated query parameters, and the typed view of a usage
//! report.

pub mod error;
pub mod query;
pub mod report;
pub mod site;
pub mod timestamp;

// Re-export commonly used types
pub use error::{ErrorKind, Result, UsageError};
pub use query::{QueryBuilder, QueryParameters, QueryTarget};
pub use report::{Amount, BreakdownEntry, UsageReport};
pub use site::Site;
pub use timestamp::UtcTimestamp;
