//! Terminal output formatting for check-usage
//!
//! This crate renders a usage report either as text lines or as the raw
//! JSON document returned by the service.

pub mod output;

pub use output::{JsonFormatter, OutputFormatter, TextFormatter, get_formatter};
