//! Report output.
//!
//! Renders a [`crate::models::Report`] as Markdown or JSON, and writes the
//! filtered rows back out as CSV.

pub mod export;
pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report};
