//! Utility functions shared across the uncle detector crates.

pub mod formatting;

pub use formatting::{escape_html, truncate_id};
