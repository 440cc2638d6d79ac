//! Common types module for the uncle detector.
//!
//! This module defines the value types shared by the chain reader, the uncle
//! search engine and the presentation layers: hashes, blocks, receipts, the
//! resulting status and the HTTP API payloads.

/// API types for HTTP endpoints and response structures.
pub mod api;
/// Blocks, transactions and receipts as reported by a node.
pub mod chain;
/// Transaction hash type and parsing.
pub mod hash;
/// Uncle status and query report types.
pub mod status;
/// Utility functions for formatting.
pub mod utils;

// Re-export all types for convenient access
pub use api::*;
pub use chain::*;
pub use hash::*;
pub use status::*;
pub use utils::{escape_html, truncate_id};
