//! Uncle search engine for the uncle detector.
//!
//! Given a transaction hash, the engine locates the canonical block that mined
//! it and then walks a bounded window of that block and its ancestors looking
//! for an uncle block that also contains the transaction. All chain access
//! goes through a [`ChainReader`](uncled_reader::ChainReader).

use thiserror::Error;
use uncled_reader::ReaderError;

pub mod engine;

pub use engine::uncles::UncleResolution;
pub use engine::{determine_tx_status, SearchConfig, UncleSearchEngine, DEFAULT_SEARCH_DEPTH};

/// Errors that prevent the engine from giving a trustworthy answer.
///
/// Each variant names the lookup step that failed. Failures to resolve
/// individual uncle blocks are not errors; they are skipped during the scan.
#[derive(Debug, Error)]
pub enum SearchError {
	/// Looking up the transaction itself failed.
	#[error("failed to get transaction by hash: {0}")]
	TransactionLookup(#[source] ReaderError),
	/// The transaction exists but its receipt could not be fetched.
	#[error("failed to get transaction receipt: {0}")]
	Receipt(#[source] ReaderError),
	/// The block named by the receipt could not be fetched.
	#[error("failed to get mined block by hash: {0}")]
	MinedBlock(#[source] ReaderError),
	/// An ancestor block could not be fetched during the backward walk.
	#[error("failed to get block {number} by number: {source}")]
	AncestorBlock {
		number: u64,
		#[source]
		source: ReaderError,
	},
}

impl SearchError {
	/// Short name of the step that failed, used as a log field.
	pub fn step(&self) -> &'static str {
		match self {
			SearchError::TransactionLookup(_) => "transaction",
			SearchError::Receipt(_) => "receipt",
			SearchError::MinedBlock(_) => "mined_block",
			SearchError::AncestorBlock { .. } => "ancestor_block",
		}
	}
}
