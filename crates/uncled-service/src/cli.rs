//! The `check` subcommand.

use crate::output::summary_line;
use thiserror::Error;
use uncled_core::{SearchError, UncleSearchEngine};
use uncled_types::{HashParseError, TransactionHash};

/// Errors reported by the `check` subcommand.
#[derive(Debug, Error)]
pub enum CheckError {
	#[error("invalid tx hash: {0}")]
	InvalidHash(#[from] HashParseError),
	#[error("tx check failed: {0}")]
	Search(#[from] SearchError),
}

/// Validates `raw_hash`, runs the engine and returns the line to print.
pub async fn check(engine: &UncleSearchEngine, raw_hash: &str) -> Result<String, CheckError> {
	let tx_hash: TransactionHash = raw_hash.trim().parse()?;
	let report = engine.determine_tx_status(&tx_hash).await?;
	Ok(summary_line(&report))
}
