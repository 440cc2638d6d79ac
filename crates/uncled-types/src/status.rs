//! Uncle status types produced by the search engine.

use crate::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a transaction was seen in an uncle block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
	/// The transaction was never found or has not been mined.
	#[serde(rename = "TxUnknown")]
	Unknown,
	/// The transaction was mined and no uncle within the window contains it.
	#[serde(rename = "TxNotUncled")]
	NotUncled,
	/// The transaction was also included in an uncle block within the window.
	#[serde(rename = "TxWasUncled")]
	WasUncled,
}

impl fmt::Display for TxStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TxStatus::Unknown => write!(f, "TxUnknown"),
			TxStatus::NotUncled => write!(f, "TxNotUncled"),
			TxStatus::WasUncled => write!(f, "TxWasUncled"),
		}
	}
}

/// Result of a single uncle status query.
///
/// Each variant only carries the blocks that exist for that outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxReport {
	/// The node does not know the transaction.
	Unknown,
	/// The transaction was mined and never seen in an uncle.
	NotUncled {
		/// Canonical block that includes the transaction.
		mined_block: Block,
	},
	/// The transaction was mined and also appeared in an uncle.
	WasUncled {
		/// Canonical block that includes the transaction.
		mined_block: Block,
		/// First uncle block found containing the transaction.
		uncle_block: Block,
	},
}

impl TxReport {
	pub fn status(&self) -> TxStatus {
		match self {
			TxReport::Unknown => TxStatus::Unknown,
			TxReport::NotUncled { .. } => TxStatus::NotUncled,
			TxReport::WasUncled { .. } => TxStatus::WasUncled,
		}
	}

	pub fn mined_block(&self) -> Option<&Block> {
		match self {
			TxReport::Unknown => None,
			TxReport::NotUncled { mined_block } | TxReport::WasUncled { mined_block, .. } => {
				Some(mined_block)
			},
		}
	}

	pub fn uncle_block(&self) -> Option<&Block> {
		match self {
			TxReport::WasUncled { uncle_block, .. } => Some(uncle_block),
			_ => None,
		}
	}
}
