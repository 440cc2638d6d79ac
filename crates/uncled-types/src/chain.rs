//! Chain entity types for the uncle detector.
//!
//! These are read-only snapshots of what the node reports. They are fetched on
//! demand for a single query and never mutated.

use crate::{BlockHash, TransactionHash};
use serde::{Deserialize, Serialize};

/// A transaction as known to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// Hash of the block that includes the transaction, if it has been mined.
	pub block_hash: Option<BlockHash>,
}

impl Transaction {
	/// Returns true once the node reports a containing block.
	pub fn is_mined(&self) -> bool {
		self.block_hash.is_some()
	}
}

/// Receipt produced once a transaction has been mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
	/// The hash of the transaction.
	pub transaction_hash: TransactionHash,
	/// Hash of the block that canonically included the transaction.
	pub block_hash: BlockHash,
	/// Number of the block that canonically included the transaction.
	pub block_number: u64,
}

/// A block together with its uncle references and transaction hashes.
///
/// Uncle blocks resolved by hash use the same shape; their `uncles` list is
/// normally empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
	/// Height of the block.
	pub number: u64,
	/// Hash of the block.
	pub hash: BlockHash,
	/// Ordered uncle header references.
	pub uncles: Vec<BlockHash>,
	/// Ordered hashes of the transactions the block contains.
	pub transactions: Vec<TransactionHash>,
}

impl Block {
	/// Returns true if the block lists the given transaction.
	pub fn contains_transaction(&self, hash: &TransactionHash) -> bool {
		self.transactions.iter().any(|tx| tx == hash)
	}

	/// Number of the preceding block, or `None` for genesis.
	pub fn parent_number(&self) -> Option<u64> {
		self.number.checked_sub(1)
	}
}

/// Outcome of looking up a transaction by hash.
///
/// Lookup failures are carried by the surrounding `Result`, so callers get
/// found, absent and failed as three distinct cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLookup {
	/// The node knows the transaction.
	Found(Transaction),
	/// The node has never seen the transaction.
	NotFound,
}
