//! Chain reader module for the uncle detector.
//!
//! This module defines the read-only view of a node that the uncle search
//! engine depends on. Any backend able to look up transactions, receipts and
//! blocks by hash or number can implement [`ChainReader`]; the engine never
//! talks to the network by itself.

use async_trait::async_trait;
use thiserror::Error;
use uncled_types::{Block, BlockHash, Receipt, TransactionHash, TxLookup};

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod memory;
}

/// Errors that can occur while reading chain data.
#[derive(Debug, Error)]
pub enum ReaderError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The node did not answer within the configured deadline.
	#[error("Request {method} timed out after {seconds}s")]
	Timeout { method: String, seconds: u64 },
	/// The node has no receipt for a transaction it reported.
	#[error("Receipt not found for transaction {0}")]
	ReceiptNotFound(TransactionHash),
	/// The node has no block under the requested hash or number.
	#[error("Block not found: {0}")]
	BlockNotFound(String),
	/// The node answered with a payload that could not be interpreted.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Trait defining the read-only node interface used by the search engine.
///
/// Blocks expose their uncle references and transaction hashes, so uncle
/// headers are enumerated from a fetched [`Block`] and uncle blocks are
/// resolved through [`ChainReader::get_block_by_hash`].
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Looks up a transaction by hash.
	///
	/// An unknown hash is reported as [`TxLookup::NotFound`], not as an error.
	async fn get_transaction_by_hash(
		&self,
		hash: &TransactionHash,
	) -> Result<TxLookup, ReaderError>;

	/// Retrieves the receipt of a mined transaction.
	async fn get_transaction_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Receipt, ReaderError>;

	/// Retrieves a block, canonical or uncle, by its hash.
	async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Block, ReaderError>;

	/// Retrieves the canonical block at the given height.
	async fn get_block_by_number(&self, number: u64) -> Result<Block, ReaderError>;
}
