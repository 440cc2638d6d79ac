//! In-memory chain reader implementation.
//!
//! This module provides a fixture chain backed by hash maps, useful for
//! testing and local development where no node is available. Individual
//! lookups can be configured to fail so callers can exercise their error
//! paths deterministically.

use crate::{ChainReader, ReaderError};
use alloy_primitives::B256;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use uncled_types::{Block, BlockHash, Receipt, Transaction, TransactionHash, TxLookup};

/// In-memory chain with canonical blocks, uncle blocks and mined transactions.
///
/// The chain is populated through `&mut self` builder methods and is
/// read-only once shared, so lookups need no locking.
#[derive(Default)]
pub struct InMemoryChain {
	/// All fetchable blocks, canonical or uncle, keyed by hash.
	blocks: HashMap<BlockHash, Block>,
	/// Canonical block hash at each height.
	canonical: HashMap<u64, BlockHash>,
	/// Mined transactions and their receipts.
	receipts: HashMap<TransactionHash, Receipt>,
	/// Hashes whose block lookups fail with a network error.
	failing_block_hashes: HashSet<BlockHash>,
	/// Heights whose block lookups fail with a network error.
	failing_block_numbers: HashSet<u64>,
	/// Transactions whose lookups fail with a network error.
	failing_transactions: HashSet<TransactionHash>,
	/// Number of reader calls served so far.
	requests: AtomicUsize,
}

impl InMemoryChain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a linear canonical chain covering `range`, with no uncles and
	/// no transactions. Block hashes follow [`InMemoryChain::canonical_hash`].
	pub fn with_canonical_range(range: RangeInclusive<u64>) -> Self {
		let mut chain = Self::new();
		for number in range {
			chain.insert_canonical(Block {
				number,
				hash: Self::canonical_hash(number),
				uncles: vec![],
				transactions: vec![],
			});
		}
		chain
	}

	/// Deterministic hash used for canonical fixture blocks.
	pub fn canonical_hash(number: u64) -> BlockHash {
		B256::left_padding_from(&number.to_be_bytes())
	}

	/// Inserts a block as the canonical block at its height.
	pub fn insert_canonical(&mut self, block: Block) {
		self.canonical.insert(block.number, block.hash);
		self.blocks.insert(block.hash, block);
	}

	/// Stores `uncle` and references it from the canonical block at `number`.
	///
	/// The uncle is only reachable by hash, never by number.
	pub fn attach_uncle(&mut self, number: u64, uncle: Block) {
		self.reference_uncle(number, uncle.hash);
		self.blocks.insert(uncle.hash, uncle);
	}

	/// References an uncle hash from the canonical block at `number` without
	/// storing the uncle block, so resolving it fails.
	pub fn attach_missing_uncle(&mut self, number: u64, hash: BlockHash) {
		self.reference_uncle(number, hash);
	}

	/// Records `tx` as canonically mined in the block at `number`.
	pub fn mine_transaction(&mut self, number: u64, tx: TransactionHash) {
		let Some(hash) = self.canonical.get(&number).copied() else {
			return;
		};
		if let Some(block) = self.blocks.get_mut(&hash) {
			block.transactions.push(tx);
		}
		self.receipts.insert(
			tx,
			Receipt {
				transaction_hash: tx,
				block_hash: hash,
				block_number: number,
			},
		);
	}

	/// Makes every lookup of the block with this hash fail.
	pub fn fail_block_hash(&mut self, hash: BlockHash) {
		self.failing_block_hashes.insert(hash);
	}

	/// Makes every lookup of the canonical block at this height fail.
	pub fn fail_block_number(&mut self, number: u64) {
		self.failing_block_numbers.insert(number);
	}

	/// Makes every lookup of this transaction fail.
	pub fn fail_transaction(&mut self, hash: TransactionHash) {
		self.failing_transactions.insert(hash);
	}

	/// Returns the number of reader calls served so far.
	pub fn request_count(&self) -> usize {
		self.requests.load(Ordering::SeqCst)
	}

	fn reference_uncle(&mut self, number: u64, uncle: BlockHash) {
		let Some(hash) = self.canonical.get(&number) else {
			return;
		};
		if let Some(block) = self.blocks.get_mut(hash) {
			block.uncles.push(uncle);
		}
	}

	fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl ChainReader for InMemoryChain {
	async fn get_transaction_by_hash(
		&self,
		hash: &TransactionHash,
	) -> Result<TxLookup, ReaderError> {
		self.record_request();
		if self.failing_transactions.contains(hash) {
			return Err(ReaderError::Network(format!(
				"injected failure for transaction {}",
				hash
			)));
		}

		Ok(match self.receipts.get(hash) {
			Some(receipt) => TxLookup::Found(Transaction {
				hash: *hash,
				block_hash: Some(receipt.block_hash),
			}),
			None => TxLookup::NotFound,
		})
	}

	async fn get_transaction_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Receipt, ReaderError> {
		self.record_request();
		self.receipts
			.get(hash)
			.cloned()
			.ok_or(ReaderError::ReceiptNotFound(*hash))
	}

	async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Block, ReaderError> {
		self.record_request();
		if self.failing_block_hashes.contains(hash) {
			return Err(ReaderError::Network(format!(
				"injected failure for block {}",
				hash
			)));
		}

		self.blocks
			.get(hash)
			.cloned()
			.ok_or_else(|| ReaderError::BlockNotFound(hash.to_string()))
	}

	async fn get_block_by_number(&self, number: u64) -> Result<Block, ReaderError> {
		self.record_request();
		if self.failing_block_numbers.contains(&number) {
			return Err(ReaderError::Network(format!(
				"injected failure for block number {}",
				number
			)));
		}

		self.canonical
			.get(&number)
			.and_then(|hash| self.blocks.get(hash))
			.cloned()
			.ok_or_else(|| ReaderError::BlockNotFound(format!("number {}", number)))
	}
}
