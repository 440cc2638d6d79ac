//! Uncle search over a bounded window of canonical blocks.
//!
//! The engine performs one request at a time in dependency order:
//! transaction, receipt, mined block, then for each block in the window its
//! uncles and finally its parent. Failing to walk the canonical chain aborts
//! the query; failing to fetch an individual uncle does not.

pub mod uncles;

use crate::SearchError;
use std::sync::Arc;
use tracing::instrument;
use uncled_reader::ChainReader;
use uncled_types::{truncate_id, Block, TransactionHash, TxLookup, TxReport};

/// Number of blocks examined by default, the mined block included.
pub const DEFAULT_SEARCH_DEPTH: u64 = 6;

/// Tuning for the backward uncle scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
	/// Number of consecutive blocks examined, starting at the mined block.
	pub depth: u64,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			depth: DEFAULT_SEARCH_DEPTH,
		}
	}
}

/// Determines whether transactions were included in uncle blocks.
///
/// The engine holds no per-query state, so a shared instance can serve
/// concurrent queries as long as the reader allows it.
pub struct UncleSearchEngine {
	reader: Arc<dyn ChainReader>,
	config: SearchConfig,
}

impl UncleSearchEngine {
	/// Creates an engine over `reader`. A depth of zero is raised to one so
	/// the mined block's own uncles are always checked.
	pub fn new(reader: Arc<dyn ChainReader>, config: SearchConfig) -> Self {
		let config = SearchConfig {
			depth: config.depth.max(1),
		};
		Self { reader, config }
	}

	pub fn config(&self) -> &SearchConfig {
		&self.config
	}

	/// Determines the uncle status of `tx_hash`.
	///
	/// An unknown or not yet mined transaction yields [`TxReport::Unknown`]
	/// without error. Errors are returned only when the transaction, its
	/// receipt, its block or an ancestor inside the window cannot be fetched.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&tx_hash.to_string())))]
	pub async fn determine_tx_status(
		&self,
		tx_hash: &TransactionHash,
	) -> Result<TxReport, SearchError> {
		let Some(mined_block) = self.locate_mined_block(tx_hash).await? else {
			tracing::info!("Transaction not found");
			return Ok(TxReport::Unknown);
		};

		let report = match self.scan_window(&mined_block, tx_hash).await? {
			Some(uncle_block) => TxReport::WasUncled {
				mined_block,
				uncle_block,
			},
			None => TxReport::NotUncled { mined_block },
		};

		tracing::info!(status = %report.status(), "Determined transaction status");
		Ok(report)
	}

	/// Finds the canonical block that mined `tx_hash`, if any.
	async fn locate_mined_block(
		&self,
		tx_hash: &TransactionHash,
	) -> Result<Option<Block>, SearchError> {
		let tx = match self
			.reader
			.get_transaction_by_hash(tx_hash)
			.await
			.map_err(SearchError::TransactionLookup)?
		{
			TxLookup::Found(tx) => tx,
			TxLookup::NotFound => return Ok(None),
		};

		if !tx.is_mined() {
			tracing::debug!("Transaction is pending");
			return Ok(None);
		}

		let receipt = self
			.reader
			.get_transaction_receipt(&tx.hash)
			.await
			.map_err(SearchError::Receipt)?;

		let block = self
			.reader
			.get_block_by_hash(&receipt.block_hash)
			.await
			.map_err(SearchError::MinedBlock)?;

		tracing::debug!(block_number = block.number, "Located mined block");
		Ok(Some(block))
	}

	/// Walks back from `mined_block` until an uncle containing `tx_hash` is
	/// found or the window is exhausted.
	///
	/// No block outside the window is fetched, so a failure past the oldest
	/// examined block cannot fail the query.
	async fn scan_window(
		&self,
		mined_block: &Block,
		tx_hash: &TransactionHash,
	) -> Result<Option<Block>, SearchError> {
		let mut current = mined_block.clone();

		for examined in 1..=self.config.depth {
			tracing::debug!(
				block_number = current.number,
				uncles = current.uncles.len(),
				"Checking block"
			);

			if let Some(uncle) = uncles::find_in_uncles(self.reader.as_ref(), &current, tx_hash).await
			{
				tracing::info!(
					uncle_number = uncle.number,
					uncle_hash = %uncle.hash,
					"Found transaction in uncle"
				);
				return Ok(Some(uncle));
			}

			if examined == self.config.depth {
				break;
			}
			let Some(parent_number) = current.parent_number() else {
				break;
			};

			current = self
				.reader
				.get_block_by_number(parent_number)
				.await
				.map_err(|source| SearchError::AncestorBlock {
					number: parent_number,
					source,
				})?;
		}

		Ok(None)
	}
}

/// Determines the uncle status of `tx_hash` using `reader` and a window of
/// `depth` blocks.
pub async fn determine_tx_status(
	reader: Arc<dyn ChainReader>,
	tx_hash: &TransactionHash,
	depth: u64,
) -> Result<TxReport, SearchError> {
	UncleSearchEngine::new(reader, SearchConfig { depth })
		.determine_tx_status(tx_hash)
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;
	use async_trait::async_trait;
	use uncled_reader::implementations::memory::InMemoryChain;
	use uncled_reader::ReaderError;
	use uncled_types::{BlockHash, Receipt, Transaction, TxStatus};

	const MINED_AT: u64 = 100;

	fn tx(byte: u8) -> TransactionHash {
		TransactionHash(B256::repeat_byte(byte))
	}

	fn uncle(byte: u8, number: u64, txs: Vec<TransactionHash>) -> Block {
		Block {
			number,
			hash: B256::repeat_byte(byte),
			uncles: vec![],
			transactions: txs,
		}
	}

	/// Chain 80..=100 with `target` mined at block 100.
	fn chain_with_mined(target: TransactionHash) -> InMemoryChain {
		let mut chain = InMemoryChain::with_canonical_range(80..=MINED_AT);
		chain.mine_transaction(MINED_AT, target);
		chain
	}

	fn engine(chain: InMemoryChain) -> UncleSearchEngine {
		UncleSearchEngine::new(Arc::new(chain), SearchConfig::default())
	}

	#[tokio::test]
	async fn test_unknown_hash_is_not_an_error() {
		let engine = engine(chain_with_mined(tx(0x11)));

		let report = engine.determine_tx_status(&tx(0x99)).await.unwrap();

		assert_eq!(report, TxReport::Unknown);
		assert!(report.mined_block().is_none());
		assert!(report.uncle_block().is_none());
	}

	#[tokio::test]
	async fn test_not_uncled_without_uncles_in_window() {
		let target = tx(0x11);
		let engine = engine(chain_with_mined(target));

		let report = engine.determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::NotUncled);
		assert_eq!(report.mined_block().map(|b| b.number), Some(MINED_AT));
		assert!(report.uncle_block().is_none());
	}

	#[tokio::test]
	async fn test_not_uncled_when_uncles_lack_transaction() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT, uncle(0xa1, MINED_AT - 1, vec![tx(0x22)]));
		chain.attach_uncle(MINED_AT - 3, uncle(0xa2, MINED_AT - 4, vec![tx(0x33)]));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::NotUncled);
	}

	#[tokio::test]
	async fn test_match_in_ancestor_uncle() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		let uncled = uncle(0xa1, MINED_AT - 3, vec![tx(0x22), target]);
		chain.attach_uncle(MINED_AT - 2, uncled.clone());

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(
			report,
			TxReport::WasUncled {
				mined_block: Block {
					number: MINED_AT,
					hash: InMemoryChain::canonical_hash(MINED_AT),
					uncles: vec![],
					transactions: vec![target],
				},
				uncle_block: uncled,
			}
		);
	}

	#[tokio::test]
	async fn test_match_in_second_uncle() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT, uncle(0xa1, MINED_AT - 1, vec![tx(0x22)]));
		chain.attach_uncle(MINED_AT, uncle(0xa2, MINED_AT - 1, vec![target]));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::WasUncled);
		assert_eq!(
			report.uncle_block().map(|b| b.hash),
			Some(B256::repeat_byte(0xa2))
		);
	}

	#[tokio::test]
	async fn test_first_matching_uncle_wins() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 1, uncle(0xa1, MINED_AT - 2, vec![target]));
		chain.attach_uncle(MINED_AT - 1, uncle(0xa2, MINED_AT - 2, vec![target]));
		chain.attach_uncle(MINED_AT - 4, uncle(0xa3, MINED_AT - 5, vec![target]));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(
			report.uncle_block().map(|b| b.hash),
			Some(B256::repeat_byte(0xa1))
		);
	}

	#[tokio::test]
	async fn test_unavailable_uncle_is_skipped() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		let broken = B256::repeat_byte(0xa1);
		chain.attach_uncle(MINED_AT, uncle(0xa1, MINED_AT - 1, vec![target]));
		chain.fail_block_hash(broken);
		chain.attach_uncle(MINED_AT, uncle(0xa2, MINED_AT - 1, vec![target]));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::WasUncled);
		assert_eq!(
			report.uncle_block().map(|b| b.hash),
			Some(B256::repeat_byte(0xa2))
		);
	}

	#[tokio::test]
	async fn test_missing_uncles_only_yield_not_uncled() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_missing_uncle(MINED_AT, B256::repeat_byte(0xa1));
		chain.attach_missing_uncle(MINED_AT - 2, B256::repeat_byte(0xa2));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::NotUncled);
	}

	#[tokio::test]
	async fn test_mined_block_failure_is_distinct_from_not_found() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.fail_block_hash(InMemoryChain::canonical_hash(MINED_AT));
		let engine = engine(chain);

		let failed = engine.determine_tx_status(&target).await;
		assert!(matches!(failed, Err(SearchError::MinedBlock(_))));

		let not_found = engine.determine_tx_status(&tx(0x99)).await;
		assert!(matches!(not_found, Ok(TxReport::Unknown)));
	}

	#[tokio::test]
	async fn test_transaction_lookup_failure() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.fail_transaction(target);

		let err = engine(chain).determine_tx_status(&target).await.unwrap_err();

		assert!(matches!(err, SearchError::TransactionLookup(_)));
		assert_eq!(err.step(), "transaction");
	}

	#[tokio::test]
	async fn test_ancestor_failure_aborts_query() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 4, uncle(0xa1, MINED_AT - 5, vec![target]));
		chain.fail_block_number(MINED_AT - 3);

		let err = engine(chain).determine_tx_status(&target).await.unwrap_err();

		match err {
			SearchError::AncestorBlock { number, .. } => assert_eq!(number, MINED_AT - 3),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[tokio::test]
	async fn test_repeated_queries_are_identical() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 1, uncle(0xa1, MINED_AT - 2, vec![target]));
		let engine = engine(chain);

		let first = engine.determine_tx_status(&target).await.unwrap();
		let second = engine.determine_tx_status(&target).await.unwrap();

		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn test_match_at_oldest_block_in_window() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 5, uncle(0xa1, MINED_AT - 6, vec![target]));

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::WasUncled);
	}

	#[tokio::test]
	async fn test_match_beyond_window_not_found() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 6, uncle(0xa1, MINED_AT - 7, vec![target]));
		// The block past the window is never fetched.
		chain.fail_block_number(MINED_AT - 6);

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::NotUncled);
	}

	#[tokio::test]
	async fn test_depth_is_configurable() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT - 8, uncle(0xa1, MINED_AT - 9, vec![target]));
		let reader: Arc<dyn ChainReader> = Arc::new(chain);

		let shallow = determine_tx_status(Arc::clone(&reader), &target, 6)
			.await
			.unwrap();
		let deep = determine_tx_status(reader, &target, 9).await.unwrap();

		assert_eq!(shallow.status(), TxStatus::NotUncled);
		assert_eq!(deep.status(), TxStatus::WasUncled);
	}

	#[tokio::test]
	async fn test_zero_depth_still_checks_mined_block() {
		let target = tx(0x11);
		let mut chain = chain_with_mined(target);
		chain.attach_uncle(MINED_AT, uncle(0xa1, MINED_AT - 1, vec![target]));
		let reader: Arc<dyn ChainReader> = Arc::new(chain);

		let engine = UncleSearchEngine::new(Arc::clone(&reader), SearchConfig { depth: 0 });
		assert_eq!(engine.config().depth, 1);

		let report = determine_tx_status(reader, &target, 0).await.unwrap();
		assert_eq!(report.status(), TxStatus::WasUncled);
		assert_eq!(report.uncle_block().map(|b| b.number), Some(MINED_AT - 1));
	}

	#[tokio::test]
	async fn test_walk_stops_at_genesis() {
		let target = tx(0x11);
		let mut chain = InMemoryChain::with_canonical_range(0..=2);
		chain.mine_transaction(2, target);

		let report = engine(chain).determine_tx_status(&target).await.unwrap();

		assert_eq!(report.status(), TxStatus::NotUncled);
	}

	#[tokio::test]
	async fn test_request_sequence_is_bounded() {
		let target = tx(0x11);
		let chain = Arc::new(chain_with_mined(target));
		let engine = UncleSearchEngine::new(chain.clone(), SearchConfig::default());

		engine.determine_tx_status(&target).await.unwrap();

		// transaction, receipt, mined block, then five ancestors
		assert_eq!(chain.request_count(), 3 + 5);
	}

	/// Reader that reports every transaction as pending.
	struct PendingReader;

	#[async_trait]
	impl ChainReader for PendingReader {
		async fn get_transaction_by_hash(
			&self,
			hash: &TransactionHash,
		) -> Result<TxLookup, ReaderError> {
			Ok(TxLookup::Found(Transaction {
				hash: *hash,
				block_hash: None,
			}))
		}

		async fn get_transaction_receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<Receipt, ReaderError> {
			Err(ReaderError::ReceiptNotFound(*hash))
		}

		async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Block, ReaderError> {
			Err(ReaderError::BlockNotFound(hash.to_string()))
		}

		async fn get_block_by_number(&self, number: u64) -> Result<Block, ReaderError> {
			Err(ReaderError::BlockNotFound(number.to_string()))
		}
	}

	#[tokio::test]
	async fn test_pending_transaction_is_unknown() {
		let engine = UncleSearchEngine::new(Arc::new(PendingReader), SearchConfig::default());

		let report = engine.determine_tx_status(&tx(0x11)).await.unwrap();

		assert_eq!(report, TxReport::Unknown);
	}
}
