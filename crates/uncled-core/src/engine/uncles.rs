//! Uncle resolution for a single block.
//!
//! Every uncle header of a block is turned into an explicit outcome before the
//! block is searched, so unavailable uncles are dropped visibly instead of
//! aborting the scan.

use uncled_reader::{ChainReader, ReaderError};
use uncled_types::{truncate_id, Block, BlockHash, TransactionHash};

/// Outcome of resolving one uncle header into a full block.
#[derive(Debug)]
pub enum UncleResolution {
	/// The uncle block was fetched.
	Resolved(Block),
	/// The uncle block could not be fetched and is left out of the search.
	Skipped {
		hash: BlockHash,
		reason: ReaderError,
	},
}

impl UncleResolution {
	/// Returns the block if it was resolved.
	pub fn into_block(self) -> Option<Block> {
		match self {
			UncleResolution::Resolved(block) => Some(block),
			UncleResolution::Skipped { .. } => None,
		}
	}
}

/// Resolves the uncles of `block` in header order, one request per header.
pub async fn resolve_uncles(reader: &dyn ChainReader, block: &Block) -> Vec<UncleResolution> {
	let mut resolutions = Vec::with_capacity(block.uncles.len());
	for hash in &block.uncles {
		let resolution = match reader.get_block_by_hash(hash).await {
			Ok(uncle) => UncleResolution::Resolved(uncle),
			Err(reason) => UncleResolution::Skipped {
				hash: *hash,
				reason,
			},
		};
		resolutions.push(resolution);
	}
	resolutions
}

/// Returns the first uncle of `block`, in header order, that contains `tx_hash`.
///
/// Skipped uncles are logged and otherwise ignored.
pub async fn find_in_uncles(
	reader: &dyn ChainReader,
	block: &Block,
	tx_hash: &TransactionHash,
) -> Option<Block> {
	resolve_uncles(reader, block)
		.await
		.into_iter()
		.filter_map(|resolution| {
			if let UncleResolution::Skipped { hash, reason } = &resolution {
				tracing::warn!(
					block_number = block.number,
					uncle_hash = %hash,
					error = %reason,
					"Failed to get uncle block"
				);
			}
			resolution.into_block()
		})
		.find(|uncle| {
			tracing::debug!(
				uncle_hash = %truncate_id(&uncle.hash.to_string()),
				uncle_number = uncle.number,
				"Checking uncle"
			);
			uncle.contains_transaction(tx_hash)
		})
}
