//! JSON-RPC chain reader built on the Alloy provider.
//!
//! Requests are issued as raw `eth_*` calls so that uncle blocks, which most
//! typed block APIs do not distinguish from canonical ones, come back in the
//! same minimal shape as any other block: number, hash, uncle hashes and
//! transaction hashes.

use crate::{ChainReader, ReaderError};
use alloy_primitives::{B256, U64};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;
use uncled_types::{Block, BlockHash, Receipt, Transaction, TransactionHash, TxLookup};

/// Transaction fields read from `eth_getTransactionByHash`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
	hash: B256,
	block_hash: Option<B256>,
}

/// Receipt fields read from `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
	transaction_hash: B256,
	block_hash: B256,
	block_number: U64,
}

/// Block fields read from `eth_getBlockBy*` with hash-only transactions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlock {
	number: U64,
	hash: B256,
	#[serde(default)]
	uncles: Vec<B256>,
	#[serde(default)]
	transactions: Vec<B256>,
}

impl From<RpcTransaction> for Transaction {
	fn from(tx: RpcTransaction) -> Self {
		Transaction {
			hash: TransactionHash(tx.hash),
			block_hash: tx.block_hash,
		}
	}
}

impl From<RpcReceipt> for Receipt {
	fn from(receipt: RpcReceipt) -> Self {
		Receipt {
			transaction_hash: TransactionHash(receipt.transaction_hash),
			block_hash: receipt.block_hash,
			block_number: receipt.block_number.to::<u64>(),
		}
	}
}

impl From<RpcBlock> for Block {
	fn from(block: RpcBlock) -> Self {
		Block {
			number: block.number.to::<u64>(),
			hash: block.hash,
			uncles: block.uncles,
			transactions: block.transactions.into_iter().map(TransactionHash).collect(),
		}
	}
}

/// Alloy-based chain reader talking to a single node over HTTP.
///
/// Every request is bounded by `request_timeout`; dropping the returned
/// future cancels the in-flight request.
pub struct AlloyReader {
	provider: RootProvider<Http<reqwest::Client>>,
	request_timeout: Duration,
}

impl AlloyReader {
	/// Creates a reader for the node at `rpc_url`.
	pub fn new(rpc_url: &str, request_timeout: Duration) -> Result<Self, ReaderError> {
		let url: reqwest::Url = rpc_url
			.parse()
			.map_err(|e| ReaderError::Network(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().on_http(url);

		Ok(Self {
			provider,
			request_timeout,
		})
	}

	/// Awaits an RPC call under the request deadline.
	async fn bounded<F, T, E>(&self, method: &'static str, call: F) -> Result<T, ReaderError>
	where
		F: IntoFuture<Output = Result<T, E>>,
		E: Display,
	{
		match tokio::time::timeout(self.request_timeout, call).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(e)) => Err(ReaderError::Network(format!("{} failed: {}", method, e))),
			Err(_) => Err(ReaderError::Timeout {
				method: method.to_string(),
				seconds: self.request_timeout.as_secs(),
			}),
		}
	}
}

#[async_trait]
impl ChainReader for AlloyReader {
	async fn get_transaction_by_hash(
		&self,
		hash: &TransactionHash,
	) -> Result<TxLookup, ReaderError> {
		let tx: Option<RpcTransaction> = self
			.bounded(
				"eth_getTransactionByHash",
				self.provider
					.client()
					.request("eth_getTransactionByHash", (hash.0,)),
			)
			.await?;

		Ok(match tx {
			Some(tx) => TxLookup::Found(tx.into()),
			None => TxLookup::NotFound,
		})
	}

	async fn get_transaction_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Receipt, ReaderError> {
		let receipt: Option<RpcReceipt> = self
			.bounded(
				"eth_getTransactionReceipt",
				self.provider
					.client()
					.request("eth_getTransactionReceipt", (hash.0,)),
			)
			.await?;

		receipt
			.map(Receipt::from)
			.ok_or(ReaderError::ReceiptNotFound(*hash))
	}

	async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Block, ReaderError> {
		let block: Option<RpcBlock> = self
			.bounded(
				"eth_getBlockByHash",
				self.provider
					.client()
					.request("eth_getBlockByHash", (*hash, false)),
			)
			.await?;

		block
			.map(Block::from)
			.ok_or_else(|| ReaderError::BlockNotFound(hash.to_string()))
	}

	async fn get_block_by_number(&self, number: u64) -> Result<Block, ReaderError> {
		let block: Option<RpcBlock> = self
			.bounded(
				"eth_getBlockByNumber",
				self.provider
					.client()
					.request("eth_getBlockByNumber", (U64::from(number), false)),
			)
			.await?;

		block
			.map(Block::from)
			.ok_or_else(|| ReaderError::BlockNotFound(format!("number {}", number)))
	}
}

/// Factory function to create an HTTP chain reader.
///
/// # Parameters
/// - `rpc_url`: HTTP(S) endpoint of the node
/// - `timeout_seconds`: deadline applied to each individual request
pub fn create_reader(
	rpc_url: &str,
	timeout_seconds: u64,
) -> Result<Box<dyn ChainReader>, ReaderError> {
	let reader = AlloyReader::new(rpc_url, Duration::from_secs(timeout_seconds))?;
	tracing::info!(rpc_url = %rpc_url, timeout_seconds, "Created chain reader");
	Ok(Box::new(reader))
}
