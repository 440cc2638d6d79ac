//! API types for the uncle detector HTTP endpoints.

use crate::{Block, BlockHash, TransactionHash, TxReport, TxStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number and hash of a block, as exposed to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
	pub number: u64,
	pub hash: BlockHash,
}

impl From<&Block> for BlockSummary {
	fn from(block: &Block) -> Self {
		Self {
			number: block.number,
			hash: block.hash,
		}
	}
}

/// Response body for `GET /api/tx/{hash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatusResponse {
	pub tx_hash: TransactionHash,
	pub status: TxStatus,
	pub mined_block: Option<BlockSummary>,
	pub uncle_block: Option<BlockSummary>,
}

impl TxStatusResponse {
	pub fn from_report(tx_hash: TransactionHash, report: &TxReport) -> Self {
		Self {
			tx_hash,
			status: report.status(),
			mined_block: report.mined_block().map(BlockSummary::from),
			uncle_block: report.uncle_block().map(BlockSummary::from),
		}
	}
}

/// Standard error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed request, e.g. an invalid transaction hash (400)
	BadRequest { error_type: String, message: String },
	/// The lookup could not be completed (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		(status, Json(self.to_error_response())).into_response()
	}
}
