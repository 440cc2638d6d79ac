//! Transaction status API.
//!
//! Serves `GET /api/tx/{hash}` with the same outcome the HTML pages show,
//! encoded as a [`TxStatusResponse`].

use tracing::{info, warn};
use uncled_core::UncleSearchEngine;
use uncled_types::{APIError, TransactionHash, TxStatusResponse};

/// Validates `raw_hash` and determines its uncle status.
///
/// Internal failures are logged with their cause and reported to the client
/// with a generic message.
pub async fn get_tx_status(
	engine: &UncleSearchEngine,
	raw_hash: &str,
) -> Result<TxStatusResponse, APIError> {
	let tx_hash: TransactionHash = raw_hash.parse().map_err(|e| APIError::BadRequest {
		error_type: "INVALID_TX_HASH".to_string(),
		message: format!("invalid tx hash: {}", e),
	})?;

	info!(tx_hash = %tx_hash, "Checking transaction via API");

	match engine.determine_tx_status(&tx_hash).await {
		Ok(report) => Ok(TxStatusResponse::from_report(tx_hash, &report)),
		Err(e) => {
			warn!(step = e.step(), error = %e, "tx check failed");
			Err(APIError::InternalServerError {
				error_type: "LOOKUP_FAILED".to_string(),
				message: "the transaction could not be checked".to_string(),
			})
		},
	}
}
