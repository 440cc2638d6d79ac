//! HTTP server for the uncle detector.
//!
//! Serves the HTML lookup pages and the JSON API on top of a single shared
//! search engine.

use crate::pages;
use axum::{
	extract::{Path, State},
	response::Json,
	routing::get,
	Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uncled_core::UncleSearchEngine;
use uncled_types::{APIError, TxStatusResponse};

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
	/// Search engine answering every request.
	pub engine: Arc<UncleSearchEngine>,
}

/// Builds the router with page routes and the `/api` routes.
pub fn router(engine: Arc<UncleSearchEngine>) -> Router {
	Router::new()
		.route("/", get(pages::handle_index))
		.route("/x", get(pages::handle_index))
		.route("/tx", get(pages::handle_tx_query))
		.route("/tx/", get(pages::handle_tx_query))
		.route("/tx/{tx_hash}", get(pages::handle_tx_path))
		.route("/{tx_hash}", get(pages::handle_tx_path))
		.nest(
			"/api",
			Router::new().route("/tx/{tx_hash}", get(handle_api_tx)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(AppState { engine })
}

/// Starts the HTTP server on `bind_address` and serves until it fails.
pub async fn start_server(
	bind_address: &str,
	engine: Arc<UncleSearchEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);
	let listener = TcpListener::bind(bind_address).await?;

	tracing::info!(addr = %bind_address, "HTTP server running");

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /api/tx/{tx_hash} requests.
async fn handle_api_tx(
	Path(tx_hash): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<TxStatusResponse>, APIError> {
	crate::apis::tx::get_tx_status(&state.engine, &tx_hash)
		.await
		.map(Json)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use tower::ServiceExt;
	use uncled_core::SearchConfig;
	use uncled_reader::implementations::memory::InMemoryChain;
	use uncled_types::{Block, TransactionHash};

	const UNCLED: u8 = 0x11;
	const PLAIN: u8 = 0x22;
	const BROKEN: u8 = 0x33;

	fn hash_str(byte: u8) -> String {
		format!("0x{}", format!("{:02x}", byte).repeat(32))
	}

	fn test_router() -> Router {
		let uncled = TransactionHash(B256::repeat_byte(UNCLED));
		let plain = TransactionHash(B256::repeat_byte(PLAIN));
		let broken = TransactionHash(B256::repeat_byte(BROKEN));

		let mut chain = InMemoryChain::with_canonical_range(1..=50);
		chain.mine_transaction(50, uncled);
		chain.mine_transaction(30, plain);
		chain.mine_transaction(10, broken);
		chain.attach_uncle(
			48,
			Block {
				number: 47,
				hash: B256::repeat_byte(0xa1),
				uncles: vec![],
				transactions: vec![uncled],
			},
		);
		chain.fail_block_number(8);

		let engine = UncleSearchEngine::new(Arc::new(chain), SearchConfig::default());
		router(Arc::new(engine))
	}

	async fn get(uri: &str) -> (StatusCode, String) {
		let response = test_router()
			.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, String::from_utf8(body.to_vec()).unwrap())
	}

	#[tokio::test]
	async fn test_api_reports_uncled_transaction() {
		let (status, body) = get(&format!("/api/tx/{}", hash_str(UNCLED))).await;

		assert_eq!(status, StatusCode::OK);
		let json: serde_json::Value = serde_json::from_str(&body).unwrap();
		assert_eq!(json["status"], "TxWasUncled");
		assert_eq!(json["minedBlock"]["number"], 50);
		assert_eq!(json["uncleBlock"]["number"], 47);
	}

	#[tokio::test]
	async fn test_api_reports_unknown_transaction() {
		let (status, body) = get(&format!("/api/tx/{}", hash_str(0x99))).await;

		assert_eq!(status, StatusCode::OK);
		let json: serde_json::Value = serde_json::from_str(&body).unwrap();
		assert_eq!(json["status"], "TxUnknown");
		assert!(json["minedBlock"].is_null());
	}

	#[tokio::test]
	async fn test_api_rejects_malformed_hash() {
		let (status, body) = get("/api/tx/0x1234").await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body.contains("INVALID_TX_HASH"));
	}

	#[tokio::test]
	async fn test_api_hides_internal_errors() {
		let (status, body) = get(&format!("/api/tx/{}", hash_str(BROKEN))).await;

		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(body.contains("LOOKUP_FAILED"));
		assert!(!body.contains("injected failure"));
	}

	#[tokio::test]
	async fn test_page_for_path_hash() {
		let (status, body) = get(&format!("/tx/{}", hash_str(PLAIN))).await;

		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("Not uncled."));
		assert!(body.contains("Mined in block 30"));
	}

	#[tokio::test]
	async fn test_query_overrides_path() {
		let (status, body) = get(&format!("/{}?hash={}", hash_str(PLAIN), hash_str(UNCLED))).await;

		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("Was uncled."));
	}

	#[tokio::test]
	async fn test_query_route_plain_text() {
		let (status, body) = get(&format!("/tx?hash={}&format=text", hash_str(UNCLED))).await;

		assert_eq!(status, StatusCode::OK);
		assert!(body.starts_with("tx was uncled in block 47"));
	}

	#[tokio::test]
	async fn test_page_rejects_malformed_hash() {
		let (status, body) = get("/tx/not-a-hash").await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body.contains("invalid tx hash"));
	}

	#[tokio::test]
	async fn test_page_lookup_failure() {
		let (status, body) = get(&format!("/tx/{}?format=text", hash_str(BROKEN))).await;

		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body, "error: tx check failed\n");
	}

	#[tokio::test]
	async fn test_index_routes() {
		for uri in ["/", "/x"] {
			let (status, body) = get(uri).await;
			assert_eq!(status, StatusCode::OK);
			assert!(body.contains("Was my transaction uncled?"));
		}
	}
}
