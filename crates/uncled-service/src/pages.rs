//! HTML and plain-text pages served by the web front end.

use crate::output::summary_line;
use crate::server::AppState;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use uncled_types::{escape_html, TransactionHash, TxReport};

/// Query parameters accepted by the result routes.
#[derive(Debug, Default, Deserialize)]
pub struct TxQuery {
	/// Overrides the hash given in the path.
	pub hash: Option<String>,
	/// `text` selects a plain-text response instead of HTML.
	pub format: Option<String>,
}

impl TxQuery {
	fn wants_text(&self) -> bool {
		self.format.as_deref() == Some("text")
	}
}

/// What the result page reports.
enum PageOutcome<'a> {
	InvalidHash,
	LookupFailed,
	Report(&'a TxReport),
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Was my transaction uncled?</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 3rem auto; padding: 0 1rem; }
code { word-break: break-all; }
input[type=text] { width: 100%; font-family: monospace; }
.error { color: #b00020; }
</style>
</head>
<body>
<h1>Was my transaction uncled?</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

fn lookup_form(value: &str) -> String {
	format!(
		"<form action=\"/tx\" method=\"get\">\n\
		<input type=\"text\" name=\"hash\" placeholder=\"0x...\" value=\"{}\">\n\
		<button type=\"submit\">Check</button>\n\
		</form>\n",
		escape_html(value)
	)
}

/// Renders the landing page.
pub fn index_page() -> String {
	format!(
		"{}<p>Check whether a transaction was also included in an uncle block \
		of the block that mined it or one of its recent ancestors.</p>\n{}{}",
		PAGE_HEAD,
		lookup_form(""),
		PAGE_TAIL
	)
}

fn result_page(raw_hash: &str, outcome: PageOutcome<'_>) -> String {
	let body = match outcome {
		PageOutcome::InvalidHash => "<p class=\"error\">invalid tx hash</p>\n".to_string(),
		PageOutcome::LookupFailed => {
			"<p class=\"error\">the transaction could not be checked, please try again later</p>\n"
				.to_string()
		},
		PageOutcome::Report(TxReport::Unknown) => "<p>Transaction not found.</p>\n".to_string(),
		PageOutcome::Report(TxReport::NotUncled { mined_block }) => format!(
			"<p><strong>Not uncled.</strong></p>\n\
			<p>Mined in block {} <code>{}</code></p>\n",
			mined_block.number, mined_block.hash
		),
		PageOutcome::Report(TxReport::WasUncled {
			mined_block,
			uncle_block,
		}) => format!(
			"<p><strong>Was uncled.</strong></p>\n\
			<p>Included in uncle block {} <code>{}</code></p>\n\
			<p>Mined in block {} <code>{}</code></p>\n",
			uncle_block.number, uncle_block.hash, mined_block.number, mined_block.hash
		),
	};

	format!(
		"{}<p>Transaction <code>{}</code></p>\n{}{}{}",
		PAGE_HEAD,
		escape_html(raw_hash),
		body,
		lookup_form(raw_hash),
		PAGE_TAIL
	)
}

/// Handles GET / and GET /x.
pub async fn handle_index() -> Html<String> {
	Html(index_page())
}

/// Handles GET /{tx_hash} and GET /tx/{tx_hash}.
pub async fn handle_tx_path(
	State(state): State<AppState>,
	Path(tx_hash): Path<String>,
	Query(query): Query<TxQuery>,
) -> Response {
	let raw_hash = match query.hash.as_deref() {
		Some(hash) if !hash.is_empty() => hash.to_string(),
		_ => tx_hash,
	};
	respond(&state, &raw_hash, query.wants_text()).await
}

/// Handles GET /tx and GET /tx/.
pub async fn handle_tx_query(
	State(state): State<AppState>,
	Query(query): Query<TxQuery>,
) -> Response {
	let raw_hash = query.hash.clone().unwrap_or_default();
	respond(&state, &raw_hash, query.wants_text()).await
}

async fn respond(state: &AppState, raw_hash: &str, as_text: bool) -> Response {
	tracing::info!(tx_hash = %raw_hash, "Check tx");

	let tx_hash = match raw_hash.parse::<TransactionHash>() {
		Ok(hash) => hash,
		Err(e) => {
			tracing::debug!(error = %e, "Rejected tx hash");
			return render(StatusCode::BAD_REQUEST, raw_hash, PageOutcome::InvalidHash, as_text);
		},
	};

	match state.engine.determine_tx_status(&tx_hash).await {
		Ok(report) => render(StatusCode::OK, raw_hash, PageOutcome::Report(&report), as_text),
		Err(e) => {
			tracing::error!(step = e.step(), error = %e, "tx check failed");
			render(
				StatusCode::INTERNAL_SERVER_ERROR,
				raw_hash,
				PageOutcome::LookupFailed,
				as_text,
			)
		},
	}
}

fn render(status: StatusCode, raw_hash: &str, outcome: PageOutcome<'_>, as_text: bool) -> Response {
	if !as_text {
		return (status, Html(result_page(raw_hash, outcome))).into_response();
	}

	let line = match outcome {
		PageOutcome::InvalidHash => "error: invalid tx hash".to_string(),
		PageOutcome::LookupFailed => "error: tx check failed".to_string(),
		PageOutcome::Report(report) => summary_line(report),
	};
	(status, format!("{}\n", line)).into_response()
}
