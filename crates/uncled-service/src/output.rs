//! Human-readable summaries of a query result.
//!
//! Shared by the `check` subcommand and the plain-text HTTP responses.

use uncled_types::TxReport;

/// One-line summary for each of the three outcomes.
pub fn summary_line(report: &TxReport) -> String {
	match report {
		TxReport::Unknown => "tx not found".to_string(),
		TxReport::NotUncled { mined_block } => format!(
			"tx not uncled (mined in block {} {})",
			mined_block.number, mined_block.hash
		),
		TxReport::WasUncled {
			mined_block,
			uncle_block,
		} => format!(
			"tx was uncled in block {} {} (mined in block {} {})",
			uncle_block.number, uncle_block.hash, mined_block.number, mined_block.hash
		),
	}
}
