//! Transaction hash type and its textual validation.
//!
//! The core treats hashes as opaque keys. Presentation layers parse
//! user-supplied strings through [`TransactionHash::from_str`], which only
//! accepts the canonical `0x`-prefixed, 64-digit hex form.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Block hash as returned by the node.
pub type BlockHash = B256;

/// Length of a hex-encoded transaction hash including the `0x` prefix.
pub const TX_HASH_HEX_LEN: usize = 66;

/// Errors that can occur while parsing a transaction hash from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashParseError {
	/// The input does not start with `0x`.
	#[error("transaction hash must start with 0x")]
	MissingPrefix,
	/// The input has the wrong number of characters.
	#[error("transaction hash must be {expected} characters long, got {actual}")]
	InvalidLength { expected: usize, actual: usize },
	/// The input contains characters that are not hex digits.
	#[error("transaction hash is not valid hex: {0}")]
	InvalidHex(String),
}

/// 32-byte transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub B256);

impl TransactionHash {
	/// Returns the raw 32 bytes of the hash.
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0 .0
	}
}

impl From<B256> for TransactionHash {
	fn from(value: B256) -> Self {
		Self(value)
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl FromStr for TransactionHash {
	type Err = HashParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = s.strip_prefix("0x").ok_or(HashParseError::MissingPrefix)?;
		if s.len() != TX_HASH_HEX_LEN {
			return Err(HashParseError::InvalidLength {
				expected: TX_HASH_HEX_LEN,
				actual: s.len(),
			});
		}

		let mut bytes = [0u8; 32];
		hex::decode_to_slice(digits, &mut bytes)
			.map_err(|e| HashParseError::InvalidHex(e.to_string()))?;

		Ok(Self(B256::from(bytes)))
	}
}
