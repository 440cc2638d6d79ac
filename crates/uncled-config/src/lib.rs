//! Configuration module for the uncle detector.
//!
//! This module provides structures and utilities for managing the node
//! connection, the uncle search window and the HTTP server settings. It
//! supports loading configuration from TOML files with environment variable
//! interpolation and validates all values after parsing.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the uncle detector.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Connection to the node that is queried.
	pub node: NodeConfig,
	/// Uncle search window settings.
	#[serde(default)]
	pub search: SearchSettings,
	/// Configuration for the HTTP server.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Connection settings for the node RPC endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
	/// HTTP(S) JSON-RPC endpoint of the node (eth node, Infura, etc.).
	pub rpc_url: String,
	/// Deadline for each individual RPC request, in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
}

/// Settings for the backward uncle scan.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
	/// Number of blocks examined, the mined block included.
	#[serde(default = "default_search_depth")]
	pub depth: u64,
}

impl Default for SearchSettings {
	fn default() -> Self {
		Self {
			depth: default_search_depth(),
		}
	}
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

impl ApiConfig {
	/// Returns the `host:port` bind address.
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

fn default_timeout_seconds() -> u64 {
	30
}

/// Default window size, the mined block included.
fn default_search_depth() -> u64 {
	6
}

fn default_api_host() -> String {
	"localhost".to_string()
}

fn default_api_port() -> u16 {
	8088
}

/// Upper bound for the search depth.
const MAX_SEARCH_DEPTH: u64 = 64;

/// Upper bound for the per-request timeout, in seconds.
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let var_name = &caps[1];
		match std::env::var(var_name) {
			Ok(value) => value,
			Err(_) => match caps.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					missing.get_or_insert_with(|| var_name.to_string());
					String::new()
				},
			},
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following include directives.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Builds a validated configuration for `rpc_url` with default settings.
	///
	/// Used when no configuration file is given on the command line.
	pub fn for_node(rpc_url: impl Into<String>) -> Result<Self, ConfigError> {
		let config = Config {
			node: NodeConfig {
				rpc_url: rpc_url.into(),
				timeout_seconds: default_timeout_seconds(),
			},
			search: SearchSettings::default(),
			api: ApiConfig::default(),
		};
		config.validate()?;
		Ok(config)
	}

	/// Parses and validates TOML whose environment variables were already
	/// resolved. Values are taken literally, `${...}` included.
	pub(crate) fn from_resolved(resolved: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration to ensure all values are usable.
	///
	/// - Node RPC URL is non-empty and uses http or https
	/// - Request timeout is between 1 and 300 seconds
	/// - Search depth is between 1 and 64 blocks
	/// - API port is non-zero
	pub fn validate(&self) -> Result<(), ConfigError> {
		let rpc_url = self.node.rpc_url.trim();
		if rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"No eth node URI provided (node.rpc_url)".into(),
			));
		}
		if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
			return Err(ConfigError::Validation(format!(
				"node.rpc_url must be an http(s) URL, got '{}'",
				rpc_url
			)));
		}

		if self.node.timeout_seconds == 0 || self.node.timeout_seconds > MAX_TIMEOUT_SECONDS {
			return Err(ConfigError::Validation(format!(
				"node.timeout_seconds must be between 1 and {}",
				MAX_TIMEOUT_SECONDS
			)));
		}

		if self.search.depth == 0 || self.search.depth > MAX_SEARCH_DEPTH {
			return Err(ConfigError::Validation(format!(
				"search.depth must be between 1 and {}",
				MAX_SEARCH_DEPTH
			)));
		}

		if self.api.port == 0 {
			return Err(ConfigError::Validation("api.port cannot be 0".into()));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		Config::from_resolved(&resolved)
	}
}
