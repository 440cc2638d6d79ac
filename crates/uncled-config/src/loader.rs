//! Configuration loader for multi-file configurations.
//!
//! A main file may pull in further files through `include`, and included
//! files may include more. Files are merged section by section; a top-level
//! section defined in two files is rejected, as is a file included twice.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Loads a configuration file together with its includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against
	base_path: PathBuf,
	/// Canonical paths already read, to reject include cycles
	loaded_files: HashSet<PathBuf>,
	/// File that defined each top-level section
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads `config_path` and its includes into a validated [`Config`].
	///
	/// Included files may include further files. Every path is resolved
	/// against the base directory.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.resolve_path(config_path)?;
		let content = self.load_file(&config_path).await?;
		let mut root: toml::Value = toml::from_str(&content)?;

		let mut pending = take_includes(&mut root)?;
		if pending.is_empty() {
			return Config::from_resolved(&content);
		}

		if let Some(table) = root.as_table() {
			for key in table.keys() {
				self.section_sources.insert(key.clone(), config_path.clone());
			}
		}

		// Depth-first, in declaration order
		pending.reverse();
		while let Some(include) = pending.pop() {
			let include_path = self.resolve_path(&include)?;
			let include_content = self.load_file(&include_path).await?;
			let mut include_root: toml::Value = toml::from_str(&include_content)?;

			let nested = take_includes(&mut include_root)?;
			self.merge(&mut root, include_root, &include_path)?;
			pending.extend(nested.into_iter().rev());
		}

		let combined = toml::to_string(&root).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		Config::from_resolved(&combined)
	}

	/// Moves the sections of `include` into `root`, rejecting duplicates.
	fn merge(
		&mut self,
		root: &mut toml::Value,
		include: toml::Value,
		include_path: &Path,
	) -> Result<(), ConfigError> {
		let toml::Value::Table(sections) = include else {
			return Ok(());
		};

		for (key, value) in sections {
			if let Some(existing) = self.section_sources.get(&key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					key,
					existing.display(),
					include_path.display()
				)));
			}
			self.section_sources
				.insert(key.clone(), include_path.to_path_buf());
			if let Some(table) = root.as_table_mut() {
				table.insert(key, value);
			}
		}

		Ok(())
	}

	/// Reads a file once and resolves environment variables in it.
	async fn load_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.loaded_files.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}

		Ok(resolved)
	}
}

/// Removes the `include` directive from `root` and returns its paths.
fn take_includes(root: &mut toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	let includes = extract_includes(root)?;
	if let Some(table) = root.as_table_mut() {
		table.remove("include");
	}
	Ok(includes)
}

/// Reads the `include` directive, a string or an array of strings.
fn extract_includes(root: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match root.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}
