//! Configuration module for the NanoToken relay.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, which keeps private
//! keys out of the file itself.
//!
//! ```toml
//! [token]
//! address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
//!
//! [signing]
//! deadline_ttl_seconds = 3600
//!
//! [contract]
//! primary = "evm_alloy"
//! [contract.implementations.evm_alloy]
//! rpc_url = "http://localhost:8545"
//!
//! [account]
//! primary = "local"
//! [account.implementations.local]
//! private_key = "${SIGNER_PRIVATE_KEY}"
//! ```

use nano_types::{parse_address, Address};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
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

/// Upper bound for `signing.deadline_ttl_seconds` (30 days).
pub const MAX_DEADLINE_TTL_SECONDS: u64 = 30 * 24 * 3600;

/// Main configuration structure for the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// The token deployment signatures are scoped to.
	pub token: TokenConfig,
	/// Signing defaults.
	#[serde(default)]
	pub signing: SigningConfig,
	/// Contract client implementations.
	pub contract: ContractConfig,
	/// Account that signs authorizations.
	pub account: AccountConfig,
	/// Account that submits signed authorizations and pays for gas.
	/// Falls back to `account` when absent.
	pub relayer: Option<AccountConfig>,
}

/// Token deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Verifying contract of every signing domain.
	#[serde(deserialize_with = "deserialize_address")]
	pub address: Address,
	/// Domain name to use instead of reading `name()` from the token.
	pub name: Option<String>,
}

/// Signing defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningConfig {
	/// Seconds added to the current time when no deadline is given.
	/// Defaults to 3600 seconds (1 hour) if not specified.
	#[serde(default = "default_deadline_ttl_seconds")]
	pub deadline_ttl_seconds: u64,
}

impl Default for SigningConfig {
	fn default() -> Self {
		Self {
			deadline_ttl_seconds: default_deadline_ttl_seconds(),
		}
	}
}

fn default_deadline_ttl_seconds() -> u64 {
	3600
}

/// Configuration for contract clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of contract implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for an account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl AccountConfig {
	/// The table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

impl ContractConfig {
	/// The table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

fn deserialize_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
	D: Deserializer<'de>,
{
	let text = String::deserialize(deserializer)?;
	parse_address(&text).map_err(serde::de::Error::custom)
}

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

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(var_name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)));
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// The relayer account, or the signing account when none is configured.
	pub fn relayer_account(&self) -> &AccountConfig {
		self.relayer.as_ref().unwrap_or(&self.account)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - `signing.deadline_ttl_seconds` lies in 1..=30 days
	/// - every `primary` names a configured implementation
	/// - a configured token name is not empty
	fn validate(&self) -> Result<(), ConfigError> {
		if let Some(name) = &self.token.name {
			if name.trim().is_empty() {
				return Err(ConfigError::Validation(
					"token.name cannot be empty when set".into(),
				));
			}
		}

		let ttl = self.signing.deadline_ttl_seconds;
		if ttl == 0 || ttl > MAX_DEADLINE_TTL_SECONDS {
			return Err(ConfigError::Validation(format!(
				"signing.deadline_ttl_seconds must be between 1 and {}, got {}",
				MAX_DEADLINE_TTL_SECONDS, ttl
			)));
		}

		validate_primary("contract", &self.contract.primary, &self.contract.implementations)?;
		validate_primary("account", &self.account.primary, &self.account.implementations)?;
		if let Some(relayer) = &self.relayer {
			validate_primary("relayer", &relayer.primary, &relayer.implementations)?;
		}

		Ok(())
	}
}

fn validate_primary(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		)));
	}
	Ok(())
}

/// Parses TOML, resolving environment variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
