//! Signing domain resolution.

use crate::SignatureError;
use nano_contract::{ChainInfo, ContractError, ContractReader, TokenContract};
use nano_types::{Address, Domain};
use std::sync::Arc;

/// Builds the EIP-712 domain of a token deployment.
///
/// The domain name is taken from, in order: the per-call override, the
/// configured default, the token's `name()`. The chain id is always queried.
pub struct DomainResolver {
	reader: Arc<dyn ContractReader>,
	chain: Arc<dyn ChainInfo>,
	verifying_contract: Address,
	default_name: Option<String>,
}

impl DomainResolver {
	pub fn new(
		reader: Arc<dyn ContractReader>,
		chain: Arc<dyn ChainInfo>,
		verifying_contract: Address,
	) -> Self {
		Self {
			reader,
			chain,
			verifying_contract,
			default_name: None,
		}
	}

	pub fn for_contract(contract: &TokenContract) -> Self {
		Self::new(contract.reader.clone(), contract.chain.clone(), contract.address)
	}

	/// Sets the name used when a call gives no override.
	pub fn with_default_name(mut self, name: Option<String>) -> Self {
		self.default_name = name;
		self
	}

	pub async fn resolve(&self, name_override: Option<&str>) -> Result<Domain, SignatureError> {
		let name = match name_override.or(self.default_name.as_deref()) {
			Some(name) => name.to_string(),
			None => self.read_name().await?,
		};
		let chain_id = self.chain.chain_id().await?;

		tracing::debug!(
			name = %name,
			chain_id,
			verifying_contract = %self.verifying_contract,
			"Resolved signing domain"
		);

		Ok(Domain::new(name, chain_id, self.verifying_contract))
	}

	async fn read_name(&self) -> Result<String, ContractError> {
		let value = self.reader.read("name", &[]).await?;
		value
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| ContractError::Decode(format!("name() returned {:?}", value)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeToken;

	#[tokio::test]
	async fn test_reads_name_without_override() {
		let token = FakeToken::new();
		let resolver = DomainResolver::for_contract(&token.contract());

		let domain = resolver.resolve(None).await.unwrap();
		assert_eq!(domain.name, "Nano Token");
		assert_eq!(domain.version, "1");
		assert_eq!(domain.chain_id, 31337);
		assert_eq!(domain.verifying_contract, token.address);
		assert_eq!(token.read_functions(), vec!["name"]);
	}

	#[tokio::test]
	async fn test_override_precedence() {
		let token = FakeToken::new();
		let resolver = DomainResolver::for_contract(&token.contract())
			.with_default_name(Some("Configured".to_string()));

		assert_eq!(resolver.resolve(None).await.unwrap().name, "Configured");
		assert_eq!(resolver.resolve(Some("Override")).await.unwrap().name, "Override");
		assert!(token.read_functions().is_empty());
	}

	#[tokio::test]
	async fn test_read_failure_propagates() {
		let token = FakeToken::failing();
		let resolver = DomainResolver::for_contract(&token.contract());

		assert!(matches!(
			resolver.resolve(None).await,
			Err(SignatureError::Contract(ContractError::Network(_)))
		));
	}

	#[tokio::test]
	async fn test_chain_id_failure_propagates() {
		let token = FakeToken::failing();
		let resolver = DomainResolver::for_contract(&token.contract());

		// The override skips the name read, so the chain-id query is what fails.
		assert!(matches!(
			resolver.resolve(Some("Nano Token")).await,
			Err(SignatureError::Contract(ContractError::Network(m))) if m.contains("chain")
		));
		assert!(token.read_functions().is_empty());
	}
}
