//! Factory registry and the per-run relay context.
//!
//! Implementations register themselves by name; the configuration picks one
//! per section through its `primary` key.

use crate::ServiceError;
use nano_account::{AccountFactory, AccountInterface};
use nano_config::{AccountConfig, Config};
use nano_contract::{ContractFactory, TokenContract};
use nano_signatures::{DomainResolver, NonceResolver, SignatureRequestBuilder, SubmissionAdapter};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub account: HashMap<String, AccountFactory>,
	pub contract: HashMap<String, ContractFactory>,
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Get the global factory registry, registering every implementation on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut account = HashMap::new();
		for (name, factory) in nano_account::get_all_implementations() {
			tracing::debug!("Registering account implementation: {}", name);
			account.insert(name.to_string(), factory);
		}

		let mut contract = HashMap::new();
		for (name, factory) in nano_contract::get_all_implementations() {
			tracing::debug!("Registering contract implementation: {}", name);
			contract.insert(name.to_string(), factory);
		}

		FactoryRegistry { account, contract }
	})
}

/// Accounts and contract client built from one configuration.
pub struct RelayContext {
	pub signer: Arc<dyn AccountInterface>,
	pub relayer: Arc<dyn AccountInterface>,
	pub contract: TokenContract,
	token_name: Option<String>,
	deadline_ttl_seconds: u64,
}

impl RelayContext {
	pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
		let registry = get_registry();

		let signer = build_account(registry, "account", &config.account)?;
		let relayer = build_account(registry, "relayer", config.relayer_account())?;

		let factory = registry
			.contract
			.get(&config.contract.primary)
			.ok_or_else(|| ServiceError::UnknownImplementation {
				section: "contract",
				name: config.contract.primary.clone(),
			})?;
		let table = config
			.contract
			.primary_config()
			.ok_or_else(|| ServiceError::Input("contract primary has no table".to_string()))?;

		// The client may send from either account.
		let keys: Vec<_> = [signer.private_key(), relayer.private_key()]
			.into_iter()
			.flatten()
			.collect();
		let contract = factory(table, config.token.address, &keys)?;

		tracing::info!(
			token = %contract.address,
			signer = ?signer.address(),
			relayer = ?relayer.address(),
			"Built relay context"
		);

		Ok(Self {
			signer,
			relayer,
			contract,
			token_name: config.token.name.clone(),
			deadline_ttl_seconds: config.signing.deadline_ttl_seconds,
		})
	}

	pub fn domains(&self) -> DomainResolver {
		DomainResolver::for_contract(&self.contract).with_default_name(self.token_name.clone())
	}

	pub fn builder(&self) -> SignatureRequestBuilder {
		SignatureRequestBuilder::new(
			self.domains(),
			NonceResolver::new(self.contract.reader.clone()),
			self.signer.clone(),
		)
		.with_deadline_ttl(self.deadline_ttl_seconds)
	}

	pub fn submission(&self) -> SubmissionAdapter {
		SubmissionAdapter::new(self.contract.writer.clone(), self.relayer.address())
	}
}

fn build_account(
	registry: &FactoryRegistry,
	section: &'static str,
	config: &AccountConfig,
) -> Result<Arc<dyn AccountInterface>, ServiceError> {
	let factory = registry.account.get(&config.primary).ok_or_else(|| {
		ServiceError::UnknownImplementation {
			section,
			name: config.primary.clone(),
		}
	})?;
	let table = config
		.primary_config()
		.ok_or_else(|| ServiceError::Input(format!("{} primary has no table", section)))?;

	Ok(Arc::from(factory(table)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
[token]
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
name = "Nano Token"

[signing]
deadline_ttl_seconds = 120

[contract]
primary = "evm_alloy"
[contract.implementations.evm_alloy]
rpc_url = "http://localhost:8545"

[account]
primary = "local"
[account.implementations.local]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[relayer]
primary = "local"
[relayer.implementations.local]
private_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
"#;

	#[test]
	fn test_registry_has_implementations() {
		let registry = get_registry();
		assert!(registry.account.contains_key("local"));
		assert!(registry.contract.contains_key("evm_alloy"));
	}

	#[tokio::test]
	async fn test_context_from_config() {
		let config: Config = CONFIG.parse().unwrap();
		let context = RelayContext::from_config(&config).unwrap();

		assert_eq!(
			context.signer.address().map(|a| a.to_checksum(None)),
			Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string())
		);
		assert_eq!(
			context.relayer.address().map(|a| a.to_checksum(None)),
			Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string())
		);
		assert_eq!(context.contract.address, config.token.address);
		assert_eq!(context.builder().signer_address(), context.signer.address());
	}

	#[tokio::test]
	async fn test_unknown_contract_implementation() {
		let config: Config = CONFIG
			.replace("primary = \"evm_alloy\"", "primary = \"other\"")
			.replace("[contract.implementations.evm_alloy]", "[contract.implementations.other]")
			.parse()
			.unwrap();

		assert!(matches!(
			RelayContext::from_config(&config),
			Err(ServiceError::UnknownImplementation { section: "contract", .. })
		));
	}
}
