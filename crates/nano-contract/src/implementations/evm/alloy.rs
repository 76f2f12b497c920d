//! Alloy-backed token contract client.
//!
//! Reads go through `eth_call`, writes through `eth_sendTransaction` with a
//! local wallet that holds every key the client may send from. The `from`
//! field of each write selects the signing key.

use crate::{abi, ChainInfo, ContractError, ContractReader, ContractWriter, TokenContract};
use alloy_dyn_abi::DynSolValue;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use async_trait::async_trait;
use nano_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString,
	TransactionHash, ValidationError,
};
use std::sync::Arc;

type HttpProvider = Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>;

/// Token contract client over an HTTP JSON-RPC endpoint.
pub struct AlloyTokenContract {
	address: Address,
	provider: HttpProvider,
}

impl AlloyTokenContract {
	/// Creates a client for the token at `address`.
	///
	/// Without signers the client can only read.
	pub fn new(
		rpc_url: &str,
		address: Address,
		signers: Vec<PrivateKeySigner>,
	) -> Result<Self, ContractError> {
		let url: reqwest::Url = rpc_url
			.parse()
			.map_err(|e| ContractError::Network(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let mut signers = signers.into_iter();
		let provider: HttpProvider = match signers.next() {
			Some(first) => {
				let mut wallet = EthereumWallet::from(first);
				for signer in signers {
					wallet.register_signer(signer);
				}
				Arc::new(
					ProviderBuilder::new()
						.with_recommended_fillers()
						.wallet(wallet)
						.on_http(url),
				)
			},
			None => Arc::new(ProviderBuilder::new().on_http(url)),
		};

		Ok(Self { address, provider })
	}
}

/// Node error responses become [`ContractError::Call`]; failures to reach the
/// node become [`ContractError::Network`].
fn rpc_error(action: String, error: TransportError) -> ContractError {
	match error.as_error_resp() {
		Some(payload) => ContractError::Call(format!("{}: {}", action, payload)),
		None => ContractError::Network(format!("{}: {}", action, error)),
	}
}

/// Configuration schema for the alloy contract client.
pub struct AlloyContractSchema;

impl ConfigSchema for AlloyContractSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("rpc_url", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
							Ok(())
						},
						_ => Err("rpc_url must be an http(s) URL".to_string()),
					}
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl ContractReader for AlloyTokenContract {
	async fn read(&self, function: &str, args: &[DynSolValue]) -> Result<DynSolValue, ContractError> {
		let calldata = abi::encode_call(function, args)?;
		let request = TransactionRequest::default()
			.to(self.address)
			.input(calldata.into());

		let output = self
			.provider
			.call(&request)
			.await
			.map_err(|e| rpc_error(format!("Failed to call {}", function), e))?;

		tracing::debug!(contract = %self.address, function, "Read contract");
		abi::decode_output(function, &output)
	}
}

#[async_trait]
impl ContractWriter for AlloyTokenContract {
	async fn write(
		&self,
		function: &str,
		args: &[DynSolValue],
		account: Address,
	) -> Result<TransactionHash, ContractError> {
		let calldata = abi::encode_call(function, args)?;
		let request = TransactionRequest::default()
			.from(account)
			.to(self.address)
			.input(calldata.into());

		// The wallet filler signs with the key registered for `account`.
		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| rpc_error(format!("Failed to send {}", function), e))?;

		let tx_hash = TransactionHash(*pending_tx.tx_hash());
		tracing::info!(
			tx_hash = %tx_hash,
			function,
			from = %account,
			"Submitted transaction"
		);

		Ok(tx_hash)
	}
}

#[async_trait]
impl ChainInfo for AlloyTokenContract {
	async fn chain_id(&self) -> Result<u64, ContractError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| rpc_error("Failed to get chain id".to_string(), e))
	}
}

/// Factory function to create an alloy token client from configuration.
///
/// Configuration parameters:
/// - `rpc_url`: HTTP(S) JSON-RPC endpoint
///
/// `private_keys` are the accounts the client may send transactions from,
/// typically the relayer and the signing account.
pub fn create_token_contract(
	config: &toml::Value,
	address: Address,
	private_keys: &[SecretString],
) -> Result<TokenContract, ContractError> {
	AlloyContractSchema
		.validate(config)
		.map_err(|e| ContractError::Network(format!("Invalid configuration: {}", e)))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ContractError::Network("rpc_url is required".to_string()))?;

	let signers = private_keys
		.iter()
		.map(|key| {
			key.with_exposed(|key| {
				key.parse::<PrivateKeySigner>()
					.map_err(|_| ContractError::Network("Invalid private key format".to_string()))
			})
		})
		.collect::<Result<Vec<_>, _>>()?;

	let client = AlloyTokenContract::new(rpc_url, address, signers)?;
	Ok(TokenContract::from_client(address, Arc::new(client)))
}

/// Registry for the alloy contract implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "evm_alloy";
	type Factory = crate::ContractFactory;

	fn factory() -> Self::Factory {
		create_token_contract
	}
}

impl crate::ContractRegistry for Registry {}
