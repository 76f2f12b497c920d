//! Local private-key account.
//!
//! Signs typed data in process with a secp256k1 key loaded from configuration.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use nano_types::{
	truncate_hex, Address, Bytes, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, SignatureRequest, ValidationError,
};

/// Account backed by a private key held in memory.
pub struct LocalAccount {
	signer: PrivateKeySigner,
	private_key: SecretString,
}

impl LocalAccount {
	/// Creates an account from a hex-encoded private key (0x prefix optional).
	pub fn new(private_key: SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			key.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		Ok(Self {
			signer,
			private_key,
		})
	}
}

/// Configuration schema for the local account.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = value.as_str().unwrap_or_default();
					let key = key.strip_prefix("0x").unwrap_or(key);
					if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("private_key must be 32 bytes of hex".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Option<Address> {
		Some(self.signer.address())
	}

	async fn sign_typed_data(&self, request: &SignatureRequest) -> Result<Bytes, AccountError> {
		let digest = request.signing_hash();
		let signature = self
			.signer
			.sign_hash(&digest)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		let signature = signature.as_bytes();
		tracing::debug!(
			signer = %self.signer.address(),
			primary_type = %request.kind(),
			digest = %truncate_hex(digest.as_slice()),
			signature = %truncate_hex(&signature),
			"Signed typed data"
		);

		Ok(Bytes::from(signature.to_vec()))
	}

	fn private_key(&self) -> Option<SecretString> {
		Some(self.private_key.clone())
	}
}

/// Factory function to create a local account from configuration.
///
/// Configuration parameters:
/// - `private_key`: hex-encoded secp256k1 key
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalAccount::new(SecretString::from(private_key))?))
}

/// Registry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, U256};
	use alloy_signer::SignerSync;
	use nano_types::{Domain, MessageKind};

	// Well-known development key (anvil account #0).
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

	fn request() -> SignatureRequest {
		SignatureRequest::new(
			Domain::new(
				"Nano Token",
				31337,
				address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
			),
			MessageKind::SetSessionKeyWithSig,
			vec![
				DEV_ADDRESS.into(),
				address!("70997970C51812dc3A010C7d01b50e0d17dc79C8").into(),
				true.into(),
				U256::from(1u64).into(),
				U256::from(1_700_000_000u64).into(),
			],
		)
		.unwrap()
	}

	#[test]
	fn test_address_from_key() {
		let account = LocalAccount::new(SecretString::from(DEV_KEY)).unwrap();
		assert_eq!(account.address(), Some(DEV_ADDRESS));
		assert!(account.private_key().is_some());
	}

	#[tokio::test]
	async fn test_signature_recovers_to_signer() {
		let account = LocalAccount::new(SecretString::from(DEV_KEY)).unwrap();
		let request = request();

		let signature = account.sign_typed_data(&request).await.unwrap();
		assert_eq!(signature.len(), 65);

		let reference: PrivateKeySigner = DEV_KEY.parse().unwrap();
		let expected = reference.sign_hash_sync(&request.signing_hash()).unwrap();
		assert_eq!(signature.as_ref(), expected.as_bytes().as_slice());
		assert_eq!(
			expected
				.recover_address_from_prehash(&request.signing_hash())
				.unwrap(),
			DEV_ADDRESS
		);
	}

	#[test]
	fn test_factory_validates_config() {
		let config: toml::Value = toml::from_str(&format!("private_key = \"{}\"", DEV_KEY)).unwrap();
		let account = create_account(&config).unwrap();
		assert_eq!(account.address(), Some(DEV_ADDRESS));

		let config: toml::Value = toml::from_str("private_key = \"0x1234\"").unwrap();
		assert!(matches!(
			create_account(&config),
			Err(AccountError::InvalidKey(_))
		));

		let config: toml::Value = toml::from_str("other = 1").unwrap();
		assert!(create_account(&config).is_err());
	}
}
