//! Account management module for the NanoToken relay system.
//!
//! This module defines the signer collaborator: an account that may or may not
//! be bound to an address and that produces EIP-712 signatures over
//! [`SignatureRequest`]s. The same interface describes the relayer account
//! whose key pays for submitted transactions.

use async_trait::async_trait;
use nano_types::{Address, Bytes, ImplementationRegistry, SecretString, SignatureRequest};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Signing the typed-data digest failed.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// A cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The account implementation itself failed.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Trait defining the interface for account implementations.
///
/// Implementations wrap a key (or a remote signer) and must be usable from
/// concurrent tasks.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// The address the account signs as, or `None` when no identity is bound.
	fn address(&self) -> Option<Address>;

	/// Signs the EIP-712 digest of `request` and returns the 65-byte
	/// `r || s || v` signature.
	async fn sign_typed_data(&self, request: &SignatureRequest) -> Result<Bytes, AccountError>;

	/// Private key used by contract clients that send transactions from this
	/// account. `None` for accounts whose key is not locally available.
	fn private_key(&self) -> Option<SecretString>;
}

/// Type alias for account factory functions.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Get all registered account implementations.
///
/// Returns a vector of (name, factory) tuples for all available account implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}
