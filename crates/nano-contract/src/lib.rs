//! Contract access for the NanoToken relay system.
//!
//! The signature core never talks to a node directly. It reads view
//! functions, sends transactions and asks for the chain id through the three
//! collaborator traits defined here. Calls are addressed by function name and
//! positional [`DynSolValue`] arguments, and encoded against the NanoToken
//! human-readable ABI in [`abi`].

use async_trait::async_trait;
use nano_types::{Address, ImplementationRegistry, SecretString, TransactionHash};
use std::sync::Arc;
use thiserror::Error;

pub mod abi;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use alloy_dyn_abi::DynSolValue;

/// Errors that can occur while talking to the token contract.
#[derive(Debug, Error)]
pub enum ContractError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// A call could not be encoded or was rejected by the node.
	#[error("Call failed: {0}")]
	Call(String),
	/// The returned data did not match the function's outputs.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The function is not part of the NanoToken ABI.
	#[error("Unknown function: {0}")]
	UnknownFunction(String),
}

/// Read access to view functions of the token contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
	/// Calls `function` with positional `args` and returns its decoded output.
	async fn read(&self, function: &str, args: &[DynSolValue]) -> Result<DynSolValue, ContractError>;
}

/// Write access to the token contract.
#[async_trait]
pub trait ContractWriter: Send + Sync {
	/// Sends a transaction calling `function` with `args`, signed by `account`.
	///
	/// Returns once the node accepted the transaction; confirmation tracking is
	/// left to the caller.
	async fn write(
		&self,
		function: &str,
		args: &[DynSolValue],
		account: Address,
	) -> Result<TransactionHash, ContractError>;
}

/// Chain metadata of the connected network.
#[async_trait]
pub trait ChainInfo: Send + Sync {
	async fn chain_id(&self) -> Result<u64, ContractError>;
}

/// One token deployment and the collaborators that reach it.
#[derive(Clone)]
pub struct TokenContract {
	pub address: Address,
	pub reader: Arc<dyn ContractReader>,
	pub writer: Arc<dyn ContractWriter>,
	pub chain: Arc<dyn ChainInfo>,
}

impl TokenContract {
	/// Uses a single client for reads, writes and chain info.
	pub fn from_client<C>(address: Address, client: Arc<C>) -> Self
	where
		C: ContractReader + ContractWriter + ChainInfo + 'static,
	{
		Self {
			address,
			reader: client.clone(),
			writer: client.clone(),
			chain: client,
		}
	}
}

/// Type alias for contract factory functions.
///
/// Receives the implementation's TOML table, the token address and the private
/// keys of every account the client may send transactions from.
pub type ContractFactory =
	fn(&toml::Value, Address, &[SecretString]) -> Result<TokenContract, ContractError>;

/// Registry trait for contract implementations.
pub trait ContractRegistry: ImplementationRegistry<Factory = ContractFactory> {}

/// Get all registered contract implementations.
pub fn get_all_implementations() -> Vec<(&'static str, ContractFactory)> {
	use implementations::evm::alloy;

	vec![(alloy::Registry::NAME, alloy::Registry::factory())]
}
