//! Recording fakes of the contract collaborators.

use alloy_primitives::{address, keccak256};
use async_trait::async_trait;
use nano_account::implementations::local::LocalAccount;
use nano_account::{AccountError, AccountInterface};
use nano_contract::{
	ChainInfo, ContractError, ContractReader, ContractWriter, DynSolValue, TokenContract,
};
use nano_types::{Address, Bytes, SecretString, SignatureRequest, TransactionHash, U256};
use std::sync::{Arc, Mutex};

pub(crate) const TOKEN: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Anvil development keys #0 and #1.
pub(crate) const HIGH_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub(crate) const LOW_KEY: &str =
	"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub(crate) fn local_account(key: &str) -> Arc<dyn AccountInterface> {
	Arc::new(LocalAccount::new(SecretString::from(key)).unwrap())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedWrite {
	pub function: String,
	pub args: Vec<DynSolValue>,
	pub account: Address,
}

#[derive(Default)]
struct FakeClient {
	counter: Mutex<U256>,
	fail: bool,
	reads: Mutex<Vec<(String, Vec<DynSolValue>)>>,
	writes: Mutex<Vec<RecordedWrite>>,
}

#[async_trait]
impl ContractReader for FakeClient {
	async fn read(&self, function: &str, args: &[DynSolValue]) -> Result<DynSolValue, ContractError> {
		self.reads
			.lock()
			.unwrap()
			.push((function.to_string(), args.to_vec()));
		if self.fail {
			return Err(ContractError::Network("node unavailable".to_string()));
		}
		match function {
			"name" => Ok(DynSolValue::String("Nano Token".to_string())),
			"nonces" | "sessionKeyNonces" | "multiSigNonces" => {
				Ok(DynSolValue::Uint(*self.counter.lock().unwrap(), 256))
			},
			other => Err(ContractError::UnknownFunction(other.to_string())),
		}
	}
}

#[async_trait]
impl ContractWriter for FakeClient {
	async fn write(
		&self,
		function: &str,
		args: &[DynSolValue],
		account: Address,
	) -> Result<TransactionHash, ContractError> {
		self.writes.lock().unwrap().push(RecordedWrite {
			function: function.to_string(),
			args: args.to_vec(),
			account,
		});
		if self.fail {
			return Err(ContractError::Network("node unavailable".to_string()));
		}
		Ok(TransactionHash(keccak256(function)))
	}
}

#[async_trait]
impl ChainInfo for FakeClient {
	async fn chain_id(&self) -> Result<u64, ContractError> {
		if self.fail {
			return Err(ContractError::Network("chain id unavailable".to_string()));
		}
		Ok(31337)
	}
}

/// A token on chain 31337 named "Nano Token" whose nonce counters all hold
/// the same value.
pub(crate) struct FakeToken {
	pub address: Address,
	client: Arc<FakeClient>,
}

impl FakeToken {
	pub fn new() -> Self {
		Self {
			address: TOKEN,
			client: Arc::new(FakeClient::default()),
		}
	}

	/// Every read, write and chain-id query fails with a network error.
	pub fn failing() -> Self {
		Self {
			address: TOKEN,
			client: Arc::new(FakeClient {
				fail: true,
				..FakeClient::default()
			}),
		}
	}

	pub fn with_counter(self, counter: U256) -> Self {
		*self.client.counter.lock().unwrap() = counter;
		self
	}

	pub fn contract(&self) -> TokenContract {
		TokenContract::from_client(self.address, self.client.clone())
	}

	pub fn reads(&self) -> Vec<(String, Vec<DynSolValue>)> {
		self.client.reads.lock().unwrap().clone()
	}

	pub fn read_functions(&self) -> Vec<String> {
		self.reads().into_iter().map(|(function, _)| function).collect()
	}

	pub fn writes(&self) -> Vec<RecordedWrite> {
		self.client.writes.lock().unwrap().clone()
	}
}

/// A signer with no bound address.
pub(crate) struct UnboundAccount;

#[async_trait]
impl AccountInterface for UnboundAccount {
	fn address(&self) -> Option<Address> {
		None
	}

	async fn sign_typed_data(&self, _request: &SignatureRequest) -> Result<Bytes, AccountError> {
		Err(AccountError::Implementation("no key".to_string()))
	}

	fn private_key(&self) -> Option<SecretString> {
		None
	}
}
