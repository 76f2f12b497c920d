//! Replay-protection nonces.

use crate::SignatureError;
use nano_contract::{ContractError, ContractReader, DynSolValue};
use nano_types::{Address, NonceAccessor, U256};
use std::sync::Arc;

/// Key of an on-chain nonce counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceScope {
	/// Per-account counters (`nonces`, `sessionKeyNonces`).
	Account(Address),
	/// Per-multisig-account counter (`multiSigNonces`).
	MultiSig(U256),
}

impl From<NonceScope> for DynSolValue {
	fn from(scope: NonceScope) -> Self {
		match scope {
			NonceScope::Account(account) => DynSolValue::Address(account),
			NonceScope::MultiSig(account_id) => DynSolValue::Uint(account_id, 256),
		}
	}
}

/// Supplies the nonce of a signature request.
///
/// Nothing is cached: two requests on the same scope that both omit the
/// nonce read the same counter. Callers signing several pending messages
/// for one scope pass explicit nonces.
pub struct NonceResolver {
	reader: Arc<dyn ContractReader>,
}

impl NonceResolver {
	pub fn new(reader: Arc<dyn ContractReader>) -> Self {
		Self { reader }
	}

	/// Returns `explicit` untouched, or reads `accessor(scope)` from the token.
	pub async fn resolve(
		&self,
		accessor: NonceAccessor,
		scope: NonceScope,
		explicit: Option<U256>,
	) -> Result<U256, SignatureError> {
		if let Some(nonce) = explicit {
			return Ok(nonce);
		}

		let value = self
			.reader
			.read(accessor.function_name(), &[scope.into()])
			.await?;
		let (nonce, _) = value.as_uint().ok_or_else(|| {
			ContractError::Decode(format!("{} returned {:?}", accessor, value))
		})?;

		tracing::debug!(accessor = %accessor, scope = ?scope, nonce = %nonce, "Read on-chain nonce");
		Ok(nonce)
	}
}
