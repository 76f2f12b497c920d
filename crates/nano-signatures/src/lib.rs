//! Relay signatures for NanoToken.
//!
//! An account authorizes a token operation by signing EIP-712 typed data; a
//! relayer later submits the authorization and pays for gas. This crate builds
//! the typed-data requests ([`builder`]), resolves their domain and nonce
//! ([`domain`], [`nonce`]), orders approvals collected from several multisig
//! owners ([`aggregator`]) and maps finished payloads to contract calls
//! ([`submission`]).
//!
//! Node access and signing are delegated to the collaborator traits of
//! `nano-contract` and `nano-account`. Their errors are passed through
//! unchanged.

use nano_account::AccountError;
use nano_contract::ContractError;
use nano_types::{Address, TypedDataError};
use std::fmt;
use thiserror::Error;

pub mod aggregator;
pub mod builder;
pub mod domain;
pub mod nonce;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{compute_owners_hash, order_approvals, Approval, OrderedApprovals, OwnerList};
pub use builder::{
	AuthorizationMessage, MultiSigTransfer, MultiSigUpdate, OwnerApproval, PreparedRequest,
	SessionKeyGrant, SignatureRequestBuilder, SignedAuthorization, SigningOptions,
	TransferWithSig, DEFAULT_DEADLINE_TTL_SECONDS,
};
pub use domain::DomainResolver;
pub use nonce::{NonceResolver, NonceScope};
pub use submission::{SubmissionAdapter, SubmissionCall};

/// The party whose address an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
	/// The account signing an authorization or sending a direct call.
	Signer,
	/// The account submitting a signed authorization.
	Relayer,
}

impl fmt::Display for IdentityRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IdentityRole::Signer => f.write_str("signer"),
			IdentityRole::Relayer => f.write_str("relayer"),
		}
	}
}

/// Errors raised while building, aggregating or submitting authorizations.
#[derive(Debug, Error)]
pub enum SignatureError {
	/// The signer or relayer has no bound address.
	#[error("No {0} address is bound")]
	MissingIdentity(IdentityRole),
	/// Two approvals were given by the same owner.
	#[error("Duplicate owner in approvals: {0}")]
	DuplicateOwner(Address),
	#[error(transparent)]
	Contract(#[from] ContractError),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	TypedData(#[from] TypedDataError),
}
