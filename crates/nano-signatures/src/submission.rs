//! Submission of signed authorizations.
//!
//! Each operation maps to one token function with a fixed positional
//! argument list. Signed operations are sent by the relayer; the direct
//! `setSessionKey` call is sent by the account itself.

use crate::aggregator::{order_approvals, Approval};
use crate::builder::{MultiSigTransfer, MultiSigUpdate, SessionKeyGrant, TransferWithSig};
use crate::{IdentityRole, SignatureError};
use nano_contract::{ContractWriter, DynSolValue};
use nano_types::{Address, Bytes, TransactionHash, U256};
use std::sync::Arc;

/// A token function call: name plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionCall {
	pub function: &'static str,
	pub args: Vec<DynSolValue>,
}

fn uint(value: U256) -> DynSolValue {
	DynSolValue::Uint(value, 256)
}

fn bytes(value: &Bytes) -> DynSolValue {
	DynSolValue::Bytes(value.to_vec())
}

fn bytes_array(values: &[Bytes]) -> DynSolValue {
	DynSolValue::Array(values.iter().map(bytes).collect())
}

impl SubmissionCall {
	/// `transferWithSig(from, to, amount, objectId, objectData, deadline, signature)`
	pub fn transfer_with_sig(transfer: &TransferWithSig, deadline: U256, signature: &Bytes) -> Self {
		Self {
			function: "transferWithSig",
			args: vec![
				DynSolValue::Address(transfer.from),
				DynSolValue::Address(transfer.to),
				uint(transfer.amount),
				uint(transfer.object_id),
				bytes(&transfer.object_data),
				uint(deadline),
				bytes(signature),
			],
		}
	}

	/// `setSessionKeyWithSig(account, sessionKey, enabled, deadline, signature)`
	pub fn set_session_key_with_sig(
		grant: &SessionKeyGrant,
		deadline: U256,
		signature: &Bytes,
	) -> Self {
		Self {
			function: "setSessionKeyWithSig",
			args: vec![
				DynSolValue::Address(grant.account),
				DynSolValue::Address(grant.session_key),
				DynSolValue::Bool(grant.enabled),
				uint(deadline),
				bytes(signature),
			],
		}
	}

	/// `transferFromMultiSig(accountId, to, amount, objectId, objectData, deadline, signatures)`
	pub fn transfer_from_multisig(
		transfer: &MultiSigTransfer,
		deadline: U256,
		signatures: &[Bytes],
	) -> Self {
		Self {
			function: "transferFromMultiSig",
			args: vec![
				uint(transfer.account_id),
				DynSolValue::Address(transfer.to),
				uint(transfer.amount),
				uint(transfer.object_id),
				bytes(&transfer.object_data),
				uint(deadline),
				bytes_array(signatures),
			],
		}
	}

	/// `updateMultiSigAccount(accountId, owners, threshold, deadline, signatures)`
	///
	/// Owners are passed in the order they were hashed.
	pub fn update_multisig_account(
		update: &MultiSigUpdate,
		deadline: U256,
		signatures: &[Bytes],
	) -> Self {
		Self {
			function: "updateMultiSigAccount",
			args: vec![
				uint(update.account_id),
				DynSolValue::Array(
					update
						.owners
						.as_slice()
						.iter()
						.copied()
						.map(DynSolValue::Address)
						.collect(),
				),
				uint(update.threshold),
				uint(deadline),
				bytes_array(signatures),
			],
		}
	}

	/// `setSessionKey(sessionKey, enabled)`
	pub fn set_session_key(session_key: Address, enabled: bool) -> Self {
		Self {
			function: "setSessionKey",
			args: vec![
				DynSolValue::Address(session_key),
				DynSolValue::Bool(enabled),
			],
		}
	}
}

/// Sends signed authorizations to the token.
pub struct SubmissionAdapter {
	writer: Arc<dyn ContractWriter>,
	relayer: Option<Address>,
}

impl SubmissionAdapter {
	/// `relayer` sends every signed operation; `None` leaves only the direct
	/// `set_session_key` usable.
	pub fn new(writer: Arc<dyn ContractWriter>, relayer: Option<Address>) -> Self {
		Self { writer, relayer }
	}

	pub async fn transfer_with_sig(
		&self,
		transfer: &TransferWithSig,
		deadline: U256,
		signature: &Bytes,
	) -> Result<TransactionHash, SignatureError> {
		let relayer = self.require_relayer()?;
		self.send(
			SubmissionCall::transfer_with_sig(transfer, deadline, signature),
			relayer,
		)
		.await
	}

	pub async fn set_session_key_with_sig(
		&self,
		grant: &SessionKeyGrant,
		deadline: U256,
		signature: &Bytes,
	) -> Result<TransactionHash, SignatureError> {
		let relayer = self.require_relayer()?;
		self.send(
			SubmissionCall::set_session_key_with_sig(grant, deadline, signature),
			relayer,
		)
		.await
	}

	/// Orders `approvals` by owner and submits their signatures.
	pub async fn transfer_from_multisig(
		&self,
		transfer: &MultiSigTransfer,
		deadline: U256,
		approvals: Vec<Approval>,
	) -> Result<TransactionHash, SignatureError> {
		let relayer = self.require_relayer()?;
		let ordered = order_approvals(approvals)?;
		self.send(
			SubmissionCall::transfer_from_multisig(transfer, deadline, &ordered.signatures()),
			relayer,
		)
		.await
	}

	/// Orders `approvals` by owner and submits their signatures.
	pub async fn update_multisig_account(
		&self,
		update: &MultiSigUpdate,
		deadline: U256,
		approvals: Vec<Approval>,
	) -> Result<TransactionHash, SignatureError> {
		let relayer = self.require_relayer()?;
		let ordered = order_approvals(approvals)?;
		self.send(
			SubmissionCall::update_multisig_account(update, deadline, &ordered.signatures()),
			relayer,
		)
		.await
	}

	/// Direct call sent from `account`, without a relayer.
	pub async fn set_session_key(
		&self,
		account: Address,
		session_key: Address,
		enabled: bool,
	) -> Result<TransactionHash, SignatureError> {
		self.send(SubmissionCall::set_session_key(session_key, enabled), account)
			.await
	}

	fn require_relayer(&self) -> Result<Address, SignatureError> {
		self.relayer
			.ok_or(SignatureError::MissingIdentity(IdentityRole::Relayer))
	}

	async fn send(
		&self,
		call: SubmissionCall,
		account: Address,
	) -> Result<TransactionHash, SignatureError> {
		tracing::debug!(function = call.function, from = %account, "Submitting call");
		Ok(self.writer.write(call.function, &call.args, account).await?)
	}
}
