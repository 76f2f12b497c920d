//! Typed-data authorizations.
//!
//! Each operation resolves its nonce and deadline, builds the EIP-712 request
//! for its message kind and has the signer sign it. Multisig approvals also
//! carry the signer's address so they can be ordered later.

use crate::aggregator::{compute_owners_hash, Approval, OwnerList};
use crate::domain::DomainResolver;
use crate::nonce::{NonceResolver, NonceScope};
use crate::submission::SubmissionAdapter;
use crate::{IdentityRole, SignatureError};
use nano_account::AccountInterface;
use nano_types::{
	current_timestamp, Address, Bytes, FieldValue, MessageKind, SignatureRequest,
	TransactionHash, U256,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Deadline offset applied when none is given.
pub const DEFAULT_DEADLINE_TTL_SECONDS: u64 = 3600;

/// Per-call overrides shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningOptions {
	/// Used verbatim instead of reading the on-chain counter.
	pub nonce: Option<U256>,
	/// Used verbatim instead of now + TTL.
	pub deadline: Option<U256>,
	/// Domain name to use instead of the configured or on-chain name.
	pub token_name: Option<String>,
}

/// A message that can be authorized by typed-data signature.
///
/// Every schema ends with `nonce, deadline`; implementors supply the fields
/// before them, in schema order.
pub trait AuthorizationMessage {
	const KIND: MessageKind;

	/// Key of the nonce counter this message consumes.
	fn nonce_scope(&self) -> NonceScope;

	/// Field values preceding `nonce` and `deadline`.
	fn leading_values(&self) -> Vec<FieldValue>;
}

/// `TransferWithSig`: move tokens out of `from` on its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferWithSig {
	pub from: Address,
	pub to: Address,
	pub amount: U256,
	pub object_id: U256,
	pub object_data: Bytes,
}

impl TransferWithSig {
	/// A plain transfer: `object_id = 0`, empty `object_data`.
	pub fn new(from: Address, to: Address, amount: U256) -> Self {
		Self {
			from,
			to,
			amount,
			object_id: U256::ZERO,
			object_data: Bytes::new(),
		}
	}

	pub fn with_object(mut self, object_id: U256, object_data: Bytes) -> Self {
		self.object_id = object_id;
		self.object_data = object_data;
		self
	}
}

impl AuthorizationMessage for TransferWithSig {
	const KIND: MessageKind = MessageKind::TransferWithSig;

	fn nonce_scope(&self) -> NonceScope {
		NonceScope::Account(self.from)
	}

	fn leading_values(&self) -> Vec<FieldValue> {
		vec![
			self.from.into(),
			self.to.into(),
			self.amount.into(),
			self.object_id.into(),
			self.object_data.clone().into(),
		]
	}
}

/// `SetSessionKeyWithSig`: enable or disable a session key of `account`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionKeyGrant {
	pub account: Address,
	pub session_key: Address,
	pub enabled: bool,
}

impl AuthorizationMessage for SessionKeyGrant {
	const KIND: MessageKind = MessageKind::SetSessionKeyWithSig;

	fn nonce_scope(&self) -> NonceScope {
		NonceScope::Account(self.account)
	}

	fn leading_values(&self) -> Vec<FieldValue> {
		vec![
			self.account.into(),
			self.session_key.into(),
			self.enabled.into(),
		]
	}
}

/// `MultiSigTransfer`: move tokens out of multisig account `account_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigTransfer {
	pub account_id: U256,
	pub to: Address,
	pub amount: U256,
	pub object_id: U256,
	pub object_data: Bytes,
}

impl MultiSigTransfer {
	/// A plain transfer: `object_id = 0`, empty `object_data`.
	pub fn new(account_id: U256, to: Address, amount: U256) -> Self {
		Self {
			account_id,
			to,
			amount,
			object_id: U256::ZERO,
			object_data: Bytes::new(),
		}
	}

	pub fn with_object(mut self, object_id: U256, object_data: Bytes) -> Self {
		self.object_id = object_id;
		self.object_data = object_data;
		self
	}
}

impl AuthorizationMessage for MultiSigTransfer {
	const KIND: MessageKind = MessageKind::MultiSigTransfer;

	fn nonce_scope(&self) -> NonceScope {
		NonceScope::MultiSig(self.account_id)
	}

	fn leading_values(&self) -> Vec<FieldValue> {
		vec![
			self.account_id.into(),
			self.to.into(),
			self.amount.into(),
			self.object_id.into(),
			self.object_data.clone().into(),
		]
	}
}

/// `MultiSigUpdate`: replace the owners and threshold of `account_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigUpdate {
	pub account_id: U256,
	/// Proposed owners, hashed in this order.
	pub owners: OwnerList,
	pub threshold: U256,
}

impl AuthorizationMessage for MultiSigUpdate {
	const KIND: MessageKind = MessageKind::MultiSigUpdate;

	fn nonce_scope(&self) -> NonceScope {
		NonceScope::MultiSig(self.account_id)
	}

	fn leading_values(&self) -> Vec<FieldValue> {
		vec![
			self.account_id.into(),
			compute_owners_hash(&self.owners).into(),
			self.threshold.into(),
		]
	}
}

/// A signed single-signer authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
	pub signature: Bytes,
	pub nonce: U256,
	pub deadline: U256,
}

/// One owner's signed approval of a multisig message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerApproval {
	pub owner: Address,
	pub signature: Bytes,
	pub nonce: U256,
	pub deadline: U256,
}

impl OwnerApproval {
	pub fn approval(&self) -> Approval {
		Approval {
			owner: self.owner,
			signature: self.signature.clone(),
		}
	}
}

/// A request with its resolved nonce and deadline, before signing.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
	pub request: SignatureRequest,
	pub nonce: U256,
	pub deadline: U256,
}

/// Builds and signs typed-data authorizations for one signer.
pub struct SignatureRequestBuilder {
	domains: DomainResolver,
	nonces: NonceResolver,
	signer: Arc<dyn AccountInterface>,
	deadline_ttl_seconds: u64,
}

impl SignatureRequestBuilder {
	pub fn new(
		domains: DomainResolver,
		nonces: NonceResolver,
		signer: Arc<dyn AccountInterface>,
	) -> Self {
		Self {
			domains,
			nonces,
			signer,
			deadline_ttl_seconds: DEFAULT_DEADLINE_TTL_SECONDS,
		}
	}

	pub fn with_deadline_ttl(mut self, seconds: u64) -> Self {
		self.deadline_ttl_seconds = seconds;
		self
	}

	pub fn signer_address(&self) -> Option<Address> {
		self.signer.address()
	}

	pub async fn build_transfer_approval(
		&self,
		transfer: &TransferWithSig,
		options: &SigningOptions,
	) -> Result<SignedAuthorization, SignatureError> {
		let (_, authorization) = self.sign(transfer, options).await?;
		Ok(authorization)
	}

	pub async fn build_session_key_approval(
		&self,
		grant: &SessionKeyGrant,
		options: &SigningOptions,
	) -> Result<SignedAuthorization, SignatureError> {
		let (_, authorization) = self.sign(grant, options).await?;
		Ok(authorization)
	}

	pub async fn build_multisig_transfer_approval(
		&self,
		transfer: &MultiSigTransfer,
		options: &SigningOptions,
	) -> Result<OwnerApproval, SignatureError> {
		let (owner, authorization) = self.sign(transfer, options).await?;
		Ok(owner_approval(owner, authorization))
	}

	pub async fn build_multisig_update_approval(
		&self,
		update: &MultiSigUpdate,
		options: &SigningOptions,
	) -> Result<OwnerApproval, SignatureError> {
		let (owner, authorization) = self.sign(update, options).await?;
		Ok(owner_approval(owner, authorization))
	}

	/// Enables or disables a session key by a direct call from the signer's
	/// own account. No typed data is signed.
	pub async fn submit_session_key_direct(
		&self,
		submission: &SubmissionAdapter,
		session_key: Address,
		enabled: bool,
	) -> Result<TransactionHash, SignatureError> {
		let account = self.require_signer()?;
		submission.set_session_key(account, session_key, enabled).await
	}

	/// Resolves nonce, deadline and domain for `message` without signing.
	pub async fn prepare<M: AuthorizationMessage>(
		&self,
		message: &M,
		options: &SigningOptions,
	) -> Result<PreparedRequest, SignatureError> {
		let nonce = self
			.nonces
			.resolve(
				M::KIND.nonce_accessor(),
				message.nonce_scope(),
				options.nonce,
			)
			.await?;
		let deadline = self.resolve_deadline(options.deadline);
		let domain = self.domains.resolve(options.token_name.as_deref()).await?;

		let mut values = message.leading_values();
		values.push(nonce.into());
		values.push(deadline.into());
		let request = SignatureRequest::new(domain, M::KIND, values)?;

		Ok(PreparedRequest {
			request,
			nonce,
			deadline,
		})
	}

	async fn sign<M: AuthorizationMessage>(
		&self,
		message: &M,
		options: &SigningOptions,
	) -> Result<(Address, SignedAuthorization), SignatureError> {
		let owner = self.require_signer()?;
		let prepared = self.prepare(message, options).await?;
		let signature = self.signer.sign_typed_data(&prepared.request).await?;

		let kind = M::KIND;
		tracing::info!(
			primary_type = %kind,
			signer = %owner,
			nonce = %prepared.nonce,
			deadline = %prepared.deadline,
			"Signed authorization"
		);

		Ok((
			owner,
			SignedAuthorization {
				signature,
				nonce: prepared.nonce,
				deadline: prepared.deadline,
			},
		))
	}

	fn require_signer(&self) -> Result<Address, SignatureError> {
		self.signer
			.address()
			.ok_or(SignatureError::MissingIdentity(IdentityRole::Signer))
	}

	fn resolve_deadline(&self, explicit: Option<U256>) -> U256 {
		explicit.unwrap_or_else(|| {
			U256::from(current_timestamp().saturating_add(self.deadline_ttl_seconds))
		})
	}
}

fn owner_approval(owner: Address, authorization: SignedAuthorization) -> OwnerApproval {
	OwnerApproval {
		owner,
		signature: authorization.signature,
		nonce: authorization.nonce,
		deadline: authorization.deadline,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{local_account, FakeToken, UnboundAccount, HIGH_KEY, LOW_KEY};
	use alloy_primitives::address;
	use nano_contract::DynSolValue;
	use nano_types::Domain;

	const RECIPIENT: Address = address!("90F79bf6EB2c4f870365E785982E1f101E93b906");

	fn builder(token: &FakeToken, signer: Arc<dyn AccountInterface>) -> SignatureRequestBuilder {
		let contract = token.contract();
		SignatureRequestBuilder::new(
			DomainResolver::for_contract(&contract),
			NonceResolver::new(contract.reader.clone()),
			signer,
		)
	}

	fn fixed(nonce: u64, deadline: u64) -> SigningOptions {
		SigningOptions {
			nonce: Some(U256::from(nonce)),
			deadline: Some(U256::from(deadline)),
			token_name: Some("Nano Token".to_string()),
		}
	}

	#[tokio::test]
	async fn test_default_deadline_is_now_plus_ttl() {
		let token = FakeToken::new();
		let signer = local_account(HIGH_KEY);
		let from = signer.address().unwrap();
		let builder = builder(&token, signer);

		let before = current_timestamp();
		let signed = builder
			.build_transfer_approval(
				&TransferWithSig::new(from, RECIPIENT, U256::from(10u64)),
				&SigningOptions::default(),
			)
			.await
			.unwrap();
		let after = current_timestamp();

		assert!(signed.deadline >= U256::from(before + 3600));
		assert!(signed.deadline <= U256::from(after + 3600));
	}

	#[tokio::test]
	async fn test_configured_ttl() {
		let token = FakeToken::new();
		let signer = local_account(HIGH_KEY);
		let account = signer.address().unwrap();
		let builder = builder(&token, signer).with_deadline_ttl(60);

		let before = current_timestamp();
		let signed = builder
			.build_session_key_approval(
				&SessionKeyGrant {
					account,
					session_key: RECIPIENT,
					enabled: true,
				},
				&SigningOptions::default(),
			)
			.await
			.unwrap();

		assert!(signed.deadline >= U256::from(before + 60));
		assert!(signed.deadline < U256::from(before + 3600));
	}

	#[tokio::test]
	async fn test_explicit_values_skip_reads() {
		let token = FakeToken::new().with_counter(U256::from(8u64));
		let signer = local_account(HIGH_KEY);
		let from = signer.address().unwrap();
		let builder = builder(&token, signer);

		let signed = builder
			.build_transfer_approval(
				&TransferWithSig::new(from, RECIPIENT, U256::from(10u64)),
				&fixed(42, 1_900_000_000),
			)
			.await
			.unwrap();

		assert_eq!(signed.nonce, U256::from(42u64));
		assert_eq!(signed.deadline, U256::from(1_900_000_000u64));
		assert!(token.reads().is_empty());
	}

	#[tokio::test]
	async fn test_omitted_nonce_reads_schema_counter() {
		let token = FakeToken::new().with_counter(U256::from(8u64));
		let signer = local_account(HIGH_KEY);
		let from = signer.address().unwrap();
		let builder = builder(&token, signer);

		let signed = builder
			.build_transfer_approval(
				&TransferWithSig::new(from, RECIPIENT, U256::from(10u64)),
				&SigningOptions::default(),
			)
			.await
			.unwrap();

		assert_eq!(signed.nonce, U256::from(8u64));
		assert_eq!(
			token.reads(),
			vec![
				("nonces".to_string(), vec![DynSolValue::Address(from)]),
				("name".to_string(), vec![]),
			]
		);
	}

	#[tokio::test]
	async fn test_session_key_and_multisig_accessors() {
		let token = FakeToken::new();
		let signer = local_account(HIGH_KEY);
		let account = signer.address().unwrap();
		let builder = builder(&token, signer);
		let options = SigningOptions {
			token_name: Some("Nano Token".to_string()),
			..SigningOptions::default()
		};

		builder
			.build_session_key_approval(
				&SessionKeyGrant {
					account,
					session_key: RECIPIENT,
					enabled: false,
				},
				&options,
			)
			.await
			.unwrap();
		builder
			.build_multisig_update_approval(
				&MultiSigUpdate {
					account_id: U256::from(7u64),
					owners: OwnerList::new(vec![account, RECIPIENT]),
					threshold: U256::from(2u64),
				},
				&options,
			)
			.await
			.unwrap();

		assert_eq!(
			token.reads(),
			vec![
				(
					"sessionKeyNonces".to_string(),
					vec![DynSolValue::Address(account)]
				),
				(
					"multiSigNonces".to_string(),
					vec![DynSolValue::Uint(U256::from(7u64), 256)]
				),
			]
		);
	}

	#[tokio::test]
	async fn test_signature_covers_schema_fields() {
		let token = FakeToken::new();
		let signer = local_account(LOW_KEY);
		let owner = signer.address().unwrap();
		let builder = builder(&token, signer.clone());

		let transfer = MultiSigTransfer::new(U256::from(7u64), RECIPIENT, U256::from(100u64))
			.with_object(U256::from(1u64), Bytes::from_static(b"\x01\x02"));
		let approval = builder
			.build_multisig_transfer_approval(&transfer, &fixed(3, 1_900_000_000))
			.await
			.unwrap();

		let expected = SignatureRequest::new(
			Domain::new("Nano Token", 31337, token.address),
			MessageKind::MultiSigTransfer,
			vec![
				U256::from(7u64).into(),
				RECIPIENT.into(),
				U256::from(100u64).into(),
				U256::from(1u64).into(),
				Bytes::from_static(b"\x01\x02").into(),
				U256::from(3u64).into(),
				U256::from(1_900_000_000u64).into(),
			],
		)
		.unwrap();

		assert_eq!(approval.owner, owner);
		assert_eq!(approval.nonce, U256::from(3u64));
		assert_eq!(
			approval.signature,
			signer.sign_typed_data(&expected).await.unwrap()
		);
	}

	#[tokio::test]
	async fn test_update_signs_owners_hash() {
		let token = FakeToken::new();
		let builder = builder(&token, local_account(HIGH_KEY));
		let owners = OwnerList::new(vec![RECIPIENT, token.address]);
		let update = MultiSigUpdate {
			account_id: U256::from(7u64),
			owners: owners.clone(),
			threshold: U256::from(1u64),
		};

		let prepared = builder
			.prepare(&update, &fixed(0, 1_900_000_000))
			.await
			.unwrap();

		assert_eq!(
			prepared.request.field("ownersHash"),
			Some(&FieldValue::Bytes32(compute_owners_hash(&owners)))
		);

		let signer = local_account(HIGH_KEY);
		let approval = builder
			.build_multisig_update_approval(&update, &fixed(0, 1_900_000_000))
			.await
			.unwrap();

		assert_eq!(Some(approval.owner), signer.address());
		assert_eq!(approval.nonce, U256::ZERO);
		assert_eq!(approval.deadline, U256::from(1_900_000_000u64));
		assert_eq!(
			approval.signature,
			signer.sign_typed_data(&prepared.request).await.unwrap()
		);
	}

	#[tokio::test]
	async fn test_missing_identity_fails_before_reads() {
		let token = FakeToken::new();
		let builder = builder(&token, Arc::new(UnboundAccount));

		let result = builder
			.build_multisig_transfer_approval(
				&MultiSigTransfer::new(U256::from(7u64), RECIPIENT, U256::from(100u64)),
				&SigningOptions::default(),
			)
			.await;

		assert!(matches!(
			result,
			Err(SignatureError::MissingIdentity(IdentityRole::Signer))
		));
		assert!(token.reads().is_empty());
	}

	#[tokio::test]
	async fn test_upstream_failure_propagates() {
		let token = FakeToken::failing();
		let signer = local_account(HIGH_KEY);
		let from = signer.address().unwrap();
		let builder = builder(&token, signer);

		let result = builder
			.build_transfer_approval(
				&TransferWithSig::new(from, RECIPIENT, U256::from(1u64)),
				&SigningOptions::default(),
			)
			.await;

		assert!(matches!(result, Err(SignatureError::Contract(_))));
	}
}
