//! Multisig approval aggregation.
//!
//! Two orderings live here and must not be mixed up. Approvals are submitted
//! sorted by ascending owner address, which is how the token matches
//! signatures to its stored owners. An [`OwnerList`] keeps the order its
//! caller gave, and that order is part of the owners hash signed in a
//! `MultiSigUpdate`.

use crate::SignatureError;
use alloy_primitives::keccak256;
use nano_types::{parse_address, Address, Bytes, B256};
use serde::{Deserialize, Deserializer, Serialize};

/// One owner's signature over a multisig message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
	#[serde(deserialize_with = "deserialize_checked_address")]
	pub owner: Address,
	pub signature: Bytes,
}

/// Approvals sorted strictly ascending by owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderedApprovals(Vec<Approval>);

impl OrderedApprovals {
	pub fn as_slice(&self) -> &[Approval] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Signatures in submission order.
	pub fn signatures(&self) -> Vec<Bytes> {
		self.0.iter().map(|a| a.signature.clone()).collect()
	}
}

/// Sorts approvals by ascending owner address.
///
/// The result does not depend on the input order. Fails with
/// [`SignatureError::DuplicateOwner`] if an owner appears twice, whatever
/// the signatures.
pub fn order_approvals(
	approvals: impl IntoIterator<Item = Approval>,
) -> Result<OrderedApprovals, SignatureError> {
	let mut approvals: Vec<Approval> = approvals.into_iter().collect();
	// Address ordering is the big-endian numeric ordering.
	approvals.sort_by(|a, b| a.owner.cmp(&b.owner));

	if let Some(pair) = approvals.windows(2).find(|w| w[0].owner == w[1].owner) {
		return Err(SignatureError::DuplicateOwner(pair[0].owner));
	}

	Ok(OrderedApprovals(approvals))
}

/// An owner set in caller order. The order is significant: it changes the
/// owners hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerList(Vec<Address>);

impl OwnerList {
	pub fn new(owners: Vec<Address>) -> Self {
		Self(owners)
	}

	pub fn as_slice(&self) -> &[Address] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<Address>> for OwnerList {
	fn from(owners: Vec<Address>) -> Self {
		Self(owners)
	}
}

impl FromIterator<Address> for OwnerList {
	fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// keccak256 of the owners' 20-byte addresses concatenated without padding,
/// in list order.
pub fn compute_owners_hash(owners: &OwnerList) -> B256 {
	let mut packed = Vec::with_capacity(owners.len() * 20);
	for owner in owners.as_slice() {
		packed.extend_from_slice(owner.as_slice());
	}
	keccak256(packed)
}

fn deserialize_checked_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
	D: Deserializer<'de>,
{
	let text = String::deserialize(deserializer)?;
	parse_address(&text).map_err(serde::de::Error::custom)
}
