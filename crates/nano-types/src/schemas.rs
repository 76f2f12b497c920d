//! EIP-712 message schemas for every signable NanoToken operation.
//!
//! The field tables in this module are the only place the message layouts are
//! declared. Struct hashing, the wallet-facing JSON document and nonce lookup
//! all read them from here. Field order is part of the on-chain contract: the
//! verifier derives the type hash from it, so a reordered table produces
//! signatures the contract rejects.

use alloy_primitives::{keccak256, B256};
use std::fmt;

/// Solidity type of a message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
	Address,
	Uint256,
	Bool,
	/// Dynamic bytes, hashed with keccak256 when struct-encoded.
	Bytes,
	Bytes32,
}

impl FieldKind {
	/// Solidity type name as it appears in the EIP-712 type string.
	pub fn as_str(&self) -> &'static str {
		match self {
			FieldKind::Address => "address",
			FieldKind::Uint256 => "uint256",
			FieldKind::Bool => "bool",
			FieldKind::Bytes => "bytes",
			FieldKind::Bytes32 => "bytes32",
		}
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A named, typed member of a message schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageField {
	pub name: &'static str,
	pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> MessageField {
	MessageField { name, kind }
}

const TRANSFER_WITH_SIG_FIELDS: &[MessageField] = &[
	field("from", FieldKind::Address),
	field("to", FieldKind::Address),
	field("amount", FieldKind::Uint256),
	field("objectId", FieldKind::Uint256),
	field("objectData", FieldKind::Bytes),
	field("nonce", FieldKind::Uint256),
	field("deadline", FieldKind::Uint256),
];

const SET_SESSION_KEY_WITH_SIG_FIELDS: &[MessageField] = &[
	field("account", FieldKind::Address),
	field("sessionKey", FieldKind::Address),
	field("enabled", FieldKind::Bool),
	field("nonce", FieldKind::Uint256),
	field("deadline", FieldKind::Uint256),
];

const MULTISIG_TRANSFER_FIELDS: &[MessageField] = &[
	field("accountId", FieldKind::Uint256),
	field("to", FieldKind::Address),
	field("amount", FieldKind::Uint256),
	field("objectId", FieldKind::Uint256),
	field("objectData", FieldKind::Bytes),
	field("nonce", FieldKind::Uint256),
	field("deadline", FieldKind::Uint256),
];

const MULTISIG_UPDATE_FIELDS: &[MessageField] = &[
	field("accountId", FieldKind::Uint256),
	field("ownersHash", FieldKind::Bytes32),
	field("threshold", FieldKind::Uint256),
	field("nonce", FieldKind::Uint256),
	field("deadline", FieldKind::Uint256),
];

/// On-chain counter that backs the nonce of a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonceAccessor {
	/// `nonces(address)`, keyed by the transferring account.
	Nonces,
	/// `sessionKeyNonces(address)`, keyed by the account granting the key.
	SessionKeyNonces,
	/// `multiSigNonces(uint256)`, keyed by the multisig account id.
	MultiSigNonces,
}

impl NonceAccessor {
	/// Name of the view function exposing the counter.
	pub fn function_name(&self) -> &'static str {
		match self {
			NonceAccessor::Nonces => "nonces",
			NonceAccessor::SessionKeyNonces => "sessionKeyNonces",
			NonceAccessor::MultiSigNonces => "multiSigNonces",
		}
	}
}

impl fmt::Display for NonceAccessor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.function_name())
	}
}

/// The four signable operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
	TransferWithSig,
	SetSessionKeyWithSig,
	MultiSigTransfer,
	MultiSigUpdate,
}

impl MessageKind {
	pub const ALL: [MessageKind; 4] = [
		MessageKind::TransferWithSig,
		MessageKind::SetSessionKeyWithSig,
		MessageKind::MultiSigTransfer,
		MessageKind::MultiSigUpdate,
	];

	/// EIP-712 primary type name.
	pub fn primary_type(&self) -> &'static str {
		match self {
			MessageKind::TransferWithSig => "TransferWithSig",
			MessageKind::SetSessionKeyWithSig => "SetSessionKeyWithSig",
			MessageKind::MultiSigTransfer => "MultiSigTransfer",
			MessageKind::MultiSigUpdate => "MultiSigUpdate",
		}
	}

	/// Ordered field list of the schema.
	pub fn fields(&self) -> &'static [MessageField] {
		match self {
			MessageKind::TransferWithSig => TRANSFER_WITH_SIG_FIELDS,
			MessageKind::SetSessionKeyWithSig => SET_SESSION_KEY_WITH_SIG_FIELDS,
			MessageKind::MultiSigTransfer => MULTISIG_TRANSFER_FIELDS,
			MessageKind::MultiSigUpdate => MULTISIG_UPDATE_FIELDS,
		}
	}

	/// Counter consulted when the caller does not supply a nonce.
	pub fn nonce_accessor(&self) -> NonceAccessor {
		match self {
			MessageKind::TransferWithSig => NonceAccessor::Nonces,
			MessageKind::SetSessionKeyWithSig => NonceAccessor::SessionKeyNonces,
			MessageKind::MultiSigTransfer | MessageKind::MultiSigUpdate => {
				NonceAccessor::MultiSigNonces
			},
		}
	}

	/// Position of a field in the schema.
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields().iter().position(|f| f.name == name)
	}

	/// EIP-712 `encodeType` string, e.g. `MultiSigUpdate(uint256 accountId,...)`.
	///
	/// None of the schemas reference nested struct types, so the string is the
	/// primary type alone.
	pub fn encode_type(&self) -> String {
		let members = self
			.fields()
			.iter()
			.map(|f| format!("{} {}", f.kind, f.name))
			.collect::<Vec<_>>()
			.join(",");
		format!("{}({})", self.primary_type(), members)
	}

	/// keccak256 of [`MessageKind::encode_type`].
	pub fn type_hash(&self) -> B256 {
		keccak256(self.encode_type().as_bytes())
	}
}

impl fmt::Display for MessageKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.primary_type())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encode_type_strings() {
		assert_eq!(
			MessageKind::TransferWithSig.encode_type(),
			"TransferWithSig(address from,address to,uint256 amount,uint256 objectId,bytes objectData,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(
			MessageKind::SetSessionKeyWithSig.encode_type(),
			"SetSessionKeyWithSig(address account,address sessionKey,bool enabled,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(
			MessageKind::MultiSigTransfer.encode_type(),
			"MultiSigTransfer(uint256 accountId,address to,uint256 amount,uint256 objectId,bytes objectData,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(
			MessageKind::MultiSigUpdate.encode_type(),
			"MultiSigUpdate(uint256 accountId,bytes32 ownersHash,uint256 threshold,uint256 nonce,uint256 deadline)"
		);
	}

	#[test]
	fn test_every_schema_ends_with_nonce_and_deadline() {
		for kind in MessageKind::ALL {
			let fields = kind.fields();
			let tail: Vec<_> = fields[fields.len() - 2..].iter().map(|f| f.name).collect();
			assert_eq!(tail, vec!["nonce", "deadline"], "{}", kind);
			assert_eq!(kind.field_index("nonce"), Some(fields.len() - 2));
		}
	}

	#[test]
	fn test_nonce_accessors() {
		assert_eq!(
			MessageKind::TransferWithSig.nonce_accessor().function_name(),
			"nonces"
		);
		assert_eq!(
			MessageKind::SetSessionKeyWithSig
				.nonce_accessor()
				.function_name(),
			"sessionKeyNonces"
		);
		assert_eq!(
			MessageKind::MultiSigTransfer.nonce_accessor(),
			MessageKind::MultiSigUpdate.nonce_accessor()
		);
	}

	#[test]
	fn test_type_hash_is_keccak_of_encode_type() {
		for kind in MessageKind::ALL {
			assert_eq!(kind.type_hash(), keccak256(kind.encode_type()));
		}
	}
}
