//! EIP-712 typed-data requests.
//!
//! A [`SignatureRequest`] pairs a [`Domain`] with one of the registered
//! [`MessageKind`] schemas and the field values in schema order. Construction
//! checks the values against the schema, so a request that exists can always
//! be hashed and rendered for a wallet.

use crate::schemas::{FieldKind, MessageKind};
use crate::utils::eip712::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Version string of every NanoToken signing domain.
pub const DOMAIN_VERSION: &str = "1";

/// Errors raised when field values do not fit a message schema.
#[derive(Debug, Error)]
pub enum TypedDataError {
	#[error("{primary_type} expects {expected} fields, got {actual}")]
	FieldCount {
		primary_type: &'static str,
		expected: usize,
		actual: usize,
	},
	#[error("Field '{field}' of {primary_type} expects {expected}, got {actual}")]
	FieldKind {
		primary_type: &'static str,
		field: &'static str,
		expected: FieldKind,
		actual: FieldKind,
	},
}

/// EIP-712 signing domain scoping a signature to one token deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	pub verifying_contract: Address,
}

impl Domain {
	/// Creates a domain with the fixed [`DOMAIN_VERSION`].
	pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
		Self {
			name: name.into(),
			version: DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract,
		}
	}

	/// The domain separator hash.
	pub fn separator(&self) -> B256 {
		compute_domain_hash(
			&self.name,
			&self.version,
			self.chain_id,
			&self.verifying_contract,
		)
	}

	fn to_json(&self) -> Value {
		json!({
			"name": self.name,
			"version": self.version,
			"chainId": self.chain_id,
			"verifyingContract": self.verifying_contract.to_checksum(None),
		})
	}
}

/// A single message field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
	Address(Address),
	Uint(U256),
	Bool(bool),
	Bytes(Bytes),
	Bytes32(B256),
}

impl FieldValue {
	pub fn kind(&self) -> FieldKind {
		match self {
			FieldValue::Address(_) => FieldKind::Address,
			FieldValue::Uint(_) => FieldKind::Uint256,
			FieldValue::Bool(_) => FieldKind::Bool,
			FieldValue::Bytes(_) => FieldKind::Bytes,
			FieldValue::Bytes32(_) => FieldKind::Bytes32,
		}
	}

	fn encode_into(&self, enc: &mut Eip712AbiEncoder) {
		match self {
			FieldValue::Address(a) => enc.push_address(a),
			FieldValue::Uint(v) => enc.push_u256(*v),
			FieldValue::Bool(b) => enc.push_bool(*b),
			FieldValue::Bytes(data) => enc.push_dynamic_bytes(data),
			FieldValue::Bytes32(word) => enc.push_b256(word),
		}
	}

	/// JSON rendering expected by `eth_signTypedData_v4` wallets.
	/// uint256 values are decimal strings so they survive JavaScript numbers.
	fn to_json(&self) -> Value {
		match self {
			FieldValue::Address(a) => Value::String(a.to_checksum(None)),
			FieldValue::Uint(v) => Value::String(v.to_string()),
			FieldValue::Bool(b) => Value::Bool(*b),
			FieldValue::Bytes(data) => Value::String(format!("0x{}", hex::encode(data))),
			FieldValue::Bytes32(word) => Value::String(format!("0x{:x}", word)),
		}
	}
}

impl From<Address> for FieldValue {
	fn from(value: Address) -> Self {
		FieldValue::Address(value)
	}
}

impl From<U256> for FieldValue {
	fn from(value: U256) -> Self {
		FieldValue::Uint(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		FieldValue::Bool(value)
	}
}

impl From<Bytes> for FieldValue {
	fn from(value: Bytes) -> Self {
		FieldValue::Bytes(value)
	}
}

impl From<B256> for FieldValue {
	fn from(value: B256) -> Self {
		FieldValue::Bytes32(value)
	}
}

/// Domain, schema and message values ready to be handed to a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequest {
	domain: Domain,
	kind: MessageKind,
	values: Vec<FieldValue>,
}

impl SignatureRequest {
	/// Builds a request, checking `values` against the schema of `kind`.
	///
	/// `values` must be given in schema field order.
	pub fn new(
		domain: Domain,
		kind: MessageKind,
		values: Vec<FieldValue>,
	) -> Result<Self, TypedDataError> {
		let fields = kind.fields();
		if fields.len() != values.len() {
			return Err(TypedDataError::FieldCount {
				primary_type: kind.primary_type(),
				expected: fields.len(),
				actual: values.len(),
			});
		}

		for (field, value) in fields.iter().zip(&values) {
			if field.kind != value.kind() {
				return Err(TypedDataError::FieldKind {
					primary_type: kind.primary_type(),
					field: field.name,
					expected: field.kind,
					actual: value.kind(),
				});
			}
		}

		Ok(Self {
			domain,
			kind,
			values,
		})
	}

	pub fn domain(&self) -> &Domain {
		&self.domain
	}

	pub fn kind(&self) -> MessageKind {
		self.kind
	}

	pub fn values(&self) -> &[FieldValue] {
		&self.values
	}

	/// Looks a value up by schema field name.
	pub fn field(&self, name: &str) -> Option<&FieldValue> {
		self.kind.field_index(name).map(|i| &self.values[i])
	}

	/// hashStruct(message) = keccak256(typeHash || encodeData(message)).
	pub fn struct_hash(&self) -> B256 {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&self.kind.type_hash());
		for value in &self.values {
			value.encode_into(&mut enc);
		}
		keccak256(enc.finish())
	}

	/// The digest a signer signs: keccak256(0x1901 || domainSeparator || hashStruct).
	pub fn signing_hash(&self) -> B256 {
		compute_final_digest(&self.domain.separator(), &self.struct_hash())
	}

	/// Renders the request as an `eth_signTypedData_v4` document.
	pub fn to_typed_data_json(&self) -> Value {
		let domain_fields = json!([
			{ "name": "name", "type": "string" },
			{ "name": "version", "type": "string" },
			{ "name": "chainId", "type": "uint256" },
			{ "name": "verifyingContract", "type": "address" },
		]);
		let message_fields: Vec<Value> = self
			.kind
			.fields()
			.iter()
			.map(|f| json!({ "name": f.name, "type": f.kind.as_str() }))
			.collect();

		let mut types = Map::new();
		types.insert("EIP712Domain".to_string(), domain_fields);
		types.insert(
			self.kind.primary_type().to_string(),
			Value::Array(message_fields),
		);

		let message: Map<String, Value> = self
			.kind
			.fields()
			.iter()
			.zip(&self.values)
			.map(|(f, v)| (f.name.to_string(), v.to_json()))
			.collect();

		json!({
			"types": types,
			"primaryType": self.kind.primary_type(),
			"domain": self.domain.to_json(),
			"message": message,
		})
	}
}
