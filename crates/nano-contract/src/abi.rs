//! Human-readable ABI of the NanoToken functions used by the relay.

use crate::ContractError;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::Function;
use alloy_primitives::Bytes;
use once_cell::sync::Lazy;
use std::collections::HashMap;

const SIGNATURES: &[&str] = &[
	"function name() view returns (string)",
	"function nonces(address owner) view returns (uint256)",
	"function sessionKeyNonces(address account) view returns (uint256)",
	"function multiSigNonces(uint256 accountId) view returns (uint256)",
	"function transferWithSig(address from, address to, uint256 amount, uint256 objectId, bytes objectData, uint256 deadline, bytes signature)",
	"function setSessionKeyWithSig(address account, address sessionKey, bool enabled, uint256 deadline, bytes signature)",
	"function transferFromMultiSig(uint256 accountId, address to, uint256 amount, uint256 objectId, bytes objectData, uint256 deadline, bytes[] signatures)",
	"function updateMultiSigAccount(uint256 accountId, address[] owners, uint256 threshold, uint256 deadline, bytes[] signatures)",
	"function setSessionKey(address sessionKey, bool enabled)",
];

static FUNCTIONS: Lazy<HashMap<String, Function>> = Lazy::new(|| {
	SIGNATURES
		.iter()
		.filter_map(|signature| Function::parse(signature).ok())
		.map(|function| (function.name.clone(), function))
		.collect()
});

/// Looks a NanoToken function up by name.
pub fn function(name: &str) -> Result<&'static Function, ContractError> {
	FUNCTIONS
		.get(name)
		.ok_or_else(|| ContractError::UnknownFunction(name.to_string()))
}

/// Selector-prefixed calldata for `name(args..)`.
pub fn encode_call(name: &str, args: &[DynSolValue]) -> Result<Bytes, ContractError> {
	let function = function(name)?;
	function
		.abi_encode_input(args)
		.map(Bytes::from)
		.map_err(|e| ContractError::Call(format!("Failed to encode {}: {}", name, e)))
}

/// Decodes the return data of `name`.
///
/// Single-output functions yield that value; anything else is returned as a
/// tuple.
pub fn decode_output(name: &str, data: &[u8]) -> Result<DynSolValue, ContractError> {
	let function = function(name)?;
	let mut outputs = function
		.abi_decode_output(data, true)
		.map_err(|e| ContractError::Decode(format!("{} output: {}", name, e)))?;

	if outputs.len() == 1 {
		Ok(outputs.remove(0))
	} else {
		Ok(DynSolValue::Tuple(outputs))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, keccak256, U256};

	#[test]
	fn test_every_signature_parses() {
		assert_eq!(FUNCTIONS.len(), SIGNATURES.len());
	}

	#[test]
	fn test_selectors() {
		for (name, canonical) in [
			("name", "name()"),
			("nonces", "nonces(address)"),
			("sessionKeyNonces", "sessionKeyNonces(address)"),
			("multiSigNonces", "multiSigNonces(uint256)"),
			(
				"transferWithSig",
				"transferWithSig(address,address,uint256,uint256,bytes,uint256,bytes)",
			),
			(
				"setSessionKeyWithSig",
				"setSessionKeyWithSig(address,address,bool,uint256,bytes)",
			),
			(
				"transferFromMultiSig",
				"transferFromMultiSig(uint256,address,uint256,uint256,bytes,uint256,bytes[])",
			),
			(
				"updateMultiSigAccount",
				"updateMultiSigAccount(uint256,address[],uint256,uint256,bytes[])",
			),
			("setSessionKey", "setSessionKey(address,bool)"),
		] {
			let function = function(name).unwrap();
			assert_eq!(function.signature(), canonical);
			assert_eq!(
				function.selector().as_slice(),
				&keccak256(canonical.as_bytes())[..4]
			);
		}
	}

	#[test]
	fn test_encode_call() {
		let session_key = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
		let data = encode_call(
			"setSessionKey",
			&[DynSolValue::Address(session_key), DynSolValue::Bool(true)],
		)
		.unwrap();

		assert_eq!(data.len(), 4 + 64);
		assert_eq!(&data[..4], &keccak256("setSessionKey(address,bool)")[..4]);
		assert_eq!(&data[16..36], session_key.as_slice());
		assert_eq!(data[67], 1);
	}

	#[test]
	fn test_encode_rejects_wrong_arguments() {
		assert!(matches!(
			encode_call("setSessionKey", &[DynSolValue::Bool(true)]),
			Err(ContractError::Call(_))
		));
		assert!(matches!(
			encode_call("approve", &[]),
			Err(ContractError::UnknownFunction(_))
		));
	}

	#[test]
	fn test_decode_uint_output() {
		let data = U256::from(42u64).to_be_bytes::<32>();
		let value = decode_output("nonces", &data).unwrap();
		assert_eq!(value.as_uint(), Some((U256::from(42u64), 256)));

		assert!(matches!(
			decode_output("nonces", &[0u8; 4]),
			Err(ContractError::Decode(_))
		));
	}
}
