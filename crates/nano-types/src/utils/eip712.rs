//! Generic EIP-712 utilities.
//!
//! These helpers provide:
//! - Domain separator computation for `EIP712Domain(name, version, chainId, verifyingContract)`
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the field types used by the NanoToken schemas

use alloy_primitives::{keccak256, Address, B256, U256};

pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Compute the EIP-712 domain separator
/// (keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))).
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(name.as_bytes()));
	enc.push_b256(&keccak256(version.as_bytes()));
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for EIP-712 struct hashing.
///
/// Every push appends exactly one 32-byte word.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_bool(&mut self, v: bool) {
		let mut word = [0u8; 32];
		word[31] = v as u8;
		self.buf.extend_from_slice(&word);
	}

	/// Dynamic `bytes` are encoded as the keccak256 of their contents.
	pub fn push_dynamic_bytes(&mut self, data: &[u8]) {
		self.push_b256(&keccak256(data));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_encoder_words() {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_bool(true);
		enc.push_address(&address!("00000000000000000000000000000000000000ff"));
		enc.push_u256(U256::from(7u64));
		let out = enc.finish();

		assert_eq!(out.len(), 96);
		assert_eq!(out[31], 1);
		assert!(out[..31].iter().all(|b| *b == 0));
		assert_eq!(out[63], 0xff);
		assert_eq!(out[95], 7);
	}

	#[test]
	fn test_empty_bytes_hash() {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_dynamic_bytes(&[]);
		assert_eq!(enc.finish(), keccak256([]).to_vec());
	}

	#[test]
	fn test_domain_hash_depends_on_every_member() {
		let contract = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
		let base = compute_domain_hash("Nano", "1", 1, &contract);

		assert_ne!(base, compute_domain_hash("Nano2", "1", 1, &contract));
		assert_ne!(base, compute_domain_hash("Nano", "2", 1, &contract));
		assert_ne!(base, compute_domain_hash("Nano", "1", 2, &contract));
		assert_ne!(base, compute_domain_hash("Nano", "1", 1, &Address::ZERO));
	}
}
