//! Conversion utilities for text input.

use super::formatting::{with_0x_prefix, without_0x_prefix};
use alloy_primitives::Address;

/// Parses an address from user input into its canonical form.
///
/// All-lowercase and all-uppercase hex is accepted as is. Mixed-case input is
/// treated as EIP-55 checksummed and rejected when the checksum does not match.
pub fn parse_address(input: &str) -> Result<Address, String> {
	let digits = without_0x_prefix(input.trim());
	if digits.len() != 40 {
		return Err(format!(
			"Invalid address '{}': expected 40 hex characters",
			input
		));
	}

	let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
	let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
	if has_lower && has_upper {
		Address::parse_checksummed(with_0x_prefix(digits), None)
			.map_err(|e| format!("Invalid checksummed address '{}': {}", input, e))
	} else {
		digits
			.parse::<Address>()
			.map_err(|e| format!("Invalid address '{}': {}", input, e))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CHECKSUMMED: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

	#[test]
	fn test_parse_address_case_variants_agree() {
		let canonical = parse_address(CHECKSUMMED).unwrap();
		assert_eq!(parse_address(&CHECKSUMMED.to_lowercase()).unwrap(), canonical);
		assert_eq!(
			parse_address(&format!("0x{}", CHECKSUMMED[2..].to_uppercase())).unwrap(),
			canonical
		);
		assert_eq!(parse_address(&CHECKSUMMED[2..]).unwrap(), canonical);
		assert_eq!(canonical.to_checksum(None), CHECKSUMMED);
	}

	#[test]
	fn test_parse_address_rejects_bad_checksum() {
		let tampered = "0x5fbDB2315678afecb367f032d93F642f64180aa3";
		assert!(parse_address(tampered).is_err());
	}

	#[test]
	fn test_parse_address_rejects_wrong_length() {
		assert!(parse_address("0x1234").is_err());
		assert!(parse_address("").is_err());
	}
}
