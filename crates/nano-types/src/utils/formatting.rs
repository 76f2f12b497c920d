//! String formatting utilities.
//!
//! Hex prefix management and truncation of long hex values for log output.

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes the "0x" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Shortens a 0x-prefixed hex encoding of `bytes` to its first and last
/// four bytes, e.g. `0x1234abcd..deadbeef`. Short values are returned whole.
pub fn truncate_hex(bytes: &[u8]) -> String {
	let encoded = hex::encode(bytes);
	if encoded.len() <= 16 {
		with_0x_prefix(&encoded)
	} else {
		format!("0x{}..{}", &encoded[..8], &encoded[encoded.len() - 8..])
	}
}
