//! Utility functions for hashing, conversions and display formatting.

pub mod conversion;
pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use conversion::parse_address;
pub use eip712::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder, DOMAIN_TYPE};
pub use formatting::{truncate_hex, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
