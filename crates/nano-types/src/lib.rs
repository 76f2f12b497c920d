//! Common types module for the NanoToken relay signature system.
//!
//! This module defines the data types shared by every crate in the workspace:
//! the EIP-712 message schemas, the typed-data request model and its hashing,
//! configuration validation primitives and a few formatting helpers.

/// Implementation registry trait used by pluggable collaborators.
pub mod registry;
/// EIP-712 message schemas for every signable operation.
pub mod schemas;
/// Secure string wrapper for private keys.
pub mod secret_string;
/// Transaction handle types returned by the write collaborator.
pub mod transaction;
/// Typed-data domain, field values and signature requests.
pub mod typed_data;
/// Utility functions for hashing, conversion and formatting.
pub mod utils;
/// Configuration validation types for implementation tables.
pub mod validation;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use registry::ImplementationRegistry;
pub use schemas::{FieldKind, MessageField, MessageKind, NonceAccessor};
pub use secret_string::SecretString;
pub use transaction::TransactionHash;
pub use typed_data::{Domain, FieldValue, SignatureRequest, TypedDataError, DOMAIN_VERSION};
pub use utils::{current_timestamp, parse_address, truncate_hex, with_0x_prefix};
pub use validation::*;
