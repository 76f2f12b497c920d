//! Registry trait for self-registering implementations.
//!
//! Account and contract implementations each expose a `Registry` struct so the
//! binary can look them up by the name used in the TOML configuration.

/// Base trait for implementation registries.
///
/// Every implementation module provides a Registry struct implementing this
/// trait, declaring its configuration name and the factory that builds it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// For example "local" for `account.implementations.local` or
	/// "evm_alloy" for `contract.implementations.evm_alloy`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
