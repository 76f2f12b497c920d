//! Main entry point for the NanoToken relay CLI.
//!
//! `nano-relay` signs NanoToken authorizations with the configured account,
//! prints what a wallet would be asked to sign, orders multisig approvals and
//! submits signed payloads through the configured relayer. Every command
//! prints a JSON document on stdout; logs go to stderr.

use clap::Parser;
use nano_account::AccountError;
use nano_config::ConfigError;
use nano_contract::ContractError;
use nano_signatures::SignatureError;
use std::path::PathBuf;
use thiserror::Error;

mod commands;
mod factory_registry;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum ServiceError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	Contract(#[from] ContractError),
	#[error(transparent)]
	Signature(#[from] SignatureError),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
	/// No implementation with this name is registered.
	#[error("Unknown {section} implementation '{name}'")]
	UnknownImplementation { section: &'static str, name: String },
	#[error("Invalid input: {0}")]
	Input(String),
}

/// Command-line arguments for the relay CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let output = commands::execute(args.command, &args.config).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}
