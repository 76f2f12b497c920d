//! CLI subcommands.

use crate::factory_registry::RelayContext;
use crate::ServiceError;
use clap::{Args, Subcommand};
use nano_config::Config;
use nano_signatures::{
	compute_owners_hash, order_approvals, Approval, AuthorizationMessage, MultiSigTransfer,
	MultiSigUpdate, OwnerList, SessionKeyGrant, SigningOptions, TransferWithSig,
};
use nano_types::{parse_address, Address, Bytes, U256};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn parse_u256(input: &str) -> Result<U256, String> {
	input.parse::<U256>().map_err(|e| e.to_string())
}

fn parse_bytes(input: &str) -> Result<Bytes, String> {
	input.parse::<Bytes>().map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Command {
	#[command(flatten)]
	Offline(OfflineCommand),
	#[command(flatten)]
	Relay(RelayCommand),
}

/// Commands that need only their arguments.
#[derive(Subcommand, Debug)]
pub enum OfflineCommand {
	/// Hash a proposed owner list, in the given order
	OwnersHash {
		#[arg(long, value_parser = parse_address, value_delimiter = ',', required = true)]
		owners: Vec<Address>,
	},
	/// Order a JSON file of approvals by owner address
	OrderApprovals {
		#[arg(long)]
		approvals: PathBuf,
	},
}

/// Commands that talk to the token through the configured accounts.
#[derive(Subcommand, Debug)]
pub enum RelayCommand {
	/// Resolve the EIP-712 signing domain of the token
	Domain {
		#[arg(long)]
		token_name: Option<String>,
	},
	/// Print the eth_signTypedData_v4 document of a message without signing it
	TypedData {
		#[command(subcommand)]
		message: Message,
	},
	/// Sign a TransferWithSig authorization
	SignTransfer {
		#[command(flatten)]
		fields: TransferFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	/// Sign a SetSessionKeyWithSig authorization
	SignSessionKey {
		#[command(flatten)]
		fields: SessionKeyFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	/// Approve a multisig transfer as one of its owners
	ApproveMultisigTransfer {
		#[command(flatten)]
		fields: MultiSigTransferFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	/// Approve a multisig owner update as one of its owners
	ApproveMultisigUpdate {
		#[command(flatten)]
		fields: MultiSigUpdateFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	/// Relay a signed TransferWithSig
	SubmitTransfer {
		#[command(flatten)]
		fields: TransferFields,
		#[command(flatten)]
		signed: SignedArgs,
	},
	/// Relay a signed SetSessionKeyWithSig
	SubmitSessionKey {
		#[command(flatten)]
		fields: SessionKeyFields,
		#[command(flatten)]
		signed: SignedArgs,
	},
	/// Relay a multisig transfer with its owners' approvals
	SubmitMultisigTransfer {
		#[command(flatten)]
		fields: MultiSigTransferFields,
		#[command(flatten)]
		approved: ApprovedArgs,
	},
	/// Relay a multisig owner update with its owners' approvals
	SubmitMultisigUpdate {
		#[command(flatten)]
		fields: MultiSigUpdateFields,
		#[command(flatten)]
		approved: ApprovedArgs,
	},
	/// Enable or disable a session key directly from the signing account
	SetSessionKey {
		#[arg(long, value_parser = parse_address)]
		session_key: Address,
		#[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
		enabled: bool,
	},
}

/// Messages accepted by `typed-data`.
#[derive(Subcommand, Debug)]
pub enum Message {
	Transfer {
		#[command(flatten)]
		fields: TransferFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	SessionKey {
		#[command(flatten)]
		fields: SessionKeyFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	MultisigTransfer {
		#[command(flatten)]
		fields: MultiSigTransferFields,
		#[command(flatten)]
		options: OptionArgs,
	},
	MultisigUpdate {
		#[command(flatten)]
		fields: MultiSigUpdateFields,
		#[command(flatten)]
		options: OptionArgs,
	},
}

#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
	/// Nonce to sign; read from the token when omitted
	#[arg(long, value_parser = parse_u256)]
	nonce: Option<U256>,
	/// Unix deadline; now + signing.deadline_ttl_seconds when omitted
	#[arg(long, value_parser = parse_u256)]
	deadline: Option<U256>,
	/// Domain name; the configured or on-chain name when omitted
	#[arg(long)]
	token_name: Option<String>,
}

impl From<OptionArgs> for SigningOptions {
	fn from(args: OptionArgs) -> Self {
		SigningOptions {
			nonce: args.nonce,
			deadline: args.deadline,
			token_name: args.token_name,
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct SignedArgs {
	#[arg(long, value_parser = parse_u256)]
	deadline: U256,
	#[arg(long, value_parser = parse_bytes)]
	signature: Bytes,
}

#[derive(Args, Debug, Clone)]
pub struct ApprovedArgs {
	#[arg(long, value_parser = parse_u256)]
	deadline: U256,
	/// JSON file holding an array of `{ "owner", "signature" }` objects
	#[arg(long)]
	approvals: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TransferFields {
	/// Token holder; the signing account when omitted
	#[arg(long, value_parser = parse_address)]
	from: Option<Address>,
	#[arg(long, value_parser = parse_address)]
	to: Address,
	#[arg(long, value_parser = parse_u256)]
	amount: U256,
	#[arg(long, value_parser = parse_u256, default_value = "0")]
	object_id: U256,
	#[arg(long, value_parser = parse_bytes, default_value = "0x")]
	object_data: Bytes,
}

impl TransferFields {
	fn into_message(self, signer: Option<Address>) -> Result<TransferWithSig, ServiceError> {
		let from = self
			.from
			.or(signer)
			.ok_or_else(|| ServiceError::Input("--from is required".to_string()))?;
		Ok(TransferWithSig::new(from, self.to, self.amount).with_object(self.object_id, self.object_data))
	}
}

#[derive(Args, Debug, Clone)]
pub struct SessionKeyFields {
	/// Granting account; the signing account when omitted
	#[arg(long, value_parser = parse_address)]
	account: Option<Address>,
	#[arg(long, value_parser = parse_address)]
	session_key: Address,
	#[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
	enabled: bool,
}

impl SessionKeyFields {
	fn into_message(self, signer: Option<Address>) -> Result<SessionKeyGrant, ServiceError> {
		let account = self
			.account
			.or(signer)
			.ok_or_else(|| ServiceError::Input("--account is required".to_string()))?;
		Ok(SessionKeyGrant {
			account,
			session_key: self.session_key,
			enabled: self.enabled,
		})
	}
}

#[derive(Args, Debug, Clone)]
pub struct MultiSigTransferFields {
	#[arg(long, value_parser = parse_u256)]
	account_id: U256,
	#[arg(long, value_parser = parse_address)]
	to: Address,
	#[arg(long, value_parser = parse_u256)]
	amount: U256,
	#[arg(long, value_parser = parse_u256, default_value = "0")]
	object_id: U256,
	#[arg(long, value_parser = parse_bytes, default_value = "0x")]
	object_data: Bytes,
}

impl From<MultiSigTransferFields> for MultiSigTransfer {
	fn from(fields: MultiSigTransferFields) -> Self {
		MultiSigTransfer::new(fields.account_id, fields.to, fields.amount)
			.with_object(fields.object_id, fields.object_data)
	}
}

#[derive(Args, Debug, Clone)]
pub struct MultiSigUpdateFields {
	#[arg(long, value_parser = parse_u256)]
	account_id: U256,
	/// Proposed owners, comma separated; order matters
	#[arg(long, value_parser = parse_address, value_delimiter = ',', required = true)]
	owners: Vec<Address>,
	#[arg(long, value_parser = parse_u256)]
	threshold: U256,
}

impl From<MultiSigUpdateFields> for MultiSigUpdate {
	fn from(fields: MultiSigUpdateFields) -> Self {
		MultiSigUpdate {
			account_id: fields.account_id,
			owners: OwnerList::new(fields.owners),
			threshold: fields.threshold,
		}
	}
}

async fn read_approvals(path: &Path) -> Result<Vec<Approval>, ServiceError> {
	let content = tokio::fs::read_to_string(path).await?;
	Ok(serde_json::from_str(&content)?)
}

/// Runs `command`. Commands that need the token load `config_path` first.
pub async fn execute(command: Command, config_path: &Path) -> Result<Value, ServiceError> {
	match command {
		Command::Offline(command) => execute_offline(command).await,
		Command::Relay(command) => {
			let config = Config::from_file(config_path).await?;
			let context = RelayContext::from_config(&config)?;
			execute_relay(command, &context).await
		},
	}
}

async fn execute_offline(command: OfflineCommand) -> Result<Value, ServiceError> {
	match command {
		OfflineCommand::OwnersHash { owners } => {
			let owners = OwnerList::new(owners);
			Ok(json!({
				"owners": owners,
				"ownersHash": compute_owners_hash(&owners),
			}))
		},
		OfflineCommand::OrderApprovals { approvals } => {
			let ordered = order_approvals(read_approvals(&approvals).await?)?;
			Ok(json!({
				"approvals": ordered,
				"signatures": ordered.signatures(),
			}))
		},
	}
}

async fn typed_data<M: AuthorizationMessage>(
	context: &RelayContext,
	message: &M,
	options: OptionArgs,
) -> Result<Value, ServiceError> {
	let prepared = context.builder().prepare(message, &options.into()).await?;
	Ok(json!({
		"typedData": prepared.request.to_typed_data_json(),
		"signingHash": prepared.request.signing_hash(),
		"nonce": prepared.nonce,
		"deadline": prepared.deadline,
	}))
}

async fn execute_relay(command: RelayCommand, context: &RelayContext) -> Result<Value, ServiceError> {
	let builder = context.builder();
	let signer = builder.signer_address();

	let tx_hash = match command {
		RelayCommand::Domain { token_name } => {
			let domain = context.domains().resolve(token_name.as_deref()).await?;
			return Ok(json!({
				"domain": domain,
				"separator": domain.separator(),
			}));
		},
		RelayCommand::TypedData { message } => {
			return match message {
				Message::Transfer { fields, options } => {
					typed_data(context, &fields.into_message(signer)?, options).await
				},
				Message::SessionKey { fields, options } => {
					typed_data(context, &fields.into_message(signer)?, options).await
				},
				Message::MultisigTransfer { fields, options } => {
					typed_data(context, &MultiSigTransfer::from(fields), options).await
				},
				Message::MultisigUpdate { fields, options } => {
					typed_data(context, &MultiSigUpdate::from(fields), options).await
				},
			};
		},
		RelayCommand::SignTransfer { fields, options } => {
			let signed = builder
				.build_transfer_approval(&fields.into_message(signer)?, &options.into())
				.await?;
			return Ok(serde_json::to_value(signed)?);
		},
		RelayCommand::SignSessionKey { fields, options } => {
			let signed = builder
				.build_session_key_approval(&fields.into_message(signer)?, &options.into())
				.await?;
			return Ok(serde_json::to_value(signed)?);
		},
		RelayCommand::ApproveMultisigTransfer { fields, options } => {
			let approval = builder
				.build_multisig_transfer_approval(&fields.into(), &options.into())
				.await?;
			return Ok(serde_json::to_value(approval)?);
		},
		RelayCommand::ApproveMultisigUpdate { fields, options } => {
			let approval = builder
				.build_multisig_update_approval(&fields.into(), &options.into())
				.await?;
			return Ok(serde_json::to_value(approval)?);
		},
		RelayCommand::SubmitTransfer { fields, signed } => {
			context
				.submission()
				.transfer_with_sig(
					&fields.into_message(signer)?,
					signed.deadline,
					&signed.signature,
				)
				.await?
		},
		RelayCommand::SubmitSessionKey { fields, signed } => {
			context
				.submission()
				.set_session_key_with_sig(
					&fields.into_message(signer)?,
					signed.deadline,
					&signed.signature,
				)
				.await?
		},
		RelayCommand::SubmitMultisigTransfer { fields, approved } => {
			let approvals = read_approvals(&approved.approvals).await?;
			context
				.submission()
				.transfer_from_multisig(&fields.into(), approved.deadline, approvals)
				.await?
		},
		RelayCommand::SubmitMultisigUpdate { fields, approved } => {
			let approvals = read_approvals(&approved.approvals).await?;
			context
				.submission()
				.update_multisig_account(&fields.into(), approved.deadline, approvals)
				.await?
		},
		RelayCommand::SetSessionKey {
			session_key,
			enabled,
		} => {
			builder
				.submit_session_key_direct(&context.submission(), session_key, enabled)
				.await?
		},
	};

	Ok(json!({ "transactionHash": tx_hash }))
}
