//! # CLI Interface
//!
//! Command-line structure for `nova-wallet`, via `clap` derive. Every
//! subcommand drives one of the wallet screens against on-disk state.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use nova_wallet::keychain::{BiometryType, DeviceSecurity};

/// NOVA wallet.
///
/// Creates and unlocks a local wallet, lists tracked tokens with their
/// balances, and previews send confirmations from an exported app snapshot.
#[derive(Parser, Debug)]
#[command(
    name = "nova-wallet",
    about = "NOVA wallet screens from the command line",
    version,
    propagate_version = true
)]
pub struct NovaWalletCli {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "NOVA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new wallet protected by a password.
    Create(CreateArgs),
    /// Decrypt the wallet vault and list its accounts.
    Unlock(UnlockArgs),
    /// Render the token list.
    Tokens(TokensArgs),
    /// Remove a token from the list and stop detecting it.
    RemoveToken(RemoveTokenArgs),
    /// Render the send confirmation for the draft in a snapshot.
    Confirm(ConfirmArgs),
    /// Print version information and exit.
    Version,
}

/// Location of the wallet database.
#[derive(Args, Debug, Clone)]
pub struct WalletArgs {
    /// Directory holding the wallet database.
    ///
    /// Created on first use if it does not exist.
    #[arg(long, short = 'd', env = "NOVA_WALLET_DIR", default_value = ".nova-wallet")]
    pub data_dir: PathBuf,
}

/// The simulated device security model used by the keychain.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Whether the device has a passcode configured.
    #[arg(
        long,
        env = "NOVA_DEVICE_PASSCODE",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub device_passcode: bool,

    /// Biometric sensor of the device: faceid, touchid, fingerprint or iris.
    #[arg(long, env = "NOVA_BIOMETRY")]
    pub biometry: Option<BiometryType>,
}

impl DeviceArgs {
    pub fn security(&self) -> DeviceSecurity {
        DeviceSecurity {
            passcode_set: self.device_passcode,
            biometry: self.biometry,
        }
    }
}

/// Arguments for the `create` subcommand.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub wallet: WalletArgs,

    #[command(flatten)]
    pub device: DeviceArgs,

    /// New wallet password, at least 8 characters.
    ///
    /// **Prefer the environment variable** over the flag; flags end up in
    /// shell history.
    #[arg(long, env = "NOVA_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password confirmation. Defaults to `--password`.
    #[arg(long)]
    pub confirm: Option<String>,

    /// Replace an existing wallet.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `unlock` subcommand.
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    #[command(flatten)]
    pub wallet: WalletArgs,

    #[command(flatten)]
    pub device: DeviceArgs,

    /// Wallet password. When omitted, the password stored in the keychain
    /// at creation time is used.
    #[arg(long, env = "NOVA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the `tokens` subcommand.
#[derive(Parser, Debug)]
pub struct TokensArgs {
    #[command(flatten)]
    pub wallet: WalletArgs,

    /// App snapshot (JSON) with balances and rates.
    ///
    /// When it lists no tokens, the wallet's tracked tokens are shown.
    #[arg(long, short = 's', env = "NOVA_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Print rows as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `remove-token` subcommand.
#[derive(Parser, Debug)]
pub struct RemoveTokenArgs {
    #[command(flatten)]
    pub wallet: WalletArgs,

    /// Contract address of the token to remove.
    pub address: String,
}

/// Arguments for the `confirm` subcommand.
#[derive(Parser, Debug)]
pub struct ConfirmArgs {
    /// App snapshot (JSON) holding the transaction draft.
    #[arg(long, short = 's', env = "NOVA_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}
