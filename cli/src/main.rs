// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Wallet CLI
//!
//! Entry point for the `nova-wallet` binary. Parses CLI arguments,
//! initializes logging, and runs one wallet screen against the local
//! database.
//!
//! - `create`       - create-wallet flow (keychain, vault, onboarding flag)
//! - `unlock`       - decrypt the vault and list accounts
//! - `tokens`       - token list with main/secondary balances
//! - `remove-token` - long-press → remove flow of the token list
//! - `confirm`      - send confirmation summary from a snapshot
//! - `version`      - print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use nova_wallet::assets::{addresses_match, AssetRegistry, TokenRegistry};
use nova_wallet::config::KEYCHAIN_ACCOUNT_LABEL;
use nova_wallet::keychain::{SecureStore, SledKeychain};
use nova_wallet::store::{AppSnapshot, WalletDb};
use nova_wallet::vault::{KeyringController, LocalKeyring};
use nova_wallet::views::{
    CreateWallet, CreateWalletServices, SendConfirm, TokenList, TracingNavigator, TracingNotifier,
};

use cli::{Commands, NovaWalletCli};
use logging::LogFormat;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = NovaWalletCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Create(args) => create_wallet(args).await,
        Commands::Unlock(args) => unlock(args).await,
        Commands::Tokens(args) => tokens(args).await,
        Commands::RemoveToken(args) => remove_token(args).await,
        Commands::Confirm(args) => confirm(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens (creating if needed) the wallet database under `data_dir`.
fn open_db(data_dir: &Path) -> Result<WalletDb> {
    let db_path = data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;
    let db = WalletDb::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "database opened");
    Ok(db)
}

fn load_snapshot(path: &Path) -> Result<AppSnapshot> {
    AppSnapshot::load(path).with_context(|| format!("failed to load snapshot {}", path.display()))
}

async fn create_wallet(args: cli::CreateArgs) -> Result<()> {
    let db = open_db(&args.wallet.data_dir)?;
    if db.has_vault()? && !args.force {
        bail!(
            "a wallet already exists in {} (pass --force to replace it)",
            args.wallet.data_dir.display()
        );
    }

    let keychain = Arc::new(SledKeychain::new(db.clone(), args.device.security()));
    let view = CreateWallet::mount(CreateWalletServices {
        keychain,
        keyring: Arc::new(LocalKeyring::new(db.clone())),
        flags: Arc::new(db),
        navigator: Arc::new(TracingNavigator),
        notifier: Arc::new(TracingNotifier),
    });

    view.on_password_change(&args.password);
    view.on_confirm_password_change(args.confirm.as_deref().unwrap_or(&args.password));

    let accounts = view
        .on_press_create()
        .await
        .context("wallet creation failed")?;
    for account in accounts {
        println!("{account}");
    }
    Ok(())
}

async fn unlock(args: cli::UnlockArgs) -> Result<()> {
    let db = open_db(&args.wallet.data_dir)?;

    let password = match args.password {
        Some(password) => password,
        None => {
            let keychain = SledKeychain::new(db.clone(), args.device.security());
            let creds = keychain
                .get_generic_password(KEYCHAIN_ACCOUNT_LABEL)
                .await?
                .context("no password given and none stored in the keychain")?;
            creds.password.clone()
        }
    };

    let accounts = LocalKeyring::new(db)
        .submit_password(&password)
        .await
        .context("failed to unlock wallet")?;
    for account in accounts {
        println!("{account}");
    }
    Ok(())
}

async fn tokens(args: cli::TokensArgs) -> Result<()> {
    let db = open_db(&args.wallet.data_dir)?;
    let registry = Arc::new(TokenRegistry::new(db));

    let mut snapshot = match &args.snapshot {
        Some(path) => load_snapshot(path)?,
        None => AppSnapshot::default(),
    };
    if snapshot.tokens.is_empty() {
        snapshot.tokens = registry.tokens().await?;
    }
    let ignored = registry.ignored_tokens().await?;
    snapshot
        .tokens
        .retain(|t| !ignored.iter().any(|a| addresses_match(a, &t.address)));

    let list = TokenList::mount(
        Arc::new(snapshot),
        registry,
        Arc::new(TracingNavigator),
        Arc::new(TracingNotifier),
    );

    if list.is_empty() {
        println!("{}", list.empty_message());
        return Ok(());
    }

    let rows = list.rows().context("failed to render token balances")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in rows {
            match row.balances.secondary {
                Some(secondary) => println!("{:<44} {}  ({})", row.key, row.balances.main, secondary),
                None => println!("{:<44} {}", row.key, row.balances.main),
            }
        }
    }
    Ok(())
}

async fn remove_token(args: cli::RemoveTokenArgs) -> Result<()> {
    let db = open_db(&args.wallet.data_dir)?;
    let registry = Arc::new(TokenRegistry::new(db));
    let tracked = registry.tokens().await?;

    let Some(asset) = tracked
        .iter()
        .find(|t| addresses_match(&t.address, &args.address))
        .cloned()
    else {
        bail!("token {} is not in the list", args.address);
    };

    let list = TokenList::mount(
        Arc::new(AppSnapshot {
            tokens: tracked,
            ..AppSnapshot::default()
        }),
        registry,
        Arc::new(TracingNavigator),
        Arc::new(TracingNotifier),
    );
    list.show_remove_menu(&asset);
    list.on_action_sheet_press(0)
        .await
        .with_context(|| format!("failed to remove token {}", args.address))?;
    println!("removed {} ({})", asset.symbol, asset.address);
    Ok(())
}

fn confirm(args: cli::ConfirmArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let screen = SendConfirm::mount(&snapshot).context("cannot confirm transaction")?;
    let summary = screen.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let name = |n: &Option<String>| n.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
    println!("From:    {}{}", summary.from, name(&summary.from_name));
    println!("Balance: {}", summary.from_balance);
    println!(
        "To:      {}{}",
        summary.to.as_deref().unwrap_or("-"),
        name(&summary.to_name)
    );
    println!("Amount:  {}", summary.amount.as_deref().unwrap_or("-"));
    for row in &summary.breakdown {
        println!("  {:<16} {}", row.label, row.value);
    }
    Ok(())
}

fn print_version() {
    println!("nova-wallet {}", env!("CARGO_PKG_VERSION"));
    println!("rustc       {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
