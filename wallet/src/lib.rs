// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Wallet: Screen Logic Library
//!
//! The behavior behind three wallet screens, minus the widgets: creating a
//! wallet from a password, rendering the token list, and confirming a send.
//!
//! Every screen reads an [`store::AppSnapshot`] handed to it by the caller and
//! pushes user intent out through small traits (keychain, keyring, flag store,
//! asset registry, navigator, notifier). Nothing in here owns the application
//! store. If a view wants something changed, it asks a controller.
//!
//! ## Architecture
//!
//! - **config** - Labels, keys, route names and display precision.
//! - **units** - Minimal-unit and fiat formatting. Integer math only until
//!   the last step, where fiat goes through `f64` on purpose.
//! - **store** - Read-only application snapshot and the sled-backed
//!   [`store::WalletDb`].
//! - **keychain** - Secure credential store seam plus in-memory and sled
//!   implementations.
//! - **vault** - Password-sealed keyring (Argon2id + AES-256-GCM).
//! - **assets** - Token metadata and the tracked/ignored token registry.
//! - **lifecycle** - Mount handles that keep unmounted views from mutating.
//! - **views** - The three screens: `create_wallet`, `tokens`, `confirm`.

pub mod assets;
pub mod config;
pub mod keychain;
pub mod lifecycle;
pub mod store;
pub mod units;
pub mod vault;
pub mod views;
