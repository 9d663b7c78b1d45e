// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Storage
//!
//! Wallet records live in an embedded redb database. Handlers only see the
//! [`WalletStore`] trait, so tests swap in doubles.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATABASE_PATH}            # default data/wallets.redb
//!   wallets                  # wallet_id → Wallet JSON
//!   vault_account_index      # vault_account_id → wallet_id
//! ```

pub mod wallet_db;
pub mod wallets;

pub use wallet_db::RedbWalletStore;
pub use wallets::{NewWallet, StoreError, StoreResult, Wallet, WalletStore};
