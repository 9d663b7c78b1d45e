// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded wallet database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallets`: wallet_id → serialized Wallet (JSON bytes)
//! - `vault_account_index`: vault_account_id → wallet_id
//!
//! Both tables are written in the same write transaction; the index is what
//! keeps `vault_account_id` unique.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::wallets::{NewWallet, StoreError, StoreResult, Wallet, WalletStore};

const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

const VAULT_ACCOUNT_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("vault_account_index");

pub struct RedbWalletStore {
    db: Database,
}

impl RedbWalletStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Other(format!("failed to create {}: {e}", parent.display())))?;
        }
        let db = Database::create(path)?;

        // Pre-create tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(VAULT_ACCOUNT_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl WalletStore for RedbWalletStore {
    fn create(&self, new_wallet: NewWallet) -> StoreResult<Wallet> {
        let wallet = new_wallet.into_wallet();
        let json = serde_json::to_vec(&wallet)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut index = write_txn.open_table(VAULT_ACCOUNT_INDEX)?;
            if index.get(wallet.vault_account_id.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "Vault account {}",
                    wallet.vault_account_id
                )));
            }
            index.insert(wallet.vault_account_id.as_str(), wallet.id.as_str())?;

            let mut wallets = write_txn.open_table(WALLETS)?;
            wallets.insert(wallet.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(wallet)
    }

    fn get(&self, wallet_id: &str) -> StoreResult<Wallet> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS)?;
        match table.get(wallet_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Wallet {wallet_id}"))),
        }
    }

    fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(WALLETS)?;
        Ok(())
    }
}

#[cfg(test)]
impl RedbWalletStore {
    /// Number of stored wallets.
    fn len(&self) -> StoreResult<u64> {
        use redb::ReadableTableMetadata;

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS)?;
        Ok(table.len()?)
    }

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Resolve a custodian vault account back to its wallet.
    fn get_by_vault_account(&self, vault_account_id: &str) -> StoreResult<Wallet> {
        let wallet_id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(VAULT_ACCOUNT_INDEX)?;
            match index.get(vault_account_id)? {
                Some(v) => v.value().to_string(),
                None => {
                    return Err(StoreError::NotFound(format!(
                        "Vault account {vault_account_id}"
                    )))
                }
            }
        };
        self.get(&wallet_id)
    }
}
