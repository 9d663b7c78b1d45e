// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet records and the store seam the handlers depend on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local wallet record mapping an internal ID to a custodian vault account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique wallet identifier (UUID)
    pub id: String,
    /// Display name given at creation
    pub name: String,
    /// Custodian vault-account ID; unique and never changed once set
    pub vault_account_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller when persisting a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    pub name: String,
    pub vault_account_id: String,
}

impl NewWallet {
    /// Assign an ID and timestamps.
    pub fn into_wallet(self) -> Wallet {
        let now = Utc::now();
        Wallet {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            vault_account_id: self.vault_account_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for wallet records. Create and read only; there is no update
/// or delete path.
pub trait WalletStore: Send + Sync {
    /// Persist a new wallet. Fails with [`StoreError::Conflict`] if the vault
    /// account is already mapped.
    fn create(&self, wallet: NewWallet) -> StoreResult<Wallet>;

    /// Look up a wallet by its internal ID.
    fn get(&self, wallet_id: &str) -> StoreResult<Wallet>;

    /// Cheap round-trip used by the readiness probe.
    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
