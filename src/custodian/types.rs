// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types for the custodian REST API.
//!
//! Field names follow the custodian's camelCase JSON. Amounts and balances
//! are decimal strings and are passed through untouched.

use serde::{Deserialize, Serialize};

pub const OPERATION_TRANSFER: &str = "TRANSFER";
pub const PEER_VAULT_ACCOUNT: &str = "VAULT_ACCOUNT";
pub const PEER_ONE_TIME_ADDRESS: &str = "ONE_TIME_ADDRESS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateVaultAccountRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultAccount {
    pub id: String,
    pub name: String,
}

/// Balance of one asset inside a vault account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub id: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub pending: String,
    #[serde(default)]
    pub frozen: String,
    #[serde(default)]
    pub locked_amount: String,
    #[serde(default)]
    pub staked: String,
    #[serde(default)]
    pub block_height: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    pub asset_id: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub address_type: String,
    #[serde(default)]
    pub address_format: String,
    #[serde(default)]
    pub legacy_address: String,
    #[serde(default)]
    pub enterprise_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bip44_address_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// One page of deposit addresses, in the order the custodian returned them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressPage {
    #[serde(default)]
    pub addresses: Vec<DepositAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferPeer {
    #[serde(rename = "type")]
    pub peer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "oneTimeAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub one_time_address: Option<OneTimeAddress>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OneTimeAddress {
    pub address: String,
}

/// Body of `POST /v1/transactions`.
///
/// Only the vault-account → one-time-address transfer is ever built; use
/// [`CreateTransactionRequest::vault_transfer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub operation: String,
    pub asset_id: String,
    pub source: TransferPeer,
    pub destination: TransferPeer,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CreateTransactionRequest {
    pub fn vault_transfer(
        asset_id: impl Into<String>,
        vault_account_id: impl Into<String>,
        destination_address: impl Into<String>,
        amount: impl Into<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            operation: OPERATION_TRANSFER.to_string(),
            asset_id: asset_id.into(),
            source: TransferPeer {
                peer_type: PEER_VAULT_ACCOUNT.to_string(),
                id: Some(vault_account_id.into()),
                one_time_address: None,
            },
            destination: TransferPeer {
                peer_type: PEER_ONE_TIME_ADDRESS.to_string(),
                id: None,
                one_time_address: Some(OneTimeAddress {
                    address: destination_address.into(),
                }),
            },
            amount: amount.into(),
            note: note.filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedTransaction {
    pub id: String,
    pub status: String,
}
