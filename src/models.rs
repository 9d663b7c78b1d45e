// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the wallet API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation. Field names are camelCase on the wire.
//!
//! Request fields default to empty so that a missing field is reported by
//! the handler's own validation message rather than a generic decode error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::custodian::{AssetBalance, DepositAddress};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWalletResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "vaultAccountID")]
    pub vault_account_id: String,
}

/// Asset balance as exposed to callers (block height is not included).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceResponse {
    pub id: String,
    pub total: String,
    pub balance: String,
    pub available: String,
    pub pending: String,
    pub frozen: String,
    pub locked_amount: String,
    pub staked: String,
}

impl From<AssetBalance> for WalletBalanceResponse {
    fn from(b: AssetBalance) -> Self {
        Self {
            id: b.id,
            total: b.total,
            balance: b.balance,
            available: b.available,
            pending: b.pending,
            frozen: b.frozen,
            locked_amount: b.locked_amount,
            staked: b.staked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressResponse {
    pub asset_id: String,
    pub address: String,
    pub address_format: String,
    #[serde(rename = "type")]
    pub address_type: String,
}

impl From<DepositAddress> for DepositAddressResponse {
    fn from(a: DepositAddress) -> Self {
        Self {
            asset_id: a.asset_id,
            address: a.address,
            address_format: a.address_format,
            address_type: a.address_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateTransferRequest {
    #[serde(default)]
    pub asset_id: String,
    /// Decimal string, forwarded to the custodian unchanged.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub destination_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateTransferResponse {
    pub transaction_id: String,
    pub status: String,
    pub asset_id: String,
    pub amount: String,
    pub destination_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
