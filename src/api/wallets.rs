// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet API endpoints.
//!
//! Each handler is one linear sequence: at most one store read, one or two
//! custodian calls, and a store write only on creation. Upstream failures are
//! folded by [`ApiError::from_custodian`] and logged in full here.

use std::cmp::Ordering;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, warn};

use crate::{
    custodian::{CreateTransactionRequest, CustodianApi},
    error::{ApiError, ErrorBody},
    models::{
        CreateWalletRequest, CreateWalletResponse, DepositAddressResponse,
        InitiateTransferRequest, InitiateTransferResponse, WalletBalanceResponse,
    },
    state::AppState,
    storage::{NewWallet, Wallet, WalletStore},
};

/// Create a wallet backed by a new custodian vault account.
#[utoipa::path(
    post,
    path = "/wallets",
    tag = "Wallets",
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet created", body = CreateWalletResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Custodian or storage failure", body = ErrorBody)
    )
)]
pub async fn create_wallet<S, C>(
    State(state): State<AppState<S, C>>,
    payload: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateWalletResponse>), ApiError>
where
    S: WalletStore + 'static,
    C: CustodianApi + 'static,
{
    let Json(request) = payload?;

    if request.name.is_empty() {
        return Err(ApiError::bad_request("Wallet name is required"));
    }

    let account = state
        .custodian
        .create_vault_account(&request.name)
        .await
        .map_err(|e| {
            error!(error = %e, status = ?e.status(), "Failed to create custodian vault account");
            ApiError::from_custodian(&e)
        })?;

    let wallet = state
        .store
        .create(NewWallet {
            name: request.name,
            vault_account_id: account.id.clone(),
        })
        .map_err(|e| {
            error!(error = %e, vault_account_id = %account.id, "Failed to create wallet");
            ApiError::internal("Failed to create wallet")
        })?;

    info!(wallet_id = %wallet.id, vault_account_id = %wallet.vault_account_id, "Wallet created");

    Ok((
        StatusCode::CREATED,
        Json(CreateWalletResponse {
            id: wallet.id,
            name: account.name,
            vault_account_id: account.id,
        }),
    ))
}

/// Get the custodian balance of one asset in a wallet.
#[utoipa::path(
    get,
    path = "/wallets/{wallet_id}/assets/{asset_id}/balance",
    tag = "Wallets",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID"),
        ("asset_id" = String, Path, description = "Custodian asset ID")
    ),
    responses(
        (status = 200, description = "Asset balance", body = WalletBalanceResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Wallet not found", body = ErrorBody),
        (status = 500, description = "Service unavailable", body = ErrorBody)
    )
)]
pub async fn get_wallet_balance<S, C>(
    State(state): State<AppState<S, C>>,
    Path((wallet_id, asset_id)): Path<(String, String)>,
) -> Result<Json<WalletBalanceResponse>, ApiError>
where
    S: WalletStore + 'static,
    C: CustodianApi + 'static,
{
    let wallet = lookup_wallet(state.store.as_ref(), &wallet_id)?;

    let balance = state
        .custodian
        .get_asset_balance(&wallet.vault_account_id, &asset_id)
        .await
        .map_err(|e| {
            error!(error = %e, status = ?e.status(), %wallet_id, %asset_id, "Failed to get balance from custodian");
            ApiError::from_custodian(&e)
        })?;

    Ok(Json(WalletBalanceResponse::from(balance)))
}

/// Get the first deposit address the custodian lists for an asset.
#[utoipa::path(
    get,
    path = "/wallets/{wallet_id}/assets/{asset_id}/address",
    tag = "Wallets",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID"),
        ("asset_id" = String, Path, description = "Custodian asset ID")
    ),
    responses(
        (status = 200, description = "Deposit address", body = DepositAddressResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Wallet not found or no address available", body = ErrorBody),
        (status = 500, description = "Service unavailable", body = ErrorBody)
    )
)]
pub async fn get_deposit_address<S, C>(
    State(state): State<AppState<S, C>>,
    Path((wallet_id, asset_id)): Path<(String, String)>,
) -> Result<Json<DepositAddressResponse>, ApiError>
where
    S: WalletStore + 'static,
    C: CustodianApi + 'static,
{
    let wallet = lookup_wallet(state.store.as_ref(), &wallet_id)?;

    let page = state
        .custodian
        .get_asset_addresses(&wallet.vault_account_id, &asset_id)
        .await
        .map_err(|e| {
            error!(error = %e, status = ?e.status(), %wallet_id, %asset_id, "Failed to get addresses from custodian");
            ApiError::from_custodian(&e)
        })?;

    // No preference over address type or format: the first listed wins.
    let Some(first) = page.addresses.into_iter().next() else {
        warn!(vault_account_id = %wallet.vault_account_id, %asset_id, "No addresses found");
        return Err(ApiError::not_found("No deposit address available"));
    };

    Ok(Json(DepositAddressResponse::from(first)))
}

/// Transfer an asset from the wallet's vault account to a one-time address.
///
/// The balance check is advisory: funds are not reserved between the check
/// and the transfer, so concurrent transfers can still overdraw upstream.
#[utoipa::path(
    post,
    path = "/wallets/{wallet_id}/transactions",
    tag = "Wallets",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID")
    ),
    request_body = InitiateTransferRequest,
    responses(
        (status = 201, description = "Transfer submitted", body = InitiateTransferResponse),
        (status = 400, description = "Validation failure or insufficient balance", body = ErrorBody),
        (status = 404, description = "Wallet not found", body = ErrorBody),
        (status = 500, description = "Service unavailable", body = ErrorBody)
    )
)]
pub async fn initiate_transfer<S, C>(
    State(state): State<AppState<S, C>>,
    Path(wallet_id): Path<String>,
    payload: Result<Json<InitiateTransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InitiateTransferResponse>), ApiError>
where
    S: WalletStore + 'static,
    C: CustodianApi + 'static,
{
    let Json(request) = payload?;

    if request.asset_id.is_empty() {
        return Err(ApiError::bad_request("Asset ID is required"));
    }
    if request.amount.is_empty() {
        return Err(ApiError::bad_request("Amount is required"));
    }
    if request.destination_address.is_empty() {
        return Err(ApiError::bad_request("Destination address is required"));
    }

    let wallet = lookup_wallet(state.store.as_ref(), &wallet_id)?;

    info!(%wallet_id, asset_id = %request.asset_id, "Validating balance");
    let balance = state
        .custodian
        .get_asset_balance(&wallet.vault_account_id, &request.asset_id)
        .await
        .map_err(|e| {
            error!(error = %e, status = ?e.status(), %wallet_id, "Failed to get balance for validation");
            ApiError::from_custodian(&e)
        })?;

    let Some(available) = DecimalAmount::parse(&balance.available) else {
        error!(available = %balance.available, "Invalid balance format from custodian");
        return Err(ApiError::internal("Unable to validate balance"));
    };

    let Some(amount) = DecimalAmount::parse(&request.amount).filter(|a| !a.is_zero()) else {
        return Err(ApiError::bad_request("Invalid amount format"));
    };

    if amount > available {
        info!(requested = %request.amount, available = %balance.available, %wallet_id, "Insufficient balance");
        return Err(ApiError::bad_request("Insufficient balance"));
    }

    let transfer = CreateTransactionRequest::vault_transfer(
        request.asset_id.clone(),
        wallet.vault_account_id.clone(),
        request.destination_address.clone(),
        request.amount.clone(),
        request.note.clone(),
    );

    let created = state
        .custodian
        .create_transaction(&transfer)
        .await
        .map_err(|e| {
            error!(error = %e, status = ?e.status(), %wallet_id, "Failed to create custodian transaction");
            ApiError::from_custodian(&e)
        })?;

    info!(%wallet_id, transaction_id = %created.id, status = %created.status, "Transfer submitted");

    Ok((
        StatusCode::CREATED,
        Json(InitiateTransferResponse {
            transaction_id: created.id,
            status: created.status,
            asset_id: request.asset_id,
            amount: request.amount,
            destination_address: request.destination_address,
            note: request.note,
        }),
    ))
}

fn lookup_wallet<S: WalletStore>(store: &S, wallet_id: &str) -> Result<Wallet, ApiError> {
    store.get(wallet_id).map_err(|e| {
        if !matches!(e, crate::storage::StoreError::NotFound(_)) {
            error!(error = %e, %wallet_id, "Failed to get wallet");
        }
        ApiError::from_wallet_lookup(&e)
    })
}

/// Non-negative decimal written as `digits[.digits]`.
///
/// Kept as normalized digit strings (no leading zeros in the whole part, no
/// trailing zeros in the fraction) so ordering is exact at any precision.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecimalAmount {
    whole: String,
    fraction: String,
}

impl DecimalAmount {
    /// Signs, exponents and surrounding whitespace are rejected.
    fn parse(raw: &str) -> Option<Self> {
        let (whole, fraction) = match raw.split_once('.') {
            Some((_, "")) => return None,
            Some(parts) => parts,
            None => (raw, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return None;
        }

        let whole = whole.trim_start_matches('0');
        Some(Self {
            whole: if whole.is_empty() { "0" } else { whole }.to_string(),
            fraction: fraction.trim_end_matches('0').to_string(),
        })
    }

    fn is_zero(&self) -> bool {
        self.whole == "0" && self.fraction.is_empty()
    }
}

impl Ord for DecimalAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.whole
            .len()
            .cmp(&other.whole.len())
            .then_with(|| self.whole.cmp(&other.whole))
            .then_with(|| self.fraction.cmp(&other.fraction))
    }
}

impl PartialOrd for DecimalAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
