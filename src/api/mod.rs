// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    custodian::CustodianApi,
    error::ErrorBody,
    models::{
        CreateWalletRequest, CreateWalletResponse, DepositAddressResponse,
        InitiateTransferRequest, InitiateTransferResponse, WalletBalanceResponse,
    },
    state::AppState,
    storage::WalletStore,
};

pub mod health;
pub mod wallets;

pub fn router<S, C>(state: AppState<S, C>) -> Router
where
    S: WalletStore + 'static,
    C: CustodianApi + 'static,
{
    let routes = Router::new()
        .route("/wallets", post(wallets::create_wallet::<S, C>))
        .route(
            "/wallets/{wallet_id}/assets/{asset_id}/balance",
            get(wallets::get_wallet_balance::<S, C>),
        )
        .route(
            "/wallets/{wallet_id}/assets/{asset_id}/address",
            get(wallets::get_deposit_address::<S, C>),
        )
        .route(
            "/wallets/{wallet_id}/transactions",
            post(wallets::initiate_transfer::<S, C>),
        )
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness::<S, C>))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        wallets::create_wallet,
        wallets::get_wallet_balance,
        wallets::get_deposit_address,
        wallets::initiate_transfer,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreateWalletRequest,
            CreateWalletResponse,
            WalletBalanceResponse,
            DepositAddressResponse,
            InitiateTransferRequest,
            InitiateTransferResponse,
            ErrorBody,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Wallets", description = "Custodial wallet operations"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
