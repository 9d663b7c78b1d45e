// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodian integration.
//!
//! - `signing` - per-request RS256 tokens bound to path and body digest
//! - `client` - signed HTTP calls and response classification
//! - `types` - request/response wire shapes
//! - `error` - typed upstream errors and transport failures

pub mod client;
pub mod error;
pub mod signing;
pub mod types;

pub use client::{CustodianApi, CustodianClient, API_KEY_HEADER, REQUEST_TIMEOUT};
pub use error::{CustodianError, UpstreamError};
pub use signing::{RequestClaims, RequestSigner, SigningError, TOKEN_TTL_SECS};
pub use types::{
    AddressPage, AssetBalance, CreateTransactionRequest, CreatedTransaction, DepositAddress,
    VaultAccount,
};
