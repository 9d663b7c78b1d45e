// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody Gateway - Custodial Wallet Gateway Service
//!
//! A thin REST front for a digital-asset custody API. Each local wallet maps
//! to one custodian vault account; balances, deposit addresses, and transfers
//! are fetched from or submitted to the custodian on demand.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `custodian` - signed custodian API client
//! - `config` - environment configuration
//! - `storage` - wallet records (redb)

pub mod api;
pub mod config;
pub mod custodian;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
