// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{custodian::CustodianApi, storage::WalletStore};

/// Shared handler state. Holds no mutable in-process state of its own; the
/// store and client synchronize internally.
pub struct AppState<S, C> {
    pub store: Arc<S>,
    pub custodian: Arc<C>,
}

impl<S, C> AppState<S, C>
where
    S: WalletStore,
    C: CustodianApi,
{
    pub fn new(store: S, custodian: C) -> Self {
        Self {
            store: Arc::new(store),
            custodian: Arc::new(custodian),
        }
    }
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            custodian: Arc::clone(&self.custodian),
        }
    }
}
