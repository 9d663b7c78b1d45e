// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodian call errors.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::signing::SigningError;

/// Error body the custodian returns on non-200 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Custodian API error (code {code}): {message}")]
pub struct UpstreamError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CustodianError {
    /// The custodian answered with its typed `{code, message}` error body.
    #[error("{error}")]
    Api {
        status: StatusCode,
        #[source]
        error: UpstreamError,
    },

    /// Non-200 response whose body is not the typed error shape.
    #[error("unexpected API response: {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    /// 200 response whose body did not match the expected result.
    #[error("failed to parse response: {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to execute HTTP request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to marshal request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to sign JWT: {0}")]
    Signing(#[from] SigningError),

    #[error("invalid custodian base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A caller-supplied ID that cannot stand as a single path segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),
}

impl CustodianError {
    /// Upstream HTTP status, when a response was received at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. }
            | Self::UnexpectedResponse { status, .. }
            | Self::Decode { status, .. } => Some(*status),
            Self::Transport(_)
            | Self::Encode(_)
            | Self::Signing(_)
            | Self::InvalidBaseUrl { .. }
            | Self::InvalidPathSegment(_) => None,
        }
    }

    /// The typed custodian error, if the failure carried one.
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Upstream 4xx, or a request rejected locally because of caller input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPathSegment(_))
            || self.status().is_some_and(|s| s.is_client_error())
    }

    /// Classify a non-200 response body.
    ///
    /// A body counts as typed only when it carries both `code` and `message`;
    /// any other JSON object is kept as raw text. The caller-facing status
    /// folding does not depend on which variant is produced.
    pub(crate) fn from_error_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<UpstreamError>(body) {
            Ok(error) => Self::Api { status, error },
            Err(_) => Self::UnexpectedResponse {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}
