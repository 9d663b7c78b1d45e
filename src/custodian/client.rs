// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the custodian REST API.

use std::{future::Future, time::Duration};

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use super::error::CustodianError;
use super::signing::RequestSigner;
use super::types::{
    AddressPage, AssetBalance, CreateTransactionRequest, CreateVaultAccountRequest,
    CreatedTransaction, VaultAccount,
};

/// Overall timeout applied to every custodian call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Operations the wallet handlers need from the custodian.
///
/// Each method performs exactly one signed HTTP call. Errors keep the
/// upstream status whenever a response was received.
pub trait CustodianApi: Send + Sync {
    fn create_vault_account(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<VaultAccount, CustodianError>> + Send;

    fn get_asset_balance(
        &self,
        vault_account_id: &str,
        asset_id: &str,
    ) -> impl Future<Output = Result<AssetBalance, CustodianError>> + Send;

    fn get_asset_addresses(
        &self,
        vault_account_id: &str,
        asset_id: &str,
    ) -> impl Future<Output = Result<AddressPage, CustodianError>> + Send;

    fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> impl Future<Output = Result<CreatedTransaction, CustodianError>> + Send;
}

#[derive(Debug, Clone)]
pub struct CustodianClient {
    base_url: Url,
    /// Path of `base_url` without a trailing slash; stripped from the signed `uri`.
    base_path: String,
    signer: RequestSigner,
    http: Client,
}

impl CustodianClient {
    pub fn new(base_url: &str, signer: RequestSigner) -> Result<Self, CustodianError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_http_client(base_url, signer, http)
    }

    pub fn with_http_client(
        base_url: &str,
        signer: RequestSigner,
        http: Client,
    ) -> Result<Self, CustodianError> {
        let invalid = |reason: String| CustodianError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_string()));
        }
        let base_path = base_url.path().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            base_path,
            signer,
            http,
        })
    }

    /// Resolve an endpoint from raw path segments.
    ///
    /// Each segment is percent-encoded on its own, so caller-supplied IDs can
    /// neither add a query string nor walk to another endpoint. Returns the
    /// full URL and the path that gets signed, which is the URL's path with
    /// the base path removed.
    fn endpoint(&self, segments: &[&str]) -> Result<(Url, String), CustodianError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(CustodianError::InvalidPathSegment((*bad).to_string()));
        }

        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| CustodianError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        let path = url
            .path()
            .strip_prefix(self.base_path.as_str())
            .unwrap_or(url.path())
            .to_string();
        Ok((url, path))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&impl Serialize>,
    ) -> Result<T, CustodianError> {
        let (status, bytes) = self.send(method, segments, body).await?;

        if status != StatusCode::OK {
            return Err(CustodianError::from_error_body(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|source| CustodianError::Decode { status, source })
    }

    /// Sign and send one request, returning the raw status and body.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&impl Serialize>,
    ) -> Result<(StatusCode, Vec<u8>), CustodianError> {
        let (url, path) = self.endpoint(segments)?;

        // The digest in the token must cover exactly the bytes on the wire.
        let body_bytes = match body {
            Some(payload) => serde_json::to_vec(payload).map_err(CustodianError::Encode)?,
            None => Vec::new(),
        };

        let token = self.signer.sign(&path, &body_bytes)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(API_KEY_HEADER, self.signer.api_key());

        if method == Method::POST {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body_bytes);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(%method, %path, status = status.as_u16(), "custodian call completed");

        Ok((status, bytes.to_vec()))
    }
}

/// Serialize-able stand-in for body-less calls.
const NO_BODY: Option<&()> = None;

impl CustodianApi for CustodianClient {
    async fn create_vault_account(&self, name: &str) -> Result<VaultAccount, CustodianError> {
        let request = CreateVaultAccountRequest {
            name: name.to_string(),
        };
        self.call(Method::POST, &["v1", "vault", "accounts"], Some(&request))
            .await
    }

    async fn get_asset_balance(
        &self,
        vault_account_id: &str,
        asset_id: &str,
    ) -> Result<AssetBalance, CustodianError> {
        self.call(
            Method::GET,
            &["v1", "vault", "accounts", vault_account_id, asset_id],
            NO_BODY,
        )
        .await
    }

    async fn get_asset_addresses(
        &self,
        vault_account_id: &str,
        asset_id: &str,
    ) -> Result<AddressPage, CustodianError> {
        self.call(
            Method::GET,
            &[
                "v1",
                "vault",
                "accounts",
                vault_account_id,
                asset_id,
                "addresses_paginated",
            ],
            NO_BODY,
        )
        .await
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<CreatedTransaction, CustodianError> {
        self.call(Method::POST, &["v1", "transactions"], Some(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use axum::{
        body::Bytes,
        http::{HeaderMap, StatusCode as AxumStatus, Uri},
        response::IntoResponse,
        Router,
    };

    use super::*;
    use crate::custodian::signing::{
        body_digest_hex,
        tests::{decode_claims, test_signer},
    };

    #[derive(Debug, Clone, Default)]
    struct Seen {
        method: String,
        path: String,
        query: Option<String>,
        authorization: Option<String>,
        api_key: Option<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    /// Spawn a local server answering every request with `status` and `body`,
    /// recording the last request it saw.
    async fn mock_custodian(
        status: u16,
        body: &'static str,
    ) -> (String, Arc<Mutex<Option<Seen>>>) {
        let seen = Arc::new(Mutex::new(None));
        let recorder = seen.clone();

        let app = Router::new().fallback(
            move |method: axum::http::Method, uri: Uri, headers: HeaderMap, bytes: Bytes| {
                let recorder = recorder.clone();
                async move {
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    *recorder.lock().unwrap() = Some(Seen {
                        method: method.to_string(),
                        path: uri.path().to_string(),
                        query: uri.query().map(str::to_string),
                        authorization: header("authorization"),
                        api_key: header("x-api-key"),
                        content_type: header("content-type"),
                        body: bytes.to_vec(),
                    });
                    (AxumStatus::from_u16(status).unwrap(), body).into_response()
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn client(base_url: &str) -> CustodianClient {
        CustodianClient::new(base_url, test_signer()).unwrap()
    }

    fn seen(recorder: &Arc<Mutex<Option<Seen>>>) -> Seen {
        recorder.lock().unwrap().clone().expect("request reached mock")
    }

    #[tokio::test]
    async fn create_vault_account_success() {
        let (url, recorder) = mock_custodian(200, r#"{"id":"123","name":"Test"}"#).await;

        let account = client(&url).create_vault_account("Test").await.unwrap();

        assert_eq!(account.id, "123");
        assert_eq!(account.name, "Test");

        let request = seen(&recorder);
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/v1/vault/accounts");
        assert_eq!(request.api_key.as_deref(), Some("test-api-key"));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert_eq!(request.body, br#"{"name":"Test"}"#);
    }

    #[tokio::test]
    async fn token_body_hash_matches_bytes_on_the_wire() {
        let (url, recorder) = mock_custodian(200, r#"{"id":"tx-1","status":"SUBMITTED"}"#).await;
        let transfer = CreateTransactionRequest::vault_transfer(
            "BTC_TEST",
            "7",
            "tb1qdest",
            "0.0005",
            Some("payout".to_string()),
        );

        let created = client(&url).create_transaction(&transfer).await.unwrap();
        assert_eq!(created.id, "tx-1");
        assert_eq!(created.status, "SUBMITTED");

        let request = seen(&recorder);
        let token = request
            .authorization
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
            .expect("bearer token");
        let claims = decode_claims(token);

        assert_eq!(claims.uri, "/v1/transactions");
        assert_eq!(claims.body_hash, body_digest_hex(&request.body));
        let sent: CreateTransactionRequest = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(sent, transfer);
    }

    #[tokio::test]
    async fn get_requests_sign_the_empty_body() {
        let (url, recorder) = mock_custodian(
            200,
            r#"{"id":"BTC_TEST","total":"0.0003368","balance":"0.0003368","available":"0.0003368","pending":"0","frozen":"0","lockedAmount":"0","staked":"0","blockHeight":"4443168"}"#,
        )
        .await;

        let balance = client(&url)
            .get_asset_balance("123", "BTC_TEST")
            .await
            .unwrap();
        assert_eq!(balance.available, "0.0003368");
        assert_eq!(balance.block_height, "4443168");

        let request = seen(&recorder);
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/v1/vault/accounts/123/BTC_TEST");
        assert!(request.body.is_empty());
        assert!(request.content_type.is_none());

        let token = request.authorization.unwrap();
        let claims = decode_claims(token.trim_start_matches("Bearer "));
        assert_eq!(claims.uri, "/v1/vault/accounts/123/BTC_TEST");
        assert_eq!(claims.body_hash, body_digest_hex(b""));
    }

    #[tokio::test]
    async fn addresses_hit_paginated_endpoint() {
        let (url, recorder) = mock_custodian(
            200,
            r#"{"addresses":[{"assetId":"BTC_TEST","address":"tb1first","type":"Permanent","addressFormat":"SEGWIT"}],"paging":{}}"#,
        )
        .await;

        let page = client(&url)
            .get_asset_addresses("123", "BTC_TEST")
            .await
            .unwrap();

        assert_eq!(page.addresses.len(), 1);
        assert_eq!(
            seen(&recorder).path,
            "/v1/vault/accounts/123/BTC_TEST/addresses_paginated"
        );
    }

    #[tokio::test]
    async fn typed_error_keeps_status_and_code() {
        let (url, _) = mock_custodian(401, r#"{"code":-3,"message":"Unauthorized"}"#).await;

        let err = client(&url).create_vault_account("Test").await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("Unauthorized"));
        assert_eq!(err.upstream().map(|e| e.code), Some(-3));
    }

    #[tokio::test]
    async fn not_found_error_message_is_preserved() {
        let (url, _) = mock_custodian(
            404,
            r#"{"code":11001,"message":"The Provided Vault Account ID is invalid: invalid_account_id"}"#,
        )
        .await;

        let err = client(&url)
            .get_asset_balance("invalid_account_id", "BTC_TEST")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        let upstream = err.upstream().expect("typed error");
        assert_eq!(upstream.code, 11001);
        assert_eq!(
            upstream.message,
            "The Provided Vault Account ID is invalid: invalid_account_id"
        );
    }

    #[tokio::test]
    async fn html_error_page_is_unexpected_response() {
        let (url, _) = mock_custodian(500, "<html><body>Internal Server Error</body></html>").await;

        let err = client(&url)
            .get_asset_balance("123", "BTC_TEST")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.upstream().is_none());
        assert!(err.to_string().contains("unexpected API response"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let (url, _) = mock_custodian(200, "not json").await;

        let err = client(&url).create_vault_account("Test").await.unwrap_err();

        assert!(matches!(err, CustodianError::Decode { .. }));
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn connection_failure_has_no_status() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .create_vault_account("Test")
            .await
            .unwrap_err();

        assert!(matches!(err, CustodianError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn endpoint_joins_segments_onto_base_url() {
        let (url, path) = client("https://custodian.example.com/")
            .endpoint(&["v1", "transactions"])
            .unwrap();
        assert_eq!(url.as_str(), "https://custodian.example.com/v1/transactions");
        assert_eq!(path, "/v1/transactions");

        let (url, path) = client("https://gateway.example.com/custody/")
            .endpoint(&["v1", "vault", "accounts"])
            .unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.com/custody/v1/vault/accounts");
        assert_eq!(path, "/v1/vault/accounts");
    }

    #[test]
    fn endpoint_rejects_dot_and_empty_segments() {
        let client = client("https://custodian.example.com");
        for bad in ["", ".", ".."] {
            let err = client.endpoint(&["v1", "vault", "accounts", "7", bad]).unwrap_err();
            assert!(matches!(err, CustodianError::InvalidPathSegment(_)));
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        for base in ["not a url", "mailto:ops@custodian.example.com"] {
            let err = CustodianClient::new(base, test_signer()).unwrap_err();
            assert!(matches!(err, CustodianError::InvalidBaseUrl { .. }));
        }
    }

    #[tokio::test]
    async fn ids_cannot_inject_query_or_traverse() {
        let body = r#"{"id":"BTC_TEST","available":"1"}"#;

        let (url, recorder) = mock_custodian(200, body).await;
        client(&url)
            .get_asset_balance("7", "BTC?limit=1")
            .await
            .unwrap();
        let request = seen(&recorder);
        assert_eq!(request.path, "/v1/vault/accounts/7/BTC%3Flimit=1");
        assert_eq!(request.query, None);
        let claims = decode_claims(request.authorization.unwrap().trim_start_matches("Bearer "));
        assert_eq!(claims.uri, request.path);

        let (url, recorder) = mock_custodian(200, body).await;
        client(&url)
            .get_asset_balance("7", "../../../transactions")
            .await
            .unwrap();
        let request = seen(&recorder);
        assert_eq!(
            request.path,
            "/v1/vault/accounts/7/..%2F..%2F..%2Ftransactions"
        );
        let claims = decode_claims(request.authorization.unwrap().trim_start_matches("Bearer "));
        assert_eq!(claims.uri, request.path);

        let (url, recorder) = mock_custodian(200, r#"{"addresses":[]}"#).await;
        let err = client(&url)
            .get_asset_addresses("7", "..")
            .await
            .unwrap_err();
        assert!(matches!(err, CustodianError::InvalidPathSegment(_)));
        assert!(recorder.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn non_200_success_status_is_still_an_error() {
        let (url, _) = mock_custodian(201, r#"{"id":"123","name":"Test"}"#).await;

        let err = client(&url).create_vault_account("Test").await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::CREATED));
        assert!(matches!(err, CustodianError::UnexpectedResponse { .. }));
    }
}
