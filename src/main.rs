// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use custody_gateway::{
    api::router,
    config::{AppConfig, ConfigError, LogFormat, DEFAULT_LOG_FILTER},
    custodian::{CustodianClient, CustodianError, RequestSigner, SigningError},
    state::AppState,
    storage::{RedbWalletStore, StoreError},
};

/// How long in-flight requests may run once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid custodian secret key: {0}")]
    Signing(#[from] SigningError),

    #[error("failed to build custodian client: {0}")]
    Custodian(#[from] CustodianError),

    #[error("failed to open wallet database: {0}")]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or_default(),
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Custody gateway stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: Result<AppConfig, ConfigError>) -> Result<(), StartupError> {
    let config = config?;

    // Install the ring crypto provider for rustls before any TLS use. An Err
    // only means a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let signer = RequestSigner::from_rsa_pem(
        config.custodian_api_key.clone(),
        config.custodian_secret_key_pem.as_bytes(),
    )?;
    let custodian = CustodianClient::new(&config.custodian_base_url, signer)?;
    info!(base_url = %config.custodian_base_url, "Custodian client ready");

    let store = RedbWalletStore::open(&config.database_path)?;
    info!(path = %config.database_path.display(), "Wallet database opened");

    let app = router(AppState::new(store, custodian));

    let shutdown = CancellationToken::new();
    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(watch_shutdown(shutdown.clone(), handle.clone()));
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!("Custody gateway listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("Custody gateway listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("Custody gateway stopped");
    Ok(())
}

async fn watch_shutdown(shutdown: CancellationToken, handle: Handle<SocketAddr>) {
    shutdown.cancelled().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
