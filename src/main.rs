// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use axum_server::Handle;
use chrono::TimeDelta;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use certifier_server::{
    api::router,
    config::{Config, ConfigError, LogFormat},
    sdk::{HttpRelayClient, HttpWalletProvider, SdkError},
    session::{SessionRegistry, SessionSweeper},
    state::AppState,
    storage::{CertificationStore, StorageError},
    tls::load_tls_config,
};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("session timeout out of range: {0:?}")]
    SessionTimeout(Duration),

    #[error("failed to open certification store: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to build SDK client: {0}")]
    Sdk(#[from] SdkError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // LOG_FORMAT may be the invalid value, so fall back to the default format.
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    std::fs::create_dir_all(&config.data_dir)?;
    let store = CertificationStore::open(&config.database_path())?;
    info!(
        path = %config.database_path().display(),
        certified_users = store.count()?,
        "Certification store opened"
    );

    let session_timeout = TimeDelta::from_std(config.session_timeout)
        .map_err(|_| StartupError::SessionTimeout(config.session_timeout))?;

    let wallets = Arc::new(HttpWalletProvider::new(config.wallet_api_url.clone())?);
    let relay = Arc::new(HttpRelayClient::new(
        config.relay_bridge_url.clone(),
        config.messagebox_host.clone(),
    )?);
    let sessions = Arc::new(SessionRegistry::new(wallets.clone()).with_timeout(session_timeout));

    let state = AppState::new(Arc::new(store), sessions.clone(), wallets, relay)
        .with_messagebox_host(config.messagebox_host.clone());
    let app = router(state);

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(
        SessionSweeper::new(sessions)
            .with_interval(config.sweep_interval)
            .run(shutdown.clone()),
    );

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections");
            shutdown.cancel();
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(paths) => {
            let tls = load_tls_config(paths).await?;
            info!(%addr, relay_host = %config.messagebox_host, "Certifier listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, relay_host = %config.messagebox_host, "Certifier listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "Session sweeper task failed");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
