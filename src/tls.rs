// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Optional HTTPS termination with rustls.

use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

use crate::config::TlsPaths;

/// Load a PEM certificate chain and private key into a rustls server config.
///
/// Installs the ring crypto provider first; a provider installed earlier in
/// the process is left in place.
pub async fn load_tls_config(paths: &TlsPaths) -> std::io::Result<RustlsConfig> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
    info!(cert = %paths.cert.display(), "Loaded TLS certificate");
    Ok(config)
}
