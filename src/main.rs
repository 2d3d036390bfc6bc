// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stellar_account_manager::{
    accounts::NetworkSwitch,
    api::router,
    balance_poller::BalancePoller,
    config::ServiceConfig,
    state::AppState,
    storage::{FileSettingsStore, SettingsPaths, SettingsWatcher},
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = ServiceConfig::from_env().expect("Invalid configuration");
    init_tracing(config.json_logs);

    // Settings storage (TestAccounts / PublicAccounts lists)
    let mut store = FileSettingsStore::new(SettingsPaths::new(&config.data_dir));
    store
        .initialize()
        .expect("Failed to initialize settings directory");
    let store = Arc::new(store);
    info!(data_dir = %config.data_dir.display(), "Settings storage ready");

    let network = NetworkSwitch::new(config.network);
    let state = AppState::with_file_store(store.clone(), network, config.service.clone());
    let service = state.accounts.clone();

    // Background tasks
    let shutdown = CancellationToken::new();

    let watcher = SettingsWatcher::new(store).with_interval(config.settings_poll);
    tokio::spawn(watcher.run(shutdown.clone()));

    if let Some(interval) = config.balance_refresh {
        let poller = BalancePoller::new(service.clone()).with_interval(interval);
        tokio::spawn(poller.run(shutdown.clone()));
    } else {
        info!("Balance refresh disabled");
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(
        %addr,
        network = %config.network,
        "Stellar account manager listening (docs at /docs)"
    );

    let server = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server failed");
    }

    shutdown.cancel();

    // Pending debounced writes would otherwise be lost.
    match service.flush() {
        Ok(()) => info!("Account lists flushed"),
        Err(e) => error!(error = %e, "Failed to flush account lists"),
    }
}
