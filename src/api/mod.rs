// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ledger::{Asset, NetworkContext},
    models::{
        AccountResponse, AddAccountRequest, AssetBalance, CreateTestAccountRequest,
        NetworkResponse, RefreshSummary, ReserveAssetsResponse, SwitchNetworkRequest,
    },
    state::AppState,
};

pub mod accounts;
pub mod health;
pub mod network;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/network",
            get(network::get_network).put(network::switch_network),
        )
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::add_account),
        )
        .route("/accounts/refresh", post(accounts::refresh_balances))
        .route("/accounts/test", post(accounts::create_test_account))
        .route(
            "/accounts/by-name/{name}",
            get(accounts::get_account_by_name),
        )
        .route(
            "/accounts/{public_key}",
            get(accounts::get_account).delete(accounts::delete_account),
        )
        .route("/assets/reserve", get(accounts::reserve_assets))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        network::get_network,
        network::switch_network,
        accounts::list_accounts,
        accounts::add_account,
        accounts::get_account,
        accounts::get_account_by_name,
        accounts::delete_account,
        accounts::refresh_balances,
        accounts::create_test_account,
        accounts::reserve_assets
    ),
    components(
        schemas(
            AccountResponse,
            AssetBalance,
            Asset,
            NetworkContext,
            AddAccountRequest,
            CreateTestAccountRequest,
            NetworkResponse,
            SwitchNetworkRequest,
            ReserveAssetsResponse,
            RefreshSummary,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Network", description = "Test/public network context selection"),
        (name = "Accounts", description = "Account registry, balances and reserve assets")
    )
)]
struct ApiDoc;
