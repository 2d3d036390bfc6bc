// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    error::{AccountsError, ApiError},
    ledger::NetworkContext,
    models::{NetworkResponse, SwitchNetworkRequest},
    state::AppState,
};

fn describe(state: &AppState, network: NetworkContext) -> Result<NetworkResponse, ApiError> {
    let horizon = state
        .accounts
        .horizon_for(network)
        .map_err(AccountsError::from)?;

    Ok(NetworkResponse {
        network,
        name: network.config().name.to_string(),
        horizon_url: horizon.horizon_url().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/network",
    tag = "Network",
    responses((status = 200, body = NetworkResponse))
)]
pub async fn get_network(
    State(state): State<AppState>,
) -> Result<Json<NetworkResponse>, ApiError> {
    let network = state.network.current();
    Ok(Json(describe(&state, network)?))
}

/// Switch the context every subsequent account call is routed to.
///
/// Requests already in flight keep the context they started with.
#[utoipa::path(
    put,
    path = "/v1/network",
    request_body = SwitchNetworkRequest,
    tag = "Network",
    responses((status = 200, body = NetworkResponse))
)]
pub async fn switch_network(
    State(state): State<AppState>,
    Json(request): Json<SwitchNetworkRequest>,
) -> Result<Json<NetworkResponse>, ApiError> {
    let previous = state.network.current();
    state.network.set(request.network);
    if previous != request.network {
        info!(from = %previous, to = %request.network, "Network context switched");
    }
    Ok(Json(describe(&state, request.network)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_to_test_network() {
        let Json(body) = get_network(State(AppState::default())).await.unwrap();

        assert_eq!(body.network, NetworkContext::Test);
        assert_eq!(body.name, "Stellar Test Network");
        assert!(body.horizon_url.starts_with("https://horizon-testnet.stellar.org"));
    }

    #[tokio::test]
    async fn switch_routes_subsequent_calls() {
        let state = AppState::default();

        let Json(body) = switch_network(
            State(state.clone()),
            Json(SwitchNetworkRequest {
                network: NetworkContext::Public,
            }),
        )
        .await
        .unwrap();

        assert_eq!(body.network, NetworkContext::Public);
        assert_eq!(state.accounts.current_network(), NetworkContext::Public);

        let Json(current) = get_network(State(state)).await.unwrap();
        assert_eq!(current.network, NetworkContext::Public);
        assert!(current.horizon_url.starts_with("https://horizon.stellar.org"));
    }
}
