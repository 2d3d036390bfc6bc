// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AccountsError, ApiError},
    ledger::{KeyPair, StellarKeyPair},
    models::{
        AccountResponse, AddAccountRequest, CreateTestAccountRequest, RefreshSummary,
        ReserveAssetsResponse,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/accounts",
    tag = "Accounts",
    responses((status = 200, body = [AccountResponse]))
)]
pub async fn list_accounts(State(state): State<AppState>) -> Json<Vec<AccountResponse>> {
    let accounts = state.accounts.accounts();
    Json(accounts.into_iter().map(AccountResponse::from).collect())
}

#[utoipa::path(
    post,
    path = "/v1/accounts",
    request_body = AddAccountRequest,
    tag = "Accounts",
    responses(
        (status = 201, body = AccountResponse),
        (status = 400, description = "Malformed public key or secret"),
        (status = 409, description = "Account already exists")
    )
)]
pub async fn add_account(
    State(state): State<AppState>,
    Json(request): Json<AddAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let key_pair = StellarKeyPair::from_parts(request.public_key, request.secret)?;

    let account = state
        .accounts
        .add_account(&key_pair, request.name.as_deref(), request.tag.as_deref())?
        .ok_or_else(|| AccountsError::AlreadyExists(key_pair.public_key()))?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    get,
    path = "/v1/accounts/{public_key}",
    params(
        ("public_key" = String, Path, description = "Stellar public key of the account")
    ),
    tag = "Accounts",
    responses(
        (status = 200, body = AccountResponse),
        (status = 404, description = "No account with this public key")
    )
)]
pub async fn get_account(
    Path(public_key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .accounts
        .account_with_public_key(&public_key)
        .ok_or(AccountsError::NotFound(public_key))?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    get,
    path = "/v1/accounts/by-name/{name}",
    params(
        ("name" = String, Path, description = "Display name of the account")
    ),
    tag = "Accounts",
    responses(
        (status = 200, body = AccountResponse),
        (status = 404, description = "No account with this name")
    )
)]
pub async fn get_account_by_name(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .accounts
        .account_with_name(&name)
        .ok_or(AccountsError::NotFound(name))?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/accounts/{public_key}",
    params(
        ("public_key" = String, Path, description = "Public key of the account to delete")
    ),
    tag = "Accounts",
    responses((status = 204))
)]
pub async fn delete_account(
    Path(public_key): Path<String>,
    State(state): State<AppState>,
) -> StatusCode {
    state.accounts.delete_account(&public_key);
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/v1/accounts/refresh",
    tag = "Accounts",
    responses((status = 200, body = RefreshSummary))
)]
pub async fn refresh_balances(
    State(state): State<AppState>,
) -> Result<Json<RefreshSummary>, ApiError> {
    Ok(Json(state.accounts.refresh_balances().await?))
}

#[utoipa::path(
    post,
    path = "/v1/accounts/test",
    request_body = CreateTestAccountRequest,
    tag = "Accounts",
    responses(
        (status = 201, body = AccountResponse),
        (status = 409, description = "Not on the test network, or account already exists"),
        (status = 502, description = "Friendbot or Horizon unavailable")
    )
)]
pub async fn create_test_account(
    State(state): State<AppState>,
    Json(request): Json<CreateTestAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let key_pair = StellarKeyPair::from_parts(request.public_key, Some(request.secret))?;
    let account = state
        .accounts
        .create_test_account(&key_pair, request.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    get,
    path = "/v1/assets/reserve",
    tag = "Accounts",
    responses((status = 200, body = ReserveAssetsResponse))
)]
pub async fn reserve_assets(State(state): State<AppState>) -> Json<ReserveAssetsResponse> {
    Json(ReserveAssetsResponse {
        ethereum: state.accounts.ethereum_asset(),
        bitcoin: state.accounts.bitcoin_asset(),
        lambo_token: state.accounts.lambo_token_asset(),
    })
}
