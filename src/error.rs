// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::{HorizonError, KeyPairError};
use crate::storage::SettingsError;

/// Errors surfaced by account service operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    #[error(transparent)]
    KeyPair(#[from] KeyPairError),

    #[error(transparent)]
    Horizon(#[from] HorizonError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Operation is only available on the test network")]
    TestNetworkOnly,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<AccountsError> for ApiError {
    fn from(e: AccountsError) -> Self {
        let message = e.to_string();
        match e {
            AccountsError::KeyPair(_) => Self::bad_request(message),
            AccountsError::AlreadyExists(_) | AccountsError::TestNetworkOnly => {
                Self::conflict(message)
            }
            AccountsError::NotFound(_) => Self::not_found(message),
            AccountsError::Horizon(HorizonError::InvalidUrl(_)) | AccountsError::Settings(_) => {
                Self::internal(message)
            }
            AccountsError::Horizon(_) => Self::bad_gateway(message),
        }
    }
}

impl From<KeyPairError> for ApiError {
    fn from(e: KeyPairError) -> Self {
        AccountsError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
