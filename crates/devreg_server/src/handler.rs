//! Request handlers for the account endpoints.

use crate::api::{AccountRequest, AccountResponse, RegisterDeviceRequest};
use crate::error::{ServerError, ServerResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use devreg_core::{AccountStore, Device, StoreError};
use std::sync::Arc;
use tracing::{debug, error, info};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The account/device store.
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    /// Creates handler state around a store.
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

/// Builds the API router without middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/v1/accounts/{account}/validate",
            post(check_subscription_handler),
        )
        .route("/v1/accounts/{account}", get(account_handler))
        .route("/v1/accounts/{account}/devices", get(devices_handler))
        .route(
            "/v1/accounts/{account}/devices/{device}",
            get(device_handler),
        )
        .route("/v1/accounts/{account}/device", put(register_device_handler))
        .with_state(state)
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}

/// Returns 200 if the account id and key form an active subscription.
async fn check_subscription_handler(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> ServerResult<StatusCode> {
    let request = parse_body(body)?;
    authorize(state.store.as_ref(), &account_id, &request.key)?;

    debug!(%account_id, "account is active");
    Ok(StatusCode::OK)
}

async fn account_handler(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> ServerResult<Json<AccountResponse>> {
    let request = parse_body(body)?;
    authorize(state.store.as_ref(), &account_id, &request.key)?;

    let account = state.store.account(&account_id)?;
    Ok(Json(account.into()))
}

async fn devices_handler(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> ServerResult<Json<Vec<Device>>> {
    let request = parse_body(body)?;
    authorize(state.store.as_ref(), &account_id, &request.key)?;

    let devices = state.store.devices(&account_id).inspect_err(|e| {
        debug!(%account_id, error = %e, "device list lookup failed");
    })?;
    Ok(Json(devices))
}

async fn device_handler(
    State(state): State<AppState>,
    Path((account_id, device_id)): Path<(String, String)>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> ServerResult<Json<Device>> {
    let request = parse_body(body)?;
    authorize(state.store.as_ref(), &account_id, &request.key)?;

    let device = state
        .store
        .device(&account_id, &device_id)
        .inspect_err(|e| {
            debug!(%account_id, %device_id, error = %e, "device lookup failed");
        })?;
    Ok(Json(device))
}

async fn register_device_handler(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    body: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> ServerResult<StatusCode> {
    let request = parse_body(body)?;
    if request.device.id.is_empty() {
        debug!(%account_id, "missing device id in request body");
        return Err(ServerError::InvalidRequest(
            "missing device id in request body".into(),
        ));
    }
    authorize(state.store.as_ref(), &account_id, &request.key)?;

    let key = request.key.clone();
    let device = request.into_device(&account_id);
    let device_id = device.id.clone();
    state
        .store
        .register_device(&account_id, &key, device)
        .map_err(|e| credential_error(&account_id, e))?;

    info!(%account_id, %device_id, "device registered");
    Ok(StatusCode::OK)
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            debug!(error = %rejection.body_text(), "request body exceeds size limit");
            Err(ServerError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "failed to parse request body as json");
            Err(ServerError::InvalidRequest(format!(
                "failed to parse request body as json: {}",
                rejection.body_text()
            )))
        }
    }
}

/// Checks the request's account id and key and requires an active
/// subscription.
fn authorize(store: &dyn AccountStore, account_id: &str, key: &str) -> ServerResult<()> {
    if account_id.is_empty() {
        debug!("missing account parameter");
        return Err(ServerError::InvalidRequest("missing account parameter".into()));
    }
    if key.is_empty() {
        debug!(account_id, "missing account key in request body");
        return Err(ServerError::InvalidRequest(
            "missing account key in request body".into(),
        ));
    }

    store
        .check_subscription(account_id, key)
        .map_err(|e| credential_error(account_id, e))
}

/// Maps a store failure raised while checking credentials.
///
/// Every not-found outcome becomes 401 with the same public message.
fn credential_error(account_id: &str, err: StoreError) -> ServerError {
    if err.is_not_found() {
        debug!(account_id, error = %err, "account validation failed");
        ServerError::Unauthorized(err.to_string())
    } else if err.is_inactive() {
        debug!(account_id, "account is not active");
        ServerError::PaymentRequired("subscription is not active".into())
    } else {
        error!(account_id, error = %err, "store failure during validation");
        ServerError::Internal(err.to_string())
    }
}
