//! HTTP routes for the loan document server.
//!
//! - `GET /health`: health check (no auth)
//! - `GET /me`: identity bound to the API key
//! - `POST /collections/{collection}`: add a document
//! - `GET /collections/{collection}?userId=`: documents owned by a user

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::auth::{require_api_key, ApiKeyStore};
use super::storage::{LoanDocumentStore, ServerStorageError};
use crate::identity::Session;
use crate::models::LoanRecord;
use crate::remote::{AddedDocument, NewLoanDocument, LOANS_COLLECTION};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: LoanDocumentStore,
    pub api_keys: Arc<ApiKeyStore>,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    pub fn unauthorized(error: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error, message)
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_document", message)
    }

    fn unknown_collection(name: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "unknown_collection",
            format!("No collection named '{}'", name),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ServerStorageError> for ApiError {
    fn from(e: ServerStorageError) -> Self {
        tracing::error!(error = %e, "storage failure");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "Failed to access loan storage",
        )
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Get current user (auth required)
async fn me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

fn ensure_loans_collection(collection: &str) -> Result<(), ApiError> {
    if collection == LOANS_COLLECTION {
        Ok(())
    } else {
        Err(ApiError::unknown_collection(collection))
    }
}

async fn add_document(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(collection): Path<String>,
    Json(doc): Json<NewLoanDocument>,
) -> Result<(StatusCode, Json<AddedDocument>), ApiError> {
    ensure_loans_collection(&collection)?;

    if doc.user_id != session.user_id {
        return Err(ApiError::forbidden("Cannot create loans for another user"));
    }
    if !doc.amount.is_finite() || doc.amount <= 0.0 {
        return Err(ApiError::bad_request("amount must be a positive number"));
    }
    if doc.purpose.trim().is_empty() {
        return Err(ApiError::bad_request("purpose is required"));
    }

    let record = state.store.add(&doc).await?;
    let id = record.id.unwrap_or_default();
    tracing::info!(%id, user_id = %session.user_id, "loan document added");

    Ok((StatusCode::CREATED, Json(AddedDocument { id })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserFilter {
    user_id: String,
}

async fn query_documents(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(collection): Path<String>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<LoanRecord>>, ApiError> {
    ensure_loans_collection(&collection)?;

    if filter.user_id != session.user_id {
        return Err(ApiError::forbidden("Cannot read another user's loans"));
    }

    Ok(Json(state.store.list_for_user(&filter.user_id).await?))
}

/// Builds the router with public and authenticated routes.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/me", get(me))
        .route(
            "/collections/{collection}",
            get(query_documents).post(add_document),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
