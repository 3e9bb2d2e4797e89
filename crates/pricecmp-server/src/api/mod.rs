mod products;
mod supermarkets;
mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pricecmp_core::NearbySearchConfig;
use pricecmp_db::{Catalog, DbError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, REQUEST_ID_HEADER};

pub const DB_ERROR_MESSAGE: &str = "Erro ao acessar banco de dados";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub nearby_search: NearbySearchConfig,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn ok(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Error message payload: a single sentence or one entry per failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    List(Vec<String>),
}

impl From<String> for ErrorMessage {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ErrorMessage {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: ErrorMessage,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "statusText")]
    status_text: &'a str,
    message: &'a ErrorMessage,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<ErrorMessage>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<ErrorMessage>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<ErrorMessage>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Logs the underlying failure and hides it behind the generic 500.
    pub fn from_db(request_id: &str, error: &dyn std::fmt::Display) -> Self {
        tracing::error!(request_id, error = %error, "database query failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, DB_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            status_text: self.status.canonical_reason().unwrap_or("Error"),
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Maps a unique-key violation to `409` with `message`; anything else is a
/// plain database error.
pub(super) fn map_unique_violation(request_id: &str, error: &DbError, message: &str) -> ApiError {
    if error.is_unique_violation() {
        ApiError::conflict(message)
    } else {
        ApiError::from_db(request_id, error)
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route(
            "/produtos",
            get(products::list_products).post(products::create_offer),
        )
        .route(
            "/produtos/supermercados",
            get(products::list_nearby_products),
        )
        .route("/produtos/{gtin}", get(products::get_product))
        .route(
            "/produtos/{gtin}/supermercados",
            get(products::get_product),
        )
        .route(
            "/supermercados",
            get(supermarkets::list_supermarkets).post(supermarkets::create_supermarket),
        )
        .route(
            "/supermercados/{cnpj}",
            get(supermarkets::get_supermarket),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
