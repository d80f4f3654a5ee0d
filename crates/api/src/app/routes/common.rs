use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kinoteka_infra::CatalogResult;

use crate::app::errors;

/// Serialize `result` with `status`, or map the catalog error.
pub fn respond<T: Serialize>(status: StatusCode, result: CatalogResult<T>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Map a successful result through `to_json` (for bodies that need the media prefix).
pub fn respond_with<T>(
    status: StatusCode,
    result: CatalogResult<T>,
    to_json: impl FnOnce(&T) -> serde_json::Value,
) -> Response {
    match result {
        Ok(value) => (status, Json(to_json(&value))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// `204` on success.
pub fn no_content(result: CatalogResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// `{"items": [...]}` envelope for list endpoints.
pub fn items<T: Serialize>(result: CatalogResult<Vec<T>>) -> Response {
    match result {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
