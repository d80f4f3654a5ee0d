use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kinoteka_auth::AuthzError;
use kinoteka_infra::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> Response {
    match err {
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        CatalogError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": "invalid input",
                "fields": fields,
            })),
        )
            .into_response(),
        CatalogError::Integrity(msg) => json_error(StatusCode::CONFLICT, "integrity_error", msg),
        CatalogError::Store(msg) => {
            tracing::error!(error = %msg, "catalog store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "store failure")
        }
    }
}

pub fn forbidden(err: AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use kinoteka_core::FieldErrors;

    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (CatalogError::NotFound, StatusCode::NOT_FOUND),
            (CatalogError::Validation(FieldErrors::single("url", "taken")), StatusCode::BAD_REQUEST),
            (CatalogError::Integrity("movie 4 does not exist".into()), StatusCode::CONFLICT),
            (CatalogError::Store("pool timed out".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(catalog_error_to_response(err).status(), status);
        }
    }
}
