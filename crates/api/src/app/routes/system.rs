use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /admin/whoami
pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    let permissions = principal
        .to_principal()
        .permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect::<Vec<_>>();
    Json(serde_json::json!({
        "principal_id": principal.principal_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": permissions,
    }))
}
