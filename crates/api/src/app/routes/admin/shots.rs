use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::MovieShotForm;
use kinoteka_core::MovieShotId;

use super::check;
use crate::app::routes::common::{no_content, respond_with};
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_shots).post(create_shot))
        .route("/:id", get(get_shot).put(update_shot).delete(delete_shot))
}

/// GET /admin/shots?movie=<id>
pub async fn list_shots(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(scope): Query<dto::MovieScope>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::MovieShot, Action::View) {
        return denied;
    }
    match services.admin.list_shots(scope.movie).await {
        Ok(shots) => Json(serde_json::json!({
            "items": dto::shots_to_json(&shots, &services.media_url),
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_shot(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieShotId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::MovieShot, Action::View) {
        return denied;
    }
    let result = services.admin.get_shot(id).await;
    respond_with(StatusCode::OK, result, |s| dto::shot_to_json(s, &services.media_url))
}

pub async fn create_shot(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<MovieShotForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::MovieShot, Action::Add) {
        return denied;
    }
    let result = services.admin.create_shot(body).await;
    respond_with(StatusCode::CREATED, result, |s| dto::shot_to_json(s, &services.media_url))
}

pub async fn update_shot(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieShotId>,
    Json(body): Json<MovieShotForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::MovieShot, Action::Change) {
        return denied;
    }
    let result = services.admin.update_shot(id, body).await;
    respond_with(StatusCode::OK, result, |s| dto::shot_to_json(s, &services.media_url))
}

pub async fn delete_shot(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieShotId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::MovieShot, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_shot(id).await)
}
