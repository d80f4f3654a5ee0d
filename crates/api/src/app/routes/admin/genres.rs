use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::GenreForm;
use kinoteka_core::GenreId;

use super::check;
use crate::app::routes::common::{items, no_content, respond};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route("/:id", get(get_genre).put(update_genre).delete(delete_genre))
}

pub async fn list_genres(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Genre, Action::View) {
        return denied;
    }
    items(services.admin.list_genres().await)
}

pub async fn get_genre(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<GenreId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Genre, Action::View) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.get_genre(id).await)
}

pub async fn create_genre(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<GenreForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Genre, Action::Add) {
        return denied;
    }
    respond(StatusCode::CREATED, services.admin.create_genre(body).await)
}

pub async fn update_genre(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<GenreId>,
    Json(body): Json<GenreForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Genre, Action::Change) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.update_genre(id, body).await)
}

/// The genre is detached from its movies.
pub async fn delete_genre(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<GenreId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Genre, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_genre(id).await)
}
