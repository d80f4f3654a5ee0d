use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::RatingStarForm;
use kinoteka_core::RatingStarId;

use super::check;
use crate::app::routes::common::{items, no_content, respond};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rating_stars).post(create_rating_star))
        .route("/:id", get(get_rating_star).put(update_rating_star).delete(delete_rating_star))
}

/// Highest value first.
pub async fn list_rating_stars(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::RatingStar, Action::View) {
        return denied;
    }
    items(services.admin.list_rating_stars().await)
}

pub async fn get_rating_star(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingStarId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::RatingStar, Action::View) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.get_rating_star(id).await)
}

pub async fn create_rating_star(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RatingStarForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::RatingStar, Action::Add) {
        return denied;
    }
    respond(StatusCode::CREATED, services.admin.create_rating_star(body).await)
}

pub async fn update_rating_star(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingStarId>,
    Json(body): Json<RatingStarForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::RatingStar, Action::Change) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.update_rating_star(id, body).await)
}

/// Ratings given with this star are deleted too.
pub async fn delete_rating_star(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingStarId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::RatingStar, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_rating_star(id).await)
}
