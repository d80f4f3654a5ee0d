use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::RatingForm;
use kinoteka_core::RatingId;
use kinoteka_infra::Upsert;

use super::check;
use crate::app::routes::common::{items, no_content, respond, respond_with};
use crate::app::{dto, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_ratings).post(create_rating))
        .route("/:id", get(get_rating).put(update_rating).delete(delete_rating))
}

/// GET /admin/ratings?movie=<id>
pub async fn list_ratings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(scope): Query<dto::MovieScope>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Rating, Action::View) {
        return denied;
    }
    items(services.admin.list_ratings(scope.movie).await)
}

pub async fn get_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Rating, Action::View) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.get_rating(id).await)
}

/// Upsert on `(ip, movie)`: `201` when created, `200` when an existing rating changed.
pub async fn create_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RatingForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Rating, Action::Add) {
        return denied;
    }
    let result = services.admin.create_rating(body).await;
    let status = match &result {
        Ok((_, Upsert::Updated)) => StatusCode::OK,
        _ => StatusCode::CREATED,
    };
    respond_with(status, result, |(rating, outcome)| {
        dto::rating_to_json(rating, None, Some(*outcome))
    })
}

pub async fn update_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingId>,
    Json(body): Json<RatingForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Rating, Action::Change) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.update_rating(id, body).await)
}

pub async fn delete_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<RatingId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Rating, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_rating(id).await)
}
