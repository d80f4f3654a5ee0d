use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::ReviewEdit;
use kinoteka_core::ReviewId;
use kinoteka_infra::AdminReviewForm;

use super::check;
use crate::app::routes::common::{items, no_content, respond};
use crate::app::{dto, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/:id", get(get_review).put(update_review).delete(delete_review))
}

/// GET /admin/reviews?movie=<id>
pub async fn list_reviews(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(scope): Query<dto::MovieScope>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Review, Action::View) {
        return denied;
    }
    items(services.admin.list_reviews(scope.movie).await)
}

pub async fn get_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ReviewId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Review, Action::View) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.get_review(id).await)
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<AdminReviewForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Review, Action::Add) {
        return denied;
    }
    respond(StatusCode::CREATED, services.admin.create_review(body).await)
}

/// Text, parent and movie are editable; name and e-mail are not.
pub async fn update_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewEdit>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Review, Action::Change) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.update_review(id, body).await)
}

/// Replies stay, detached from the deleted parent.
pub async fn delete_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ReviewId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Review, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_review(id).await)
}
