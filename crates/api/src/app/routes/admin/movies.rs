//! Admin movie list with filters, CRUD, "save as new", draft toggle and bulk
//! publish/unpublish.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::MovieForm;
use kinoteka_core::MovieId;
use kinoteka_infra::MovieListParams;

use super::check;
use crate::app::routes::common::{no_content, respond_with};
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route("/publish", post(publish_movies))
        .route("/unpublish", post(unpublish_movies))
        .route("/:id", get(get_movie).put(update_movie).delete(delete_movie))
        .route("/:id/save-as-new", post(save_as_new))
        .route("/:id/draft", put(set_draft))
}

/// GET /admin/movies?category=&year=&draft=&q= - drafts included
pub async fn list_movies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<MovieListParams>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::View) {
        return denied;
    }
    match services.admin.list_movies(&params).await {
        Ok(movies) => Json(serde_json::json!({
            "items": dto::movies_to_json(&movies, &services.media_url),
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// GET /admin/movies/:id - movie with inline shots and reviews
pub async fn get_movie(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::View) {
        return denied;
    }
    let result = services.admin.movie_detail(id).await;
    respond_with(StatusCode::OK, result, |d| dto::movie_admin_detail_to_json(d, &services.media_url))
}

pub async fn create_movie(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<MovieForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Add) {
        return denied;
    }
    let result = services.admin.create_movie(body).await;
    respond_with(StatusCode::CREATED, result, |m| dto::movie_to_json(m, &services.media_url))
}

pub async fn update_movie(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieId>,
    Json(body): Json<MovieForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Change) {
        return denied;
    }
    let result = services.admin.update_movie(id, body).await;
    respond_with(StatusCode::OK, result, |m| dto::movie_to_json(m, &services.media_url))
}

/// Shots, ratings, reviews and relation rows go with the movie.
pub async fn delete_movie(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_movie(id).await)
}

/// POST /admin/movies/:id/save-as-new {url}
pub async fn save_as_new(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieId>,
    Json(body): Json<dto::SaveAsNewRequest>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Add) {
        return denied;
    }
    let result = services.admin.save_as_new(id, &body.url).await;
    respond_with(StatusCode::CREATED, result, |m| dto::movie_to_json(m, &services.media_url))
}

/// PUT /admin/movies/:id/draft {draft}
pub async fn set_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<MovieId>,
    Json(body): Json<dto::DraftRequest>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Change) {
        return denied;
    }
    let result = services.admin.set_draft(id, body.draft).await;
    respond_with(StatusCode::OK, result, |m| dto::movie_to_json(m, &services.media_url))
}

/// POST /admin/movies/publish {ids}
pub async fn publish_movies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::BulkPublicationRequest>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Change) {
        return denied;
    }
    let result = services.admin.publish(&body.ids).await;
    respond_with(StatusCode::OK, result, |o| {
        serde_json::json!({ "updated": o.updated, "message": o.message() })
    })
}

/// POST /admin/movies/unpublish {ids}
pub async fn unpublish_movies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::BulkPublicationRequest>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Movie, Action::Change) {
        return denied;
    }
    let result = services.admin.unpublish(&body.ids).await;
    respond_with(StatusCode::OK, result, |o| {
        serde_json::json!({ "updated": o.updated, "message": o.message() })
    })
}
