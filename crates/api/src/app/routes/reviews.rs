use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    Json,
};

use kinoteka_catalog::ReviewForm;
use kinoteka_core::MovieId;

use crate::app::routes::common::respond;
use crate::app::services::AppServices;

/// POST /movies/review/:movie_id - review or reply on a published movie
pub async fn add_review(
    Extension(services): Extension<Arc<AppServices>>,
    Path(movie_id): Path<MovieId>,
    Json(body): Json<ReviewForm>,
) -> Response {
    respond(StatusCode::CREATED, services.catalog.submit_review(movie_id, body).await)
}
