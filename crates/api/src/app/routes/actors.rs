use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};

use crate::app::routes::common::respond_with;
use crate::app::{dto, services::AppServices};

/// GET /movies/actor/:name - actor or director with their published movies
pub async fn actor_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> Response {
    let result = services.catalog.actor_detail(&name).await;
    respond_with(StatusCode::OK, result, |p| dto::actor_page_to_json(p, &services.media_url))
}
