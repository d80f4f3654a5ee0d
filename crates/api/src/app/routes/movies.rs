//! Public catalog pages: movie list, genre/year filter, search, detail.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use kinoteka_catalog::MovieFilter;

use crate::app::routes::common::respond_with;
use crate::app::routes::{actors, ratings, reviews};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ClientIp;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movies))
        .route("/filter", get(filter_movies))
        .route("/search", get(search_movies))
        .route("/add-rating", post(ratings::add_rating))
        .route("/review/:movie_id", post(reviews::add_review))
        .route("/actor/:name", get(actors::actor_detail))
        .route("/:slug", get(movie_detail))
}

/// GET /movies - published movies with the filter sidebar
pub async fn list_movies(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let result = services.catalog.listing(MovieFilter::default()).await;
    respond_with(StatusCode::OK, result, |l| dto::listing_to_json(l, &services.media_url))
}

/// GET /movies/filter?genre=<id>&year=<y> - union of the selected genres and years
pub async fn filter_movies(
    Extension(services): Extension<Arc<AppServices>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let filter = match MovieFilter::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
        Ok(f) => f,
        Err(e) => return errors::catalog_error_to_response(e.into()),
    };
    let result = services.catalog.listing(filter).await;
    respond_with(StatusCode::OK, result, |l| dto::listing_to_json(l, &services.media_url))
}

/// GET /movies/search?q= - published movies whose title contains `q`
pub async fn search_movies(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> Response {
    match services.catalog.search(&params.q).await {
        Ok(movies) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "q": params.q,
                "items": dto::movies_to_json(&movies, &services.media_url),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// GET /movies/:slug - movie page; drafts are 404
pub async fn movie_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
    ip: Option<ClientIp>,
) -> Response {
    let ip = ip.as_ref().map(ClientIp::as_str);
    let result = services.catalog.movie_page(&slug, ip).await;
    respond_with(StatusCode::OK, result, |p| dto::movie_page_to_json(p, &services.media_url))
}
