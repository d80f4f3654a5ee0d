use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Response, Json};

use kinoteka_catalog::StarSubmission;
use kinoteka_infra::Upsert;

use crate::app::routes::common::respond_with;
use crate::app::{dto, services::AppServices};
use crate::context::ClientIp;

/// POST /movies/add-rating - one rating per visitor address and movie
pub async fn add_rating(
    Extension(services): Extension<Arc<AppServices>>,
    ip: ClientIp,
    Json(body): Json<StarSubmission>,
) -> Response {
    let star = body.star;
    let result = services.catalog.submit_rating(ip.as_str(), body).await;
    let status = match &result {
        Ok((_, Upsert::Updated)) => StatusCode::OK,
        _ => StatusCode::CREATED,
    };
    respond_with(status, result, |(rating, outcome)| {
        let mut body = dto::rating_to_json(rating, None, Some(*outcome));
        body["value"] = serde_json::json!(star);
        body
    })
}
