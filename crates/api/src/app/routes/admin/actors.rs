use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::ActorForm;
use kinoteka_core::ActorId;

use super::check;
use crate::app::routes::common::{no_content, respond_with};
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_actors).post(create_actor))
        .route("/:id", get(get_actor).put(update_actor).delete(delete_actor))
}

pub async fn list_actors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Actor, Action::View) {
        return denied;
    }
    match services.admin.list_actors().await {
        Ok(actors) => Json(serde_json::json!({
            "items": dto::actors_to_json(&actors, &services.media_url),
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_actor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ActorId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Actor, Action::View) {
        return denied;
    }
    let result = services.admin.get_actor(id).await;
    respond_with(StatusCode::OK, result, |a| dto::actor_to_json(a, &services.media_url))
}

pub async fn create_actor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ActorForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Actor, Action::Add) {
        return denied;
    }
    let result = services.admin.create_actor(body).await;
    respond_with(StatusCode::CREATED, result, |a| dto::actor_to_json(a, &services.media_url))
}

pub async fn update_actor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ActorId>,
    Json(body): Json<ActorForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Actor, Action::Change) {
        return denied;
    }
    let result = services.admin.update_actor(id, body).await;
    respond_with(StatusCode::OK, result, |a| dto::actor_to_json(a, &services.media_url))
}

/// The actor is removed from every cast and director list.
pub async fn delete_actor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ActorId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Actor, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_actor(id).await)
}
