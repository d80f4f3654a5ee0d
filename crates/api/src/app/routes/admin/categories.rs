use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use kinoteka_auth::{Action, Resource};
use kinoteka_catalog::CategoryForm;
use kinoteka_core::CategoryId;

use super::check;
use crate::app::routes::common::{items, no_content, respond};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", get(get_category).put(update_category).delete(delete_category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Category, Action::View) {
        return denied;
    }
    items(services.admin.list_categories().await)
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<CategoryId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Category, Action::View) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.get_category(id).await)
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CategoryForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Category, Action::Add) {
        return denied;
    }
    respond(StatusCode::CREATED, services.admin.create_category(body).await)
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryForm>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Category, Action::Change) {
        return denied;
    }
    respond(StatusCode::OK, services.admin.update_category(id, body).await)
}

/// Movies of the category are kept with `category = null`.
pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<CategoryId>,
) -> Response {
    if let Err(denied) = check(&principal, Resource::Category, Action::Delete) {
        return denied;
    }
    no_content(services.admin.delete_category(id).await)
}
