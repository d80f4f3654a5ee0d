//! Admin console routes. Every handler checks `<resource>.<action>` for the
//! authenticated principal before calling [`AdminService`](kinoteka_infra::AdminService).

use axum::{response::Response, routing::get, Router};

use kinoteka_auth::{Action, Resource};

use crate::app::errors;
use crate::authz;
use crate::context::PrincipalContext;

pub mod actors;
pub mod categories;
pub mod genres;
pub mod movies;
pub mod rating_stars;
pub mod ratings;
pub mod reviews;
pub mod shots;

pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(super::system::whoami))
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/actors", actors::router())
        .nest("/movies", movies::router())
        .nest("/shots", shots::router())
        .nest("/rating-stars", rating_stars::router())
        .nest("/ratings", ratings::router())
        .nest("/reviews", reviews::router())
}

pub(crate) fn check(
    principal: &PrincipalContext,
    resource: Resource,
    action: Action,
) -> Result<(), Response> {
    authz::require(principal, resource, action).map_err(errors::forbidden)
}
