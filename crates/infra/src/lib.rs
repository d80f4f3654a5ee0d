//! Infrastructure layer: catalog stores (in-memory and Postgres), the public
//! and administrative services on top of them, and configuration.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod integration_tests;

pub use admin::{AdminReviewForm, AdminService, MovieAdminDetail, MovieListParams};
pub use catalog::{ActorPage, CatalogService, MovieListing, MoviePage, Sidebar};
pub use config::{ConfigError, Settings};
pub use error::{CatalogError, CatalogResult};
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError, Upsert};
