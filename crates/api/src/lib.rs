//! HTTP API: public catalog pages and the JWT-guarded admin console.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
