//! `kinoteka-auth`: admin console authentication and authorization.
//!
//! Decoupled from HTTP and storage. The API layer extracts the bearer token,
//! hands it to a [`JwtValidator`] and checks [`Permission`]s with [`authorize`].

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::{Action, Permission, Resource};
pub use principal::PrincipalId;
pub use roles::{Role, permissions_for_roles};
