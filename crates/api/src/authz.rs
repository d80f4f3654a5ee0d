//! API-side authorization guard for admin routes.
//!
//! Checked in each handler before the service call, keeping the services
//! auth-agnostic.

use kinoteka_auth::{Action, AuthzError, Permission, Resource, authorize};

use crate::context::PrincipalContext;

/// Require `<resource>.<action>` for the current principal.
pub fn require(
    principal: &PrincipalContext,
    resource: Resource,
    action: Action,
) -> Result<(), AuthzError> {
    let required = Permission::on(resource, action);
    let result = authorize(&principal.to_principal(), &required);
    if let Err(err) = &result {
        tracing::info!(principal = %principal.principal_id(), %err, "admin access denied");
    }
    result
}
