use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::permissions::{Action, Permission, Resource};

/// Role identifier used for RBAC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static role policy.
///
/// - `admin`: everything (`*`)
/// - `editor`: view/add/change on every entity, no deletes
/// - `moderator`: view/change/delete on reviews and ratings, view on movies
///
/// Unknown roles grant nothing.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r.as_str() == "admin") {
        return vec![Permission::wildcard()];
    }

    let mut perms = Vec::new();
    for role in roles {
        match role.as_str() {
            "editor" => {
                for resource in Resource::ALL {
                    for action in [Action::View, Action::Add, Action::Change] {
                        perms.push(Permission::on(resource, action));
                    }
                }
            }
            "moderator" => {
                for resource in [Resource::Review, Resource::Rating] {
                    for action in [Action::View, Action::Change, Action::Delete] {
                        perms.push(Permission::on(resource, action));
                    }
                }
                perms.push(Permission::on(Resource::Movie, Action::View));
            }
            _ => {}
        }
    }
    perms.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    perms.dedup();
    perms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(perms: &[Permission], resource: Resource, action: Action) -> bool {
        perms.contains(&Permission::on(resource, action))
    }

    #[test]
    fn admin_gets_wildcard() {
        let perms = permissions_for_roles(&[Role::new("editor"), Role::new("admin")]);
        assert_eq!(perms, vec![Permission::wildcard()]);
    }

    #[test]
    fn editor_cannot_delete() {
        let perms = permissions_for_roles(&[Role::new("editor")]);
        assert!(has(&perms, Resource::Movie, Action::Add));
        assert!(has(&perms, Resource::Genre, Action::Change));
        assert!(!has(&perms, Resource::Movie, Action::Delete));
    }

    #[test]
    fn moderator_is_limited_to_feedback() {
        let perms = permissions_for_roles(&[Role::new("moderator")]);
        assert!(has(&perms, Resource::Review, Action::Delete));
        assert!(has(&perms, Resource::Rating, Action::Change));
        assert!(has(&perms, Resource::Movie, Action::View));
        assert!(!has(&perms, Resource::Movie, Action::Change));
        assert!(!has(&perms, Resource::Actor, Action::View));
    }

    #[test]
    fn roles_combine_without_duplicates() {
        let perms = permissions_for_roles(&[Role::new("editor"), Role::new("moderator")]);
        assert!(has(&perms, Resource::Review, Action::Delete));
        let views = perms.iter().filter(|p| p.as_str() == "movie.view").count();
        assert_eq!(views, 1);
    }

    #[test]
    fn unknown_role_grants_nothing() {
        assert!(permissions_for_roles(&[Role::new("guest")]).is_empty());
    }
}
