use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings of the form `<entity>.<action>`
/// (e.g. `"movie.change"`). The wildcard `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn wildcard() -> Self {
        Self::new("*")
    }

    /// Permission to perform `action` on `resource`.
    pub fn on(resource: Resource, action: Action) -> Self {
        Self::new(format!("{}.{}", resource.as_str(), action.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entities guarded by the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Category,
    Genre,
    Actor,
    Movie,
    MovieShot,
    RatingStar,
    Rating,
    Review,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Category,
        Resource::Genre,
        Resource::Actor,
        Resource::Movie,
        Resource::MovieShot,
        Resource::RatingStar,
        Resource::Rating,
        Resource::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Category => "category",
            Resource::Genre => "genre",
            Resource::Actor => "actor",
            Resource::Movie => "movie",
            Resource::MovieShot => "movieshot",
            Resource::RatingStar => "ratingstar",
            Resource::Rating => "rating",
            Resource::Review => "review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Change => "change",
            Action::Delete => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_entity_dot_action() {
        assert_eq!(Permission::on(Resource::Movie, Action::Change).as_str(), "movie.change");
        assert_eq!(Permission::on(Resource::RatingStar, Action::View).as_str(), "ratingstar.view");
        assert!(Permission::wildcard().is_wildcard());
    }
}
