//! Categories group movies (feature film, series, cartoon, ...).

use serde::{Deserialize, Serialize};

use kinoteka_core::{CategoryId, DomainError, DomainResult, Entity, FieldErrors};

use crate::fields::{required_body, required_text, MAX_CHAR_FIELD};
use crate::slug::Slug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub url: Slug,
}

impl Category {
    pub fn new(id: CategoryId, new: NewCategory) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            url: new.url,
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Validated category fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub url: Slug,
}

/// Raw category input (admin form).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl CategoryForm {
    pub fn validate(self) -> DomainResult<NewCategory> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_CHAR_FIELD);
        let description = required_body(&mut errors, "description", &self.description);
        let url = errors.check("url", Slug::parse(&self.url));
        let (Some(url), true) = (url, errors.is_empty()) else {
            return Err(DomainError::Validation(errors));
        };

        Ok(NewCategory { name, description, url })
    }
}
