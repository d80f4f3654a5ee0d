//! Genres (drama, comedy, ...), many-to-many with movies.

use serde::{Deserialize, Serialize};

use kinoteka_core::{GenreId, DomainError, DomainResult, Entity, FieldErrors};

use crate::fields::{required_body, required_text, MAX_CHAR_FIELD};
use crate::slug::Slug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub description: String,
    pub url: Slug,
}

impl Genre {
    pub fn new(id: GenreId, new: NewGenre) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            url: new.url,
        }
    }
}

impl Entity for Genre {
    type Id = GenreId;

    fn id(&self) -> GenreId {
        self.id
    }
}

/// Validated genre fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGenre {
    pub name: String,
    pub description: String,
    pub url: Slug,
}

/// Raw genre input (admin form).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenreForm {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl GenreForm {
    pub fn validate(self) -> DomainResult<NewGenre> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_CHAR_FIELD);
        let description = required_body(&mut errors, "description", &self.description);
        let url = errors.check("url", Slug::parse(&self.url));
        let (Some(url), true) = (url, errors.is_empty()) else {
            return Err(DomainError::Validation(errors));
        };

        Ok(NewGenre { name, description, url })
    }
}
