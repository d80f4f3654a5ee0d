//! Actors and directors (one table, two roles on a movie).

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use kinoteka_core::{ActorId, DomainError, DomainResult, Entity, FieldErrors};

use crate::fields::{bounded_int, required_body, required_text, MAX_CHAR_FIELD, MAX_POSITIVE_SMALL};
use crate::image::{ImageRef, MediaLocation};

/// Characters escaped in a URL path segment; non-ASCII is always escaped.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub age: u16,
    pub description: String,
    pub image: ImageRef,
}

impl Actor {
    pub fn new(id: ActorId, new: NewActor) -> Self {
        Self {
            id,
            name: new.name,
            age: new.age,
            description: new.description,
            image: new.image,
        }
    }

    /// Public detail path. The display name doubles as the lookup key, so
    /// links only stay stable while names are unique.
    pub fn absolute_url(&self) -> String {
        format!("/movies/actor/{}", utf8_percent_encode(&self.name, PATH_SEGMENT))
    }
}

impl Entity for Actor {
    type Id = ActorId;

    fn id(&self) -> ActorId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActor {
    pub name: String,
    pub age: u16,
    pub description: String,
    pub image: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActorForm {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    pub description: String,
    /// Uploaded file name; stored under `actors/`.
    pub image: String,
}

impl ActorForm {
    pub fn validate(self) -> DomainResult<NewActor> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_CHAR_FIELD);
        let age = bounded_int(&mut errors, "age", self.age, 0, MAX_POSITIVE_SMALL);
        let description = required_body(&mut errors, "description", &self.description);
        let image = errors.check("image", ImageRef::new(MediaLocation::Actors, &self.image));

        let (Some(image), true) = (image, errors.is_empty()) else {
            return Err(DomainError::Validation(errors));
        };
        Ok(NewActor {
            name,
            age: age as u16,
            description,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ActorForm {
        ActorForm {
            name: "Keanu Reeves".into(),
            age: Some(59),
            description: "Canadian actor".into(),
            image: "keanu.jpg".into(),
        }
    }

    #[test]
    fn age_defaults_to_zero() {
        let new = ActorForm { age: None, ..form() }.validate().unwrap();
        assert_eq!(new.age, 0);
    }

    #[test]
    fn image_lands_under_actors() {
        let new = form().validate().unwrap();
        assert_eq!(new.image.path(), "actors/keanu.jpg");
    }

    #[test]
    fn rejects_negative_age_and_bad_image() {
        let err = ActorForm {
            age: Some(-5),
            image: "keanu.txt".into(),
            ..form()
        }
        .validate()
        .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("age"));
        assert!(fields.contains("image"));
    }

    #[test]
    fn absolute_url_uses_display_name() {
        let actor = Actor::new(ActorId::new(1), form().validate().unwrap());
        assert_eq!(actor.absolute_url(), "/movies/actor/Keanu%20Reeves");
    }

    #[test]
    fn absolute_url_escapes_reserved_characters() {
        let actor = Actor::new(
            ActorId::new(2),
            ActorForm { name: "AC/DC? #1 100%".into(), ..form() }.validate().unwrap(),
        );
        assert_eq!(actor.absolute_url(), "/movies/actor/AC%2FDC%3F%20%231%20100%25");

        let actor = Actor::new(
            ActorId::new(3),
            ActorForm { name: "Богдан Ступка".into(), ..form() }.validate().unwrap(),
        );
        assert_eq!(
            actor.absolute_url(),
            "/movies/actor/%D0%91%D0%BE%D0%B3%D0%B4%D0%B0%D0%BD%20%D0%A1%D1%82%D1%83%D0%BF%D0%BA%D0%B0"
        );
    }
}
