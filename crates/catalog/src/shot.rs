//! Movie stills ("shots"), owned by a single movie.

use serde::{Deserialize, Serialize};

use kinoteka_core::{DomainError, DomainResult, Entity, FieldErrors, MovieId, MovieShotId};

use crate::fields::{required_body, required_text, MAX_CHAR_FIELD};
use crate::image::{ImageRef, MediaLocation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieShot {
    pub id: MovieShotId,
    pub title: String,
    pub description: String,
    pub image: ImageRef,
    pub movie: MovieId,
}

impl MovieShot {
    pub fn new(id: MovieShotId, new: NewMovieShot) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            image: new.image,
            movie: new.movie,
        }
    }
}

impl Entity for MovieShot {
    type Id = MovieShotId;

    fn id(&self) -> MovieShotId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovieShot {
    pub title: String,
    pub description: String,
    pub image: ImageRef,
    pub movie: MovieId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieShotForm {
    pub title: String,
    pub description: String,
    /// Uploaded file name; stored under `movie_shots/`.
    pub image: String,
    pub movie: MovieId,
}

impl MovieShotForm {
    pub fn validate(self) -> DomainResult<NewMovieShot> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", &self.title, MAX_CHAR_FIELD);
        let description = required_body(&mut errors, "description", &self.description);
        let image = errors.check("image", ImageRef::new(MediaLocation::MovieShots, &self.image));

        let (Some(image), true) = (image, errors.is_empty()) else {
            return Err(DomainError::Validation(errors));
        };
        Ok(NewMovieShot {
            title,
            description,
            image,
            movie: self.movie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_image_goes_under_movie_shots() {
        let new = MovieShotForm {
            title: "Lobby".into(),
            description: "The lobby scene".into(),
            image: "lobby.png".into(),
            movie: MovieId::new(4),
        }
        .validate()
        .unwrap();
        assert_eq!(new.image.path(), "movie_shots/lobby.png");
        assert_eq!(new.movie, MovieId::new(4));
    }

    #[test]
    fn shot_requires_title() {
        let err = MovieShotForm {
            title: " ".into(),
            description: "x".into(),
            image: "a.jpg".into(),
            movie: MovieId::new(1),
        }
        .validate()
        .unwrap_err();
        assert!(err.field_errors().unwrap().contains("title"));
    }
}
