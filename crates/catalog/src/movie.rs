//! Movies: the central catalog entity.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kinoteka_core::{ActorId, CategoryId, DomainError, DomainResult, Entity, FieldErrors, GenreId, MovieId};

use crate::fields::{
    bounded_int, key_set, optional_text, required_body, required_text, MAX_CHAR_FIELD,
    MAX_POSITIVE_INT, MAX_POSITIVE_SMALL, MAX_TAGLINE,
};
use crate::image::{ImageRef, MediaLocation};
use crate::slug::Slug;

/// Slugs that would be shadowed by fixed public routes under `/movies/`.
pub const RESERVED_SLUGS: &[&str] = &["filter", "search", "add-rating"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: ImageRef,
    pub year: u16,
    pub country: String,
    pub directors: Vec<ActorId>,
    pub actors: Vec<ActorId>,
    pub genres: Vec<GenreId>,
    pub world_premiere: NaiveDate,
    /// Whole US dollars.
    pub budget: u32,
    pub fees_in_usa: u32,
    pub fees_in_world: u32,
    pub category: Option<CategoryId>,
    pub url: Slug,
    pub draft: bool,
}

impl Movie {
    pub fn new(id: MovieId, new: NewMovie) -> Self {
        Self {
            id,
            title: new.title,
            tagline: new.tagline,
            description: new.description,
            poster: new.poster,
            year: new.year,
            country: new.country,
            directors: new.directors,
            actors: new.actors,
            genres: new.genres,
            world_premiere: new.world_premiere,
            budget: new.budget,
            fees_in_usa: new.fees_in_usa,
            fees_in_world: new.fees_in_world,
            category: new.category,
            url: new.url,
            draft: new.draft,
        }
    }

    pub fn is_published(&self) -> bool {
        !self.draft
    }

    pub fn absolute_url(&self) -> String {
        format!("/movies/{}", self.url)
    }

    pub fn has_any_genre<'a>(&self, genres: impl IntoIterator<Item = &'a GenreId>) -> bool {
        genres.into_iter().any(|g| self.genres.contains(g))
    }

    /// Whether `actor` appears in the cast or among the directors.
    pub fn features(&self, actor: ActorId) -> bool {
        self.actors.contains(&actor) || self.directors.contains(&actor)
    }

    /// Field values of this movie, for edits and "save as new" copies.
    pub fn to_new(&self) -> NewMovie {
        NewMovie {
            title: self.title.clone(),
            tagline: self.tagline.clone(),
            description: self.description.clone(),
            poster: self.poster.clone(),
            year: self.year,
            country: self.country.clone(),
            directors: self.directors.clone(),
            actors: self.actors.clone(),
            genres: self.genres.clone(),
            world_premiere: self.world_premiere,
            budget: self.budget,
            fees_in_usa: self.fees_in_usa,
            fees_in_world: self.fees_in_world,
            category: self.category,
            url: self.url.clone(),
            draft: self.draft,
        }
    }
}

impl Entity for Movie {
    type Id = MovieId;

    fn id(&self) -> MovieId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: ImageRef,
    pub year: u16,
    pub country: String,
    pub directors: Vec<ActorId>,
    pub actors: Vec<ActorId>,
    pub genres: Vec<GenreId>,
    pub world_premiere: NaiveDate,
    pub budget: u32,
    pub fees_in_usa: u32,
    pub fees_in_world: u32,
    pub category: Option<CategoryId>,
    pub url: Slug,
    pub draft: bool,
}

/// Raw movie input (admin form). Relation keys are checked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieForm {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    pub description: String,
    /// Uploaded poster file name; stored under `movies/`.
    pub poster: String,
    #[serde(default)]
    pub year: Option<i64>,
    pub country: String,
    #[serde(default)]
    pub directors: Vec<ActorId>,
    #[serde(default)]
    pub actors: Vec<ActorId>,
    #[serde(default)]
    pub genres: Vec<GenreId>,
    /// `YYYY-MM-DD`; defaults to today.
    #[serde(default)]
    pub world_premiere: Option<String>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub fees_in_usa: Option<i64>,
    #[serde(default)]
    pub fees_in_world: Option<i64>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub url: String,
    #[serde(default)]
    pub draft: bool,
}

impl MovieForm {
    pub fn validate(self) -> DomainResult<NewMovie> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Validate with an explicit "today" for the year/premiere defaults.
    pub fn validate_at(self, today: NaiveDate) -> DomainResult<NewMovie> {
        let mut errors = FieldErrors::new();

        let title = required_text(&mut errors, "title", &self.title, MAX_CHAR_FIELD);
        let tagline = optional_text(&mut errors, "tagline", &self.tagline, MAX_TAGLINE);
        let description = required_body(&mut errors, "description", &self.description);
        let poster = errors.check("poster", ImageRef::new(MediaLocation::Movies, &self.poster));
        let year = bounded_int(&mut errors, "year", self.year, i64::from(today.year()), MAX_POSITIVE_SMALL);
        let country = required_text(&mut errors, "country", &self.country, MAX_CHAR_FIELD);

        let world_premiere = match self.world_premiere.as_deref().map(str::trim) {
            None | Some("") => Some(today),
            Some(raw) => errors.check(
                "world_premiere",
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| "enter a valid date (YYYY-MM-DD)"),
            ),
        };

        let budget = bounded_int(&mut errors, "budget", self.budget, 0, MAX_POSITIVE_INT);
        let fees_in_usa = bounded_int(&mut errors, "fees_in_usa", self.fees_in_usa, 0, MAX_POSITIVE_INT);
        let fees_in_world = bounded_int(&mut errors, "fees_in_world", self.fees_in_world, 0, MAX_POSITIVE_INT);

        let url = errors.check("url", Slug::parse(&self.url));
        if let Some(url) = &url {
            if RESERVED_SLUGS.contains(&url.as_str()) {
                errors.add("url", format!("'{url}' is reserved by a public route"));
            }
        }

        let (Some(poster), Some(world_premiere), Some(url), true) =
            (poster, world_premiere, url, errors.is_empty())
        else {
            return Err(DomainError::Validation(errors));
        };

        Ok(NewMovie {
            title,
            tagline,
            description,
            poster,
            year: year as u16,
            country,
            directors: key_set(self.directors),
            actors: key_set(self.actors),
            genres: key_set(self.genres),
            world_premiere,
            budget: budget as u32,
            fees_in_usa: fees_in_usa as u32,
            fees_in_world: fees_in_world as u32,
            category: self.category,
            url,
            draft: self.draft,
        })
    }
}
