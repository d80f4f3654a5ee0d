//! Movie selection: publish gate, genre/year filter, text search.
//!
//! [`MovieQuery::matches`] is the reference semantics; SQL-backed stores must
//! return exactly the movies it accepts.

use std::collections::BTreeSet;

use kinoteka_core::{ActorId, CategoryId, DomainResult, FieldErrors, GenreId};

use crate::movie::Movie;

/// Publish gate applied to movie lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Only movies with `draft = false` (public pages).
    #[default]
    Published,
    /// Drafts included (admin console).
    All,
}

impl Visibility {
    pub fn admits(self, movie: &Movie) -> bool {
        match self {
            Visibility::Published => movie.is_published(),
            Visibility::All => true,
        }
    }
}

/// Sidebar filter: any selected genre OR any selected year.
///
/// An empty filter constrains nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MovieFilter {
    pub genres: BTreeSet<GenreId>,
    pub years: BTreeSet<u16>,
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.years.is_empty()
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        self.is_empty() || self.years.contains(&movie.year) || movie.has_any_genre(&self.genres)
    }

    /// Build a filter from repeated `genre=<id>` / `year=<yyyy>` query pairs.
    /// Unknown keys are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> DomainResult<Self> {
        let mut filter = MovieFilter::default();
        let mut errors = FieldErrors::new();
        for (key, value) in pairs {
            match key {
                "genre" => {
                    if let Some(id) = errors.check("genre", value.parse::<GenreId>()) {
                        filter.genres.insert(id);
                    }
                }
                "year" => {
                    let parsed = value
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| format!("'{value}' is not a valid year"));
                    if let Some(year) = errors.check("year", parsed) {
                        filter.years.insert(year);
                    }
                }
                _ => {}
            }
        }
        errors.into_result().map(|()| filter)
    }
}

/// Full movie query used by both the public pages and the admin list.
///
/// All set criteria must hold (AND); within [`MovieFilter`] the genre and year
/// sets combine as a union.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MovieQuery {
    pub visibility: Visibility,
    pub filter: MovieFilter,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
    /// Case-insensitive substring of the title OR of the category name.
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub year: Option<u16>,
    pub draft: Option<bool>,
    /// Movies where this actor plays or directs.
    pub featuring: Option<ActorId>,
}

impl MovieQuery {
    pub fn published() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            visibility: Visibility::All,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: MovieFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_title(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = non_blank(needle.into());
        self
    }

    pub fn with_search(mut self, needle: impl Into<String>) -> Self {
        self.search = non_blank(needle.into());
        self
    }

    pub fn featuring(mut self, actor: ActorId) -> Self {
        self.featuring = Some(actor);
        self
    }

    /// `category_name` is the name of `movie.category`, when it has one.
    pub fn matches(&self, movie: &Movie, category_name: Option<&str>) -> bool {
        if !self.visibility.admits(movie) || !self.filter.matches(movie) {
            return false;
        }
        if let Some(needle) = &self.title_contains {
            if !contains_ci(&movie.title, needle) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let in_category = category_name.is_some_and(|name| contains_ci(name, needle));
            if !contains_ci(&movie.title, needle) && !in_category {
                return false;
            }
        }
        if self.category.is_some_and(|c| movie.category != Some(c)) {
            return false;
        }
        if self.year.is_some_and(|y| movie.year != y) {
            return false;
        }
        if self.draft.is_some_and(|d| movie.draft != d) {
            return false;
        }
        if self.featuring.is_some_and(|a| !movie.features(a)) {
            return false;
        }
        true
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
