//! Star levels and per-visitor movie ratings.

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use kinoteka_core::{DomainError, DomainResult, Entity, FieldErrors, MovieId, RatingId, RatingStarId};

use crate::fields::{required_text, MAX_CHAR_FIELD};

/// Accepted star values.
pub const STAR_RANGE: RangeInclusive<i16> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingStar {
    pub id: RatingStarId,
    pub value: i16,
}

impl RatingStar {
    pub fn new(id: RatingStarId, new: NewRatingStar) -> Self {
        Self { id, value: new.value }
    }

    /// Default listing order: highest star first.
    pub fn sort_descending(stars: &mut [RatingStar]) {
        stars.sort_by(|a, b| b.value.cmp(&a.value).then(a.id.cmp(&b.id)));
    }
}

impl Entity for RatingStar {
    type Id = RatingStarId;

    fn id(&self) -> RatingStarId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRatingStar {
    pub value: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingStarForm {
    pub value: i64,
}

impl RatingStarForm {
    pub fn validate(self) -> DomainResult<NewRatingStar> {
        let value = star_value(self.value).map_err(|msg| DomainError::validation("value", msg))?;
        Ok(NewRatingStar { value })
    }
}

fn star_value(raw: i64) -> Result<i16, String> {
    i16::try_from(raw)
        .ok()
        .filter(|v| STAR_RANGE.contains(v))
        .ok_or_else(|| {
            format!(
                "star value must be between {} and {}",
                STAR_RANGE.start(),
                STAR_RANGE.end()
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub ip: String,
    pub star: RatingStarId,
    pub movie: MovieId,
}

impl Rating {
    pub fn new(id: RatingId, new: NewRating) -> Self {
        Self {
            id,
            ip: new.ip,
            star: new.star,
            movie: new.movie,
        }
    }
}

impl Entity for Rating {
    type Id = RatingId;

    fn id(&self) -> RatingId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub ip: String,
    pub star: RatingStarId,
    pub movie: MovieId,
}

/// Rating input as entered in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatingForm {
    pub ip: String,
    pub star: RatingStarId,
    pub movie: MovieId,
}

impl RatingForm {
    pub fn validate(self) -> DomainResult<NewRating> {
        let mut errors = FieldErrors::new();
        let ip = required_text(&mut errors, "ip", &self.ip, MAX_CHAR_FIELD);
        errors.into_result()?;
        Ok(NewRating {
            ip,
            star: self.star,
            movie: self.movie,
        })
    }
}

/// A visitor's star vote: the movie and the star *value* (not the star key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StarSubmission {
    pub movie: MovieId,
    pub star: i64,
}

impl StarSubmission {
    /// Validated star value of this submission.
    pub fn star_value(&self) -> DomainResult<i16> {
        star_value(self.star).map_err(|msg| DomainError::validation("star", msg))
    }
}

/// Validate a submitter address derived from the request.
pub fn validate_ip(ip: &str) -> DomainResult<String> {
    let mut errors = FieldErrors::new();
    let ip = required_text(&mut errors, "ip", ip, MAX_CHAR_FIELD);
    errors.into_result()?;
    Ok(ip)
}
