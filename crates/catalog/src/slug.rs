//! URL slugs: unique, URL-safe identifiers distinct from surrogate keys.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kinoteka_core::ValueObject;

use crate::fields::MAX_CHAR_FIELD;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("this field is required")]
    Empty,

    #[error("ensure this value has at most {max} characters (it has {len})")]
    TooLong { max: usize, len: usize },

    #[error("enter a valid slug consisting of letters, numbers, underscores or hyphens")]
    InvalidCharacter(char),
}

/// A validated slug: ASCII letters, digits, `-` and `_` only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > MAX_CHAR_FIELD {
            return Err(SlugError::TooLong {
                max: MAX_CHAR_FIELD,
                len: value.chars().count(),
            });
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SlugError::InvalidCharacter(bad));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Slug {}

impl FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
