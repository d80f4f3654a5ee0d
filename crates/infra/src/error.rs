use thiserror::Error;

use kinoteka_core::{DomainError, FieldErrors};

use crate::store::StoreError;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error surfaced by the catalog services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Missing, or hidden by the publish gate.
    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A referenced row does not exist.
    #[error("integrity violated: {0}")]
    Integrity(String),

    #[error("store error: {0}")]
    Store(String),
}

impl CatalogError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => Self::Validation(fields),
            DomainError::InvalidId(msg) => Self::validation("id", msg),
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unique { table, column } => Self::validation(
                column,
                format!("a row in {table} with this {column} already exists"),
            ),
            StoreError::ForeignKey(msg) => Self::Integrity(msg),
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_field_error() {
        let err: CatalogError = StoreError::Unique { table: "movies", column: "url" }.into();
        match err {
            CatalogError::Validation(fields) => assert!(fields.contains("url")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn foreign_key_becomes_integrity() {
        let err: CatalogError = StoreError::ForeignKey("movie 9 does not exist".into()).into();
        assert_eq!(err, CatalogError::Integrity("movie 9 does not exist".into()));
    }

    #[test]
    fn domain_validation_passes_through() {
        let err: CatalogError = DomainError::validation("text", "too long").into();
        assert_eq!(err, CatalogError::validation("text", "too long"));
    }

    #[test]
    fn malformed_id_becomes_field_error() {
        let err: CatalogError = "0".parse::<kinoteka_core::MovieId>().unwrap_err().into();
        match err {
            CatalogError::Validation(fields) => assert!(fields.contains("id")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
