//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values (a slug, an e-mail address, an image reference).

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Constructors are
/// expected to validate, so holding an instance means holding a valid value.
///
/// ```ignore
/// let a: Slug = "the-matrix".parse()?;
/// let b: Slug = "the-matrix".parse()?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
