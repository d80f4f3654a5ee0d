//! Shared field limits and form-cleaning helpers.

use kinoteka_core::FieldErrors;

/// Upper bound of short text columns (names, titles, countries, IPs).
pub const MAX_CHAR_FIELD: usize = 255;

/// Upper bound of a movie tagline.
pub const MAX_TAGLINE: usize = 100;

/// Upper bound of a review body, in characters.
pub const MAX_REVIEW_TEXT: usize = 5000;

/// Upper bound of a positive small-integer column (age, release year).
pub const MAX_POSITIVE_SMALL: i64 = 32_767;

/// Upper bound of a positive integer column (budget, box-office fees).
pub const MAX_POSITIVE_INT: i64 = 2_147_483_647;

pub(crate) const REQUIRED: &str = "this field is required";

fn too_long(max: usize, len: usize) -> String {
    format!("ensure this value has at most {max} characters (it has {len})")
}

/// Strip surrounding whitespace and require a non-empty value of at most `max` characters.
pub(crate) fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        let len = value.chars().count();
        if len > max {
            errors.add(field, too_long(max, len));
        }
    }
    value.to_string()
}

/// Like [`required_text`] without an upper bound (free-text columns).
pub(crate) fn required_body(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

/// Blank is allowed; only the length is checked.
pub(crate) fn optional_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    let len = value.chars().count();
    if len > max {
        errors.add(field, too_long(max, len));
    }
    value.to_string()
}

/// Check `value` against `0..=max`, falling back to `default` when absent.
pub(crate) fn bounded_int(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<i64>,
    default: i64,
    max: i64,
) -> i64 {
    let value = value.unwrap_or(default);
    if value < 0 {
        errors.add(field, "ensure this value is greater than or equal to 0");
    } else if value > max {
        errors.add(field, format!("ensure this value is less than or equal to {max}"));
    }
    value.clamp(0, max)
}

/// Sort and deduplicate many-to-many keys (relations have set semantics).
pub(crate) fn key_set<T: Ord>(mut keys: Vec<T>) -> Vec<T> {
    keys.sort();
    keys.dedup();
    keys
}
