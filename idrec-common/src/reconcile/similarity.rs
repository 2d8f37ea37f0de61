//! Field similarity scoring
//!
//! Only keys present in the anchor mapping (`a`) are visited; keys that
//! appear only in `b` never influence the score.

use crate::fields::{FieldMapping, FieldValue};

/// String form of a present null when scoring
pub const NULL_SCORE_FORM: &str = "none";

/// A present null scores as [`NULL_SCORE_FORM`], so null against a value
/// is a counted mismatch and null against null a counted match
fn normalized(value: Option<&FieldValue>) -> String {
    value
        .map(FieldValue::normalized)
        .unwrap_or_else(|| NULL_SCORE_FORM.to_string())
}

/// Percentage of overlapping non-empty fields whose normalized values match
///
/// Result lies in `[0, 100]`, rounded to two decimals; `0.0` when no
/// overlapping field is non-empty on both sides. Blank strings are
/// skipped; nulls are not.
pub fn similarity_score(a: &FieldMapping, b: &FieldMapping) -> f64 {
    let mut matched = 0u32;
    let mut total = 0u32;

    for field in a.keys() {
        if !b.contains(field) {
            continue;
        }

        let left = normalized(a.value(field));
        let right = normalized(b.value(field));
        if left.is_empty() || right.is_empty() {
            continue;
        }

        total += 1;
        if left == right {
            matched += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }

    let percentage = 100.0 * f64::from(matched) / f64::from(total);
    (percentage * 100.0).round() / 100.0
}
