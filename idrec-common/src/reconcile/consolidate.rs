//! Field consolidation
//!
//! Merges two field mappings into one record. Agreement is decided per
//! field: date fields compare as calendar dates, every other field compares
//! case- and whitespace-insensitively. Disagreements keep both raw values
//! so a reviewer can pick the right one.

use serde::Serialize;
use std::collections::{btree_map, BTreeMap, BTreeSet};

use super::dates::parse_date;
use crate::fields::{FieldMapping, FieldName, FieldValue};

/// Outcome for a single field
///
/// Serializes untagged: an agreed field is its bare value, a disagreement is
/// `{"document_1": .., "document_2": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Consolidated {
    /// Both documents agree; `None` only when both sides are null
    Agreed(Option<FieldValue>),
    /// Documents disagree; raw values from each side
    Disagreed {
        document_1: Option<FieldValue>,
        document_2: Option<FieldValue>,
    },
}

impl Consolidated {
    pub fn is_agreed(&self) -> bool {
        matches!(self, Consolidated::Agreed(_))
    }

    fn disagreed(left: Option<&FieldValue>, right: Option<&FieldValue>) -> Self {
        Consolidated::Disagreed {
            document_1: left.cloned(),
            document_2: right.cloned(),
        }
    }
}

/// Consolidated record covering the union of both documents' fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConsolidatedRecord {
    fields: BTreeMap<FieldName, Consolidated>,
}

impl ConsolidatedRecord {
    pub fn get(&self, field: FieldName) -> Option<&Consolidated> {
        self.fields.get(&field)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldName, Consolidated> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields the documents disagree on, in schema order
    pub fn disagreements(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.fields
            .iter()
            .filter(|(_, outcome)| !outcome.is_agreed())
            .map(|(field, _)| *field)
    }
}

/// Merge two mappings field by field
pub fn reconcile(a: &FieldMapping, b: &FieldMapping) -> ConsolidatedRecord {
    let keys: BTreeSet<FieldName> = a.keys().chain(b.keys()).collect();

    let fields = keys
        .into_iter()
        .map(|field| {
            let left = a.value(field);
            let right = b.value(field);
            let outcome = if field.is_date() {
                consolidate_date(left, right)
            } else {
                consolidate_text(left, right)
            };
            (field, outcome)
        })
        .collect();

    ConsolidatedRecord { fields }
}

/// Agreed only when both sides parse to the same calendar date; the agreed
/// value is rewritten in ISO-8601 form
fn consolidate_date(left: Option<&FieldValue>, right: Option<&FieldValue>) -> Consolidated {
    let left_date = left.and_then(|v| parse_date(&v.to_string()));
    let right_date = right.and_then(|v| parse_date(&v.to_string()));

    match (left_date, right_date) {
        (Some(l), Some(r)) if l == r => {
            Consolidated::Agreed(Some(FieldValue::Text(l.format("%Y-%m-%d").to_string())))
        }
        _ => Consolidated::disagreed(left, right),
    }
}

/// Null never equals a value, even an empty string
fn consolidate_text(left: Option<&FieldValue>, right: Option<&FieldValue>) -> Consolidated {
    match (left, right) {
        (None, None) => Consolidated::Agreed(None),
        (Some(l), Some(r)) if l.normalized() == r.normalized() => {
            Consolidated::Agreed(Some(l.clone()))
        }
        _ => Consolidated::disagreed(left, right),
    }
}
