//! Schema constraints for stored brand documents.
//!
//! [`validate_document`] re-checks what actually landed in the store;
//! [`CanonicalRecord::violations`] applies the same rules to a typed record
//! before it is written.

use serde_json::Value;

use crate::models::{CanonicalField, CanonicalRecord, RawRecord};
use crate::normalizer::{MIN_LOCATIONS, MIN_YEAR};
use crate::parse::integral_number;

/// What went wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Absent or null.
    Missing,
    /// Present with the wrong JSON type (or a non-integral number).
    WrongType { expected: &'static str },
    /// A string that is empty after trimming.
    Empty,
    BelowMinimum { min: i64 },
    AboveMaximum { max: i64 },
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub field: CanonicalField,
    pub kind: ViolationKind,
}

impl ConstraintViolation {
    pub fn message(&self) -> String {
        use CanonicalField::*;
        use ViolationKind::*;
        match (&self.kind, self.field) {
            (Missing | Empty, BrandName) => "Brand name is required".to_string(),
            (Missing | Empty, YearFounded) => "Year founded is required".to_string(),
            (Missing | Empty, Headquarters) => "Headquarters location is required".to_string(),
            (Missing | Empty, NumberOfLocations) => {
                "Number of locations is required".to_string()
            }
            (WrongType { expected }, field) => format!("{} must be {}", field, expected),
            (BelowMinimum { .. }, YearFounded) => "Year founded seems too old".to_string(),
            (AboveMaximum { .. }, YearFounded) => {
                "Year founded cannot be in the future".to_string()
            }
            (BelowMinimum { .. }, NumberOfLocations) => {
                "There should be at least one location".to_string()
            }
            (BelowMinimum { min }, field) => format!("{} must be at least {}", field, min),
            (AboveMaximum { max }, field) => format!("{} must be at most {}", field, max),
        }
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

/// A non-empty list of violations, for `?` propagation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join(.0))]
pub struct ValidationError(pub Vec<ConstraintViolation>);

fn join(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// `Ok(())` for an empty list, otherwise the error.
    pub fn check(violations: Vec<ConstraintViolation>) -> Result<(), ValidationError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(violations))
        }
    }
}

/// Check a stored document against the four field constraints.
pub fn validate_document(doc: &RawRecord, current_year: i32) -> Vec<ConstraintViolation> {
    let mut out = Vec::new();
    check_text(doc, CanonicalField::BrandName, &mut out);
    check_int(
        doc,
        CanonicalField::YearFounded,
        i64::from(MIN_YEAR),
        Some(i64::from(current_year)),
        &mut out,
    );
    check_text(doc, CanonicalField::Headquarters, &mut out);
    check_int(doc, CanonicalField::NumberOfLocations, MIN_LOCATIONS, None, &mut out);
    out
}

impl CanonicalRecord {
    /// Constraint violations of this record; empty when valid.
    pub fn violations(&self, current_year: i32) -> Vec<ConstraintViolation> {
        validate_document(&RawRecord::from_map(self.to_fields()), current_year)
    }
}

fn check_text(doc: &RawRecord, field: CanonicalField, out: &mut Vec<ConstraintViolation>) {
    let kind = match doc.get(field.key()) {
        None | Some(Value::Null) => ViolationKind::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => ViolationKind::Empty,
        Some(Value::String(_)) => return,
        Some(_) => ViolationKind::WrongType { expected: "a string" },
    };
    out.push(ConstraintViolation { field, kind });
}

fn check_int(
    doc: &RawRecord,
    field: CanonicalField,
    min: i64,
    max: Option<i64>,
    out: &mut Vec<ConstraintViolation>,
) {
    let value = match doc.get(field.key()) {
        None | Some(Value::Null) => {
            out.push(ConstraintViolation {
                field,
                kind: ViolationKind::Missing,
            });
            return;
        }
        Some(v) => v,
    };
    let n = match integral_number(value) {
        Some(n) => n,
        None => {
            out.push(ConstraintViolation {
                field,
                kind: ViolationKind::WrongType {
                    expected: "an integer",
                },
            });
            return;
        }
    };
    if n < min {
        out.push(ConstraintViolation {
            field,
            kind: ViolationKind::BelowMinimum { min },
        });
    }
    if let Some(max) = max {
        if n > max {
            out.push(ConstraintViolation {
                field,
                kind: ViolationKind::AboveMaximum { max },
            });
        }
    }
}
