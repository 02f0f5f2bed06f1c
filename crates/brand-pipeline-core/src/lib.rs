//! # Brand Pipeline Core
//!
//! Storage-agnostic logic for Brand Pipeline: record models, the field
//! normalizer, schema validation, the fallback reporter, and the document
//! store abstraction.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. The CLI crate
//! supplies the SQLite-backed store and the file-level commands.

pub mod models;
pub mod normalizer;
pub mod parse;
pub mod report;
pub mod store;
pub mod validate;

pub use models::{CanonicalField, CanonicalRecord, RawRecord};
pub use normalizer::{Normalized, Normalizer};
pub use report::{CollectingReporter, FallbackEvent, NoReport, NormalizeReporter, TracingReporter};
pub use validate::{validate_document, ConstraintViolation, ValidationError, ViolationKind};
