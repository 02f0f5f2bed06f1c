//! Field normalization: raw brand documents in, canonical records out.
//!
//! Every extractor is total. When no source field yields a valid value the
//! fixed fallback is substituted and reported; nothing here returns an
//! error. Lookups that consider several source fields walk a static,
//! ordered `(field, converter)` table and stop at the first hit.
//!
//! | Field | Sources (in order) | Fallback |
//! |-------|--------------------|----------|
//! | `brandName` | `brandName`, `brand.name` | `"Unknown Brand"` |
//! | `yearFounded` | `yearFounded`, `yearCreated`, `yearsFounded` | `1600` |
//! | `headquarters` | `headquarters`, `hqAddress` | `"Unknown Location"` |
//! | `numberOfLocations` | `numberOfLocations` | `1` |

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Datelike;
use serde_json::Value;

use crate::models::{CanonicalField, CanonicalRecord, RawRecord, ALLOWED_FIELDS};
use crate::parse::{leading_int, lenient_int, truncated_number};
use crate::report::{FallbackEvent, NormalizeReporter};

/// Earliest plausible founding year.
pub const MIN_YEAR: i32 = 1600;
/// Smallest valid location count.
pub const MIN_LOCATIONS: i64 = 1;
pub const FALLBACK_BRAND_NAME: &str = "Unknown Brand";
pub const FALLBACK_HEADQUARTERS: &str = "Unknown Location";

type Converter = fn(&Value) -> Option<i64>;

/// Converts one year candidate; empty strings count as absent.
fn year_candidate(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) => truncated_number(value),
        Value::String(s) if !s.is_empty() => leading_int(s),
        _ => None,
    }
}

const YEAR_SOURCES: &[(&str, Converter)] = &[
    ("yearFounded", year_candidate),
    ("yearCreated", year_candidate),
    ("yearsFounded", year_candidate),
];

const HEADQUARTERS_SOURCES: &[&str] = &["headquarters", "hqAddress"];

/// Output of [`Normalizer::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: CanonicalRecord,
    /// Top-level keys of the raw record outside the allow-list.
    pub discard: BTreeSet<String>,
    /// Fields that took their fallback value, in extraction order.
    pub defaulted: Vec<CanonicalField>,
}

/// Maps raw brand documents onto [`CanonicalRecord`].
pub struct Normalizer {
    reporter: Arc<dyn NormalizeReporter>,
    current_year: i32,
}

impl Normalizer {
    /// A normalizer whose year ceiling is the current UTC year.
    pub fn new(reporter: Arc<dyn NormalizeReporter>) -> Self {
        Self::with_current_year(reporter, chrono::Utc::now().year())
    }

    pub fn with_current_year(reporter: Arc<dyn NormalizeReporter>, current_year: i32) -> Self {
        Self {
            reporter,
            current_year,
        }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Brand name from `brandName`, then `brand.name`.
    pub fn extract_brand_name(&self, raw: &RawRecord) -> String {
        self.resolve(raw, CanonicalField::BrandName, self.brand_name(raw), || {
            FALLBACK_BRAND_NAME.to_string()
        })
        .0
    }

    /// Founding year from the first candidate field holding an in-range value.
    pub fn extract_year_founded(&self, raw: &RawRecord) -> i32 {
        self.resolve(raw, CanonicalField::YearFounded, self.year_founded(raw), || MIN_YEAR)
            .0
    }

    /// Headquarters from `headquarters`, then `hqAddress`.
    pub fn extract_headquarters(&self, raw: &RawRecord) -> String {
        self.resolve(raw, CanonicalField::Headquarters, self.headquarters(raw), || {
            FALLBACK_HEADQUARTERS.to_string()
        })
        .0
    }

    /// Location count from `numberOfLocations` only.
    pub fn extract_number_of_locations(&self, raw: &RawRecord) -> i64 {
        self.resolve(
            raw,
            CanonicalField::NumberOfLocations,
            self.number_of_locations(raw),
            || MIN_LOCATIONS,
        )
        .0
    }

    /// Apply the four extractors independently.
    pub fn transform(&self, raw: &RawRecord) -> CanonicalRecord {
        CanonicalRecord {
            brand_name: self.extract_brand_name(raw),
            year_founded: self.extract_year_founded(raw),
            headquarters: self.extract_headquarters(raw),
            number_of_locations: self.extract_number_of_locations(raw),
        }
    }

    /// Transform plus discard set, noting which fields fell back.
    pub fn normalize(&self, raw: &RawRecord) -> Normalized {
        let (brand_name, brand_defaulted) = self.resolve(
            raw,
            CanonicalField::BrandName,
            self.brand_name(raw),
            || FALLBACK_BRAND_NAME.to_string(),
        );
        let (year_founded, year_defaulted) =
            self.resolve(raw, CanonicalField::YearFounded, self.year_founded(raw), || MIN_YEAR);
        let (headquarters, hq_defaulted) = self.resolve(
            raw,
            CanonicalField::Headquarters,
            self.headquarters(raw),
            || FALLBACK_HEADQUARTERS.to_string(),
        );
        let (number_of_locations, locations_defaulted) = self.resolve(
            raw,
            CanonicalField::NumberOfLocations,
            self.number_of_locations(raw),
            || MIN_LOCATIONS,
        );

        let defaulted = [
            (CanonicalField::BrandName, brand_defaulted),
            (CanonicalField::YearFounded, year_defaulted),
            (CanonicalField::Headquarters, hq_defaulted),
            (CanonicalField::NumberOfLocations, locations_defaulted),
        ]
        .into_iter()
        .filter_map(|(field, fell_back)| fell_back.then_some(field))
        .collect();

        Normalized {
            record: CanonicalRecord {
                brand_name,
                year_founded,
                headquarters,
                number_of_locations,
            },
            discard: fields_to_discard(raw),
            defaulted,
        }
    }

    /// Use `found`, or report and return the fallback. The flag is true on fallback.
    fn resolve<T: std::fmt::Display>(
        &self,
        raw: &RawRecord,
        field: CanonicalField,
        found: Option<T>,
        fallback: impl FnOnce() -> T,
    ) -> (T, bool) {
        match found {
            Some(value) => (value, false),
            None => {
                let value = fallback();
                self.reporter.fallback_used(&FallbackEvent {
                    record_id: raw.display_id(),
                    field,
                    fallback: value.to_string(),
                });
                (value, true)
            }
        }
    }

    fn brand_name(&self, raw: &RawRecord) -> Option<String> {
        if let Some(name) = raw.get("brandName").and_then(non_blank) {
            return Some(name);
        }
        match raw.get("brand") {
            Some(Value::Object(brand)) => brand.get("name").and_then(non_blank),
            _ => None,
        }
    }

    fn year_founded(&self, raw: &RawRecord) -> Option<i32> {
        let range = i64::from(MIN_YEAR)..=i64::from(self.current_year);
        YEAR_SOURCES.iter().find_map(|(field, convert)| {
            raw.get(field)
                .and_then(convert)
                .filter(|year| range.contains(year))
                .and_then(|year| i32::try_from(year).ok())
        })
    }

    fn headquarters(&self, raw: &RawRecord) -> Option<String> {
        HEADQUARTERS_SOURCES
            .iter()
            .find_map(|field| raw.get(field).and_then(non_blank))
    }

    fn number_of_locations(&self, raw: &RawRecord) -> Option<i64> {
        let count = raw.get("numberOfLocations").and_then(lenient_int)?;
        (count >= MIN_LOCATIONS).then_some(count)
    }
}

/// Top-level keys of `raw` that a canonical document must not carry.
pub fn fields_to_discard(raw: &RawRecord) -> BTreeSet<String> {
    raw.keys()
        .filter(|key| !ALLOWED_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect()
}

fn non_blank(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use proptest::prelude::*;
    use serde_json::json;

    const YEAR: i32 = 2025;

    fn normalizer() -> (Normalizer, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        let n = Normalizer::with_current_year(reporter.clone(), YEAR);
        (n, reporter)
    }

    fn raw(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn brand_name_trimmed() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_brand_name(&raw(json!({"brandName": "  Acme  "}))), "Acme");
        assert!(rep.is_empty());
    }

    #[test]
    fn brand_name_from_nested_brand() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_brand_name(&raw(json!({"brand": {"name": "Acme"}}))), "Acme");
        assert!(rep.is_empty());
    }

    #[test]
    fn blank_brand_name_falls_through_to_nested() {
        let (n, _) = normalizer();
        let r = raw(json!({"brandName": "   ", "brand": {"name": " Nested "}}));
        assert_eq!(n.extract_brand_name(&r), "Nested");
    }

    #[test]
    fn blank_nested_name_falls_back() {
        let (n, rep) = normalizer();
        let r = raw(json!({"_id": "b1", "brand": {"name": "  "}}));
        assert_eq!(n.extract_brand_name(&r), FALLBACK_BRAND_NAME);
        let events = rep.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record_id, "b1");
        assert_eq!(events[0].field, CanonicalField::BrandName);
        assert_eq!(events[0].fallback, FALLBACK_BRAND_NAME);
    }

    #[test]
    fn non_string_brand_name_falls_back() {
        let (n, _) = normalizer();
        let r = raw(json!({"brandName": 12, "brand": "Acme"}));
        assert_eq!(n.extract_brand_name(&r), FALLBACK_BRAND_NAME);
    }

    #[test]
    fn year_first_field_wins() {
        let (n, _) = normalizer();
        let r = raw(json!({"yearFounded": 1700, "yearCreated": 1800}));
        assert_eq!(n.extract_year_founded(&r), 1700);
    }

    #[test]
    fn year_skips_invalid_candidates() {
        let (n, rep) = normalizer();
        let r = raw(json!({"yearFounded": "", "yearCreated": null, "yearsFounded": "1987abc"}));
        assert_eq!(n.extract_year_founded(&r), 1987);
        assert!(rep.is_empty());
    }

    #[test]
    fn year_out_of_range_candidate_is_skipped() {
        let (n, _) = normalizer();
        let r = raw(json!({"yearFounded": 1500, "yearCreated": "1820"}));
        assert_eq!(n.extract_year_founded(&r), 1820);
    }

    #[test]
    fn year_below_minimum_falls_back() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_year_founded(&raw(json!({"yearFounded": 1500}))), MIN_YEAR);
        assert_eq!(rep.for_field(CanonicalField::YearFounded).len(), 1);
    }

    #[test]
    fn year_in_future_falls_back() {
        let (n, _) = normalizer();
        let r = raw(json!({"yearFounded": YEAR + 5}));
        assert_eq!(n.extract_year_founded(&r), MIN_YEAR);
        let r = raw(json!({"yearFounded": (YEAR + 5).to_string()}));
        assert_eq!(n.extract_year_founded(&r), MIN_YEAR);
    }

    #[test]
    fn year_bounds_inclusive() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_year_founded(&raw(json!({"yearFounded": 1600}))), 1600);
        assert_eq!(n.extract_year_founded(&raw(json!({"yearFounded": YEAR}))), YEAR);
        assert!(rep.is_empty());
    }

    #[test]
    fn year_fractional_number_truncated() {
        let (n, rep) = normalizer();
        let r = raw(json!({"yearFounded": 1987.5, "yearCreated": 1990.0}));
        assert_eq!(n.extract_year_founded(&r), 1987);
        assert_eq!(
            n.extract_year_founded(&raw(json!({"yearFounded": "1987.5"}))),
            1987
        );
        assert!(rep.is_empty());
    }

    #[test]
    fn year_from_string_with_byte_order_mark() {
        let (n, rep) = normalizer();
        assert_eq!(
            n.extract_year_founded(&raw(json!({"yearFounded": "\u{FEFF}1987"}))),
            1987
        );
        assert!(rep.is_empty());
    }

    #[test]
    fn year_boolean_ignored() {
        let (n, _) = normalizer();
        assert_eq!(n.extract_year_founded(&raw(json!({"yearFounded": true}))), MIN_YEAR);
    }

    #[test]
    fn headquarters_prefers_primary_then_address() {
        let (n, rep) = normalizer();
        assert_eq!(
            n.extract_headquarters(&raw(json!({"headquarters": " Oslo ", "hqAddress": "Bergen"}))),
            "Oslo"
        );
        assert_eq!(
            n.extract_headquarters(&raw(json!({"headquarters": "", "hqAddress": " Bergen "}))),
            "Bergen"
        );
        assert!(rep.is_empty());
    }

    #[test]
    fn headquarters_fallback() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_headquarters(&raw(json!({"hqAddress": 5}))), FALLBACK_HEADQUARTERS);
        assert_eq!(rep.len(), 1);
    }

    #[test]
    fn locations_from_string_prefix() {
        let (n, _) = normalizer();
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": "42 stores"}))),
            42
        );
    }

    #[test]
    fn locations_unparseable_falls_back() {
        let (n, rep) = normalizer();
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": "abc"}))),
            MIN_LOCATIONS
        );
        assert_eq!(rep.for_field(CanonicalField::NumberOfLocations).len(), 1);
    }

    #[test]
    fn locations_zero_and_negative_fall_back() {
        let (n, _) = normalizer();
        assert_eq!(n.extract_number_of_locations(&raw(json!({"numberOfLocations": 0}))), 1);
        assert_eq!(n.extract_number_of_locations(&raw(json!({"numberOfLocations": "-3"}))), 1);
    }

    #[test]
    fn locations_huge_numbers_saturate() {
        let (n, rep) = normalizer();
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": 18446744073709551615u64}))),
            i64::MAX
        );
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": 1e19}))),
            i64::MAX
        );
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": "18446744073709551615"}))),
            i64::MAX
        );
        assert!(rep.is_empty());
    }

    #[test]
    fn locations_fraction_matches_string_form() {
        let (n, rep) = normalizer();
        assert_eq!(n.extract_number_of_locations(&raw(json!({"numberOfLocations": 2.5}))), 2);
        assert_eq!(n.extract_number_of_locations(&raw(json!({"numberOfLocations": "2.5"}))), 2);
        assert!(rep.is_empty());
        assert_eq!(
            n.extract_number_of_locations(&raw(json!({"numberOfLocations": 0.5}))),
            MIN_LOCATIONS
        );
        assert_eq!(rep.len(), 1);
    }

    #[test]
    fn locations_has_no_alternate_fields() {
        let (n, _) = normalizer();
        let r = raw(json!({"locations": 12, "numLocations": "12"}));
        assert_eq!(n.extract_number_of_locations(&r), MIN_LOCATIONS);
    }

    #[test]
    fn discard_outside_allow_list() {
        let r = raw(json!({
            "_id": "x",
            "legacyField": 1,
            "brandName": "X",
            "yearFounded": 1900,
            "headquarters": "Y",
            "numberOfLocations": 2,
            "createdAt": "t",
            "updatedAt": "t",
            "__v": 0
        }));
        let discard = fields_to_discard(&r);
        assert_eq!(discard, BTreeSet::from(["legacyField".to_string()]));
    }

    #[test]
    fn discard_includes_alternate_source_fields() {
        let r = raw(json!({"yearCreated": 1900, "hqAddress": "Z", "brand": {"name": "B"}}));
        let discard = fields_to_discard(&r);
        assert_eq!(
            discard,
            BTreeSet::from(["brand".to_string(), "hqAddress".to_string(), "yearCreated".to_string()])
        );
    }

    #[test]
    fn normalize_tracks_defaults() {
        let (n, rep) = normalizer();
        let r = raw(json!({"_id": "d1", "brandName": "Acme", "yearCreated": "1999"}));
        let out = n.normalize(&r);
        assert_eq!(out.record.brand_name, "Acme");
        assert_eq!(out.record.year_founded, 1999);
        assert_eq!(
            out.defaulted,
            vec![CanonicalField::Headquarters, CanonicalField::NumberOfLocations]
        );
        assert_eq!(rep.len(), 2);
        assert_eq!(out.discard, BTreeSet::from(["yearCreated".to_string()]));
    }

    #[test]
    fn transform_empty_record_uses_all_fallbacks() {
        let (n, rep) = normalizer();
        let out = n.transform(&RawRecord::new());
        assert_eq!(
            out,
            CanonicalRecord {
                brand_name: FALLBACK_BRAND_NAME.to_string(),
                year_founded: MIN_YEAR,
                headquarters: FALLBACK_HEADQUARTERS.to_string(),
                number_of_locations: MIN_LOCATIONS,
            }
        );
        assert_eq!(rep.len(), 4);
        assert!(rep.events().iter().all(|e| e.record_id == crate::models::UNIDENTIFIED));
    }

    #[test]
    fn transform_is_stable_on_its_own_output() {
        let (n, _) = normalizer();
        let r = raw(json!({"yearsFounded": " 1888 est.", "hqAddress": "Lyon", "brand": {"name": "B"}}));
        let first = n.transform(&r);
        let again = n.transform(&RawRecord::from_map(first.to_fields()));
        assert_eq!(first, again);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (1500i64..2100).prop_map(Value::from),
            any::<f64>().prop_map(|f| serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            ".*".prop_map(Value::from),
            "[ ]{0,2}[+-]?[0-9]{0,5}[a-z ]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(2, 8, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    fn arb_raw() -> impl Strategy<Value = RawRecord> {
        let keys = prop_oneof![
            Just("brandName".to_string()),
            Just("brand".to_string()),
            Just("yearFounded".to_string()),
            Just("yearCreated".to_string()),
            Just("yearsFounded".to_string()),
            Just("headquarters".to_string()),
            Just("hqAddress".to_string()),
            Just("numberOfLocations".to_string()),
            "[a-zA-Z_]{1,10}",
        ];
        prop::collection::btree_map(keys, arb_json(), 0..10)
            .prop_map(|m| RawRecord::from_map(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn transform_always_satisfies_schema(r in arb_raw()) {
            let n = Normalizer::with_current_year(Arc::new(crate::report::NoReport), YEAR);
            let out = n.transform(&r);
            prop_assert!(!out.brand_name.is_empty());
            prop_assert_eq!(out.brand_name.trim(), out.brand_name.as_str());
            prop_assert!(!out.headquarters.is_empty());
            prop_assert_eq!(out.headquarters.trim(), out.headquarters.as_str());
            prop_assert!((MIN_YEAR..=YEAR).contains(&out.year_founded));
            prop_assert!(out.number_of_locations >= MIN_LOCATIONS);
            prop_assert!(out.violations(YEAR).is_empty());
        }

        #[test]
        fn year_is_idempotent(r in arb_raw()) {
            let n = Normalizer::with_current_year(Arc::new(crate::report::NoReport), YEAR);
            let first = n.transform(&r);
            let second = n.transform(&RawRecord::from_map(first.to_fields()));
            prop_assert_eq!(first.year_founded, second.year_founded);
        }

        #[test]
        fn discard_and_allow_list_partition_keys(r in arb_raw()) {
            let discard = fields_to_discard(&r);
            for key in r.keys() {
                prop_assert_eq!(discard.contains(key), !ALLOWED_FIELDS.contains(&key.as_str()));
            }
        }
    }
}
