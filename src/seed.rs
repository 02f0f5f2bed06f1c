//! Seed data: ten boundary cases for the brand schema.
//!
//! Each case pins `yearFounded` and `numberOfLocations` to a value chosen
//! to exercise one edge of the schema (oldest year, current year, single
//! location, very large chains). Brand names and cities are generated.
//! The cases are inserted as canonical documents and documented in a
//! spreadsheet alongside the data.

use std::path::Path;

use anyhow::Result;
use chrono::Datelike;
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::Fake;

use brand_pipeline_core::store::DocumentStore;
use brand_pipeline_core::{CanonicalRecord, ValidationError};

use crate::config::Config;
use crate::spreadsheet::{write_workbook, Cell, Sheet};
use crate::sqlite_store::SqliteStore;
use crate::{db, migrate};

pub const SHEET_NAME: &str = "Seed Data Cases";

const COLUMNS: [(&str, f64); 7] = [
    ("Case Number", 12.0),
    ("Brand Name", 35.0),
    ("Year Founded", 15.0),
    ("Headquarters", 25.0),
    ("Number of Locations", 20.0),
    ("Test Purpose", 40.0),
    ("Notes", 50.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SeedCase {
    pub case_number: u32,
    pub record: CanonicalRecord,
    pub test_purpose: &'static str,
    pub notes: &'static str,
}

/// `None` as the year means "the current year".
const CASE_TABLE: [(Option<i32>, i64, &str, &str); 10] = [
    (
        Some(1600),
        100,
        "Test minimum year boundary (1600)",
        "Oldest possible brand to test lower boundary validation",
    ),
    (
        Some(1850),
        250,
        "Test historical brand from 1800s",
        "Victorian era brand, tests historical data handling",
    ),
    (
        Some(1920),
        500,
        "Test early 20th century brand",
        "Post-WWI era brand, tests early modern period",
    ),
    (
        Some(1950),
        1000,
        "Test mid-20th century brand",
        "Post-WWII boom era, tests modern brand establishment",
    ),
    (
        Some(2000),
        750,
        "Test millennium era brand",
        "Dot-com era brand, tests recent historical data",
    ),
    (
        None,
        50,
        "Test current year boundary",
        "Brand founded this year, tests maximum year validation",
    ),
    (
        Some(2010),
        1,
        "Test minimum locations boundary (1)",
        "Single location startup, tests lower boundary for locations",
    ),
    (
        Some(1980),
        50,
        "Test small chain business",
        "Small regional chain, tests typical small business scale",
    ),
    (
        Some(1975),
        5000,
        "Test large enterprise chain",
        "National chain, tests large-scale business operations",
    ),
    (
        Some(1965),
        20000,
        "Test global mega-brand",
        "International corporation, tests maximum scale operations",
    ),
];

/// The ten seed cases, with fresh generated names and cities.
pub fn generate_cases(current_year: i32) -> Vec<SeedCase> {
    CASE_TABLE
        .iter()
        .zip(1u32..)
        .map(|(&(year, locations, test_purpose, notes), case_number)| SeedCase {
            case_number,
            record: CanonicalRecord {
                brand_name: CompanyName().fake(),
                year_founded: year.unwrap_or(current_year),
                headquarters: CityName().fake(),
                number_of_locations: locations,
            },
            test_purpose,
            notes,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeded: usize,
    pub errors: usize,
}

/// Validate and insert each case. Failures are logged and counted.
pub async fn seed_brands(
    store: &dyn DocumentStore,
    collection: &str,
    cases: &[SeedCase],
    current_year: i32,
) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for case in cases {
        tracing::info!(
            case = case.case_number,
            brand = %case.record.brand_name,
            year = case.record.year_founded,
            hq = %case.record.headquarters,
            locations = case.record.number_of_locations,
            purpose = case.test_purpose,
            "seeding case"
        );

        match seed_one(store, collection, case, current_year).await {
            Ok(id) => {
                summary.seeded += 1;
                tracing::debug!(case = case.case_number, id = %id, "seeded");
            }
            Err(e) => {
                summary.errors += 1;
                tracing::error!(case = case.case_number, error = %format!("{:#}", e), "failed to seed case");
            }
        }
    }

    summary
}

async fn seed_one(
    store: &dyn DocumentStore,
    collection: &str,
    case: &SeedCase,
    current_year: i32,
) -> Result<String> {
    ValidationError::check(case.record.violations(current_year))?;
    store.insert_one(collection, &case.record.to_document()).await
}

/// Document the cases as a one-sheet workbook.
pub fn write_seed_workbook(path: &Path, cases: &[SeedCase]) -> Result<()> {
    let sheet = Sheet {
        name: SHEET_NAME.to_string(),
        headers: COLUMNS.iter().map(|(h, _)| h.to_string()).collect(),
        widths: COLUMNS.iter().map(|(_, w)| *w).collect(),
        rows: cases
            .iter()
            .map(|c| {
                vec![
                    Cell::from(i64::from(c.case_number)),
                    Cell::from(c.record.brand_name.as_str()),
                    Cell::from(c.record.year_founded),
                    Cell::from(c.record.headquarters.as_str()),
                    Cell::from(c.record.number_of_locations),
                    Cell::from(c.test_purpose),
                    Cell::from(c.notes),
                ]
            })
            .collect(),
    };
    write_workbook(path, &sheet)
}

pub fn print_summary(summary: &SeedSummary) {
    println!("seed");
    println!("  seeded: {}", summary.seeded);
    println!("  errors: {}", summary.errors);
}

/// Insert the seed cases and, when `write_docs` is set, write the workbook.
pub async fn run_seed(config: &Config, write_docs: bool) -> Result<()> {
    let current_year = chrono::Utc::now().year();
    let cases = generate_cases(current_year);

    let pool = db::connect(config).await?;
    let result = match migrate::apply(&pool).await {
        Ok(()) => {
            let store = SqliteStore::new(pool.clone());
            Ok(seed_brands(&store, &config.pipeline.collection, &cases, current_year).await)
        }
        Err(e) => Err(e),
    };
    pool.close().await;
    print_summary(&result?);

    if write_docs {
        write_seed_workbook(&config.seed.docs_path, &cases)?;
        println!("  documentation: {}", config.seed.docs_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_pipeline_core::store::memory::InMemoryStore;
    use brand_pipeline_core::validate_document;
    use serde_json::json;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn ten_cases_with_fixed_boundaries() {
        let cases = generate_cases(2025);
        assert_eq!(cases.len(), 10);
        let years: Vec<i32> = cases.iter().map(|c| c.record.year_founded).collect();
        assert_eq!(
            years,
            vec![1600, 1850, 1920, 1950, 2000, 2025, 2010, 1980, 1975, 1965]
        );
        let locations: Vec<i64> = cases.iter().map(|c| c.record.number_of_locations).collect();
        assert_eq!(
            locations,
            vec![100, 250, 500, 1000, 750, 50, 1, 50, 5000, 20000]
        );
        assert_eq!(cases[0].case_number, 1);
        assert_eq!(cases[9].case_number, 10);
        for case in &cases {
            assert!(case.record.violations(2025).is_empty(), "{:?}", case);
        }
    }

    #[tokio::test]
    async fn seeds_valid_documents() {
        let store = InMemoryStore::new();
        let cases = generate_cases(2025);
        let summary = seed_brands(&store, "brands", &cases, 2025).await;
        assert_eq!(summary, SeedSummary { seeded: 10, errors: 0 });

        let docs = store.find_all("brands").await.unwrap();
        assert_eq!(docs.len(), 10);
        for doc in &docs {
            assert!(validate_document(doc, 2025).is_empty());
            assert_eq!(doc.get("__v"), Some(&json!(0)));
            assert!(doc.contains_key("createdAt"));
        }
    }

    #[tokio::test]
    async fn invalid_case_is_counted_not_fatal() {
        let store = InMemoryStore::new();
        let mut cases = generate_cases(2025);
        cases[2].record.year_founded = 1500;
        let summary = seed_brands(&store, "brands", &cases, 2025).await;
        assert_eq!(summary, SeedSummary { seeded: 9, errors: 1 });
        assert_eq!(store.count("brands").await.unwrap(), 9);
    }

    #[test]
    fn workbook_lists_every_case() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs/seed-data-cases.xlsx");
        let cases = generate_cases(2025);
        write_seed_workbook(&path, &cases).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("Number of Locations"));
        assert!(xml.contains(r#"<row r="11">"#));
        assert!(xml.contains("Test global mega-brand"));
        assert!(xml.contains(r#"width="50""#));
    }
}
