//! # Brand Pipeline
//!
//! Normalizes loosely-structured brand documents into a fixed four-field
//! schema, stored in SQLite, then seeds, verifies, exports, and reports on
//! the collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────┐
//! │ JSON input │──▶│  Normalizer   │──▶│   SQLite    │
//! │ (raw docs) │   │ (core crate) │   │  documents │
//! └────────────┘   └──────────────┘   └─────┬──────┘
//!                                           │
//!                ┌──────────┬───────────────┼──────────┐
//!                ▼          ▼               ▼          ▼
//!            ┌────────┐ ┌────────┐    ┌──────────┐ ┌────────┐
//!            │ verify │ │  seed  │    │  export  │ │ stats  │
//!            └────────┘ └────────┘    └──────────┘ └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! brands init                               # create database
//! brands transform --input data/brands.json # import + normalize + verify
//! brands seed                               # boundary cases + workbook
//! brands export --output out.json
//! brands run --input data/brands.json       # all of the above
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite document store |
//! | [`transform`] | Import and in-place normalization |
//! | [`verify`] | Schema verification of a collection |
//! | [`seed`] | Boundary-case seed data |
//! | [`spreadsheet`] | Minimal `.xlsx` writer |
//! | [`export`] | JSON export |
//! | [`stats`] | Collection statistics |
//! | [`pipeline`] | The `run` command |
//! | [`logging`] | Subscriber setup for the binary |

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod migrate;
pub mod pipeline;
pub mod seed;
pub mod spreadsheet;
pub mod sqlite_store;
pub mod stats;
pub mod transform;
pub mod verify;
