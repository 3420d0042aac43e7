#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Rule-based question answering over a university catalog.

/// Templated reply rendering.
#[path = "../answer.rs"]
pub mod answer;

/// Catalog records, index, snapshots and file access.
#[path = "../catalog/main.rs"]
pub mod catalog;

/// TOML configuration.
#[path = "../config.rs"]
pub mod config;

/// Catalog error kinds.
#[path = "../errors.rs"]
pub mod errors;

/// University, city, status and intent extraction.
#[path = "../extract.rs"]
pub mod extract;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Normalization, acronyms and fuzzy matching.
#[path = "../text/main.rs"]
pub mod text;

/// High-level entry points.
#[path = "../main.rs"]
pub mod orchestration_entry;

pub use answer::ResponseGenerator;
pub use catalog::{
    CatalogIndex, CatalogSnapshot, CatalogSource, CatalogStats, CatalogStore, MatchProfile,
    Status, UniversityRecord,
};
pub use config::{AcronymMatch, AssistantConfig, ReloadPolicy};
pub use errors::{CatalogError, CatalogResult};
pub use extract::{EntityExtractor, ExtractedEntities, Intent};
pub use orchestration_entry::{CampusAssistant, ConversationContext};
pub use telemetry::{AssistantTelemetry, AssistantTelemetryBuilder};
