//! Text primitives shared by the catalog index and the entity extractor.

/// Initials-based short identifiers for university names.
pub mod acronym;
/// Token-set similarity and best-candidate selection.
pub mod fuzzy;
/// Accent, case and punctuation folding.
pub mod normalizer;

pub use acronym::{derive_acronym, strip_parentheticals};
pub use fuzzy::{best_match, token_set_ratio};
pub use normalizer::normalize;
