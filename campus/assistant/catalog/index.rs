use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::{
    catalog::record::UniversityRecord,
    text::{derive_acronym, normalize},
};

/// Matching view of one university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchProfile {
    /// Name as it appears in the catalog.
    pub name: String,
    /// `normalize(name)`, trimmed.
    pub normalized_name: String,
    /// Initials of the significant words of the name.
    pub acronym: String,
}

impl MatchProfile {
    /// Derives the matching profile of one record.
    #[must_use]
    pub fn derive(record: &UniversityRecord) -> Self {
        Self {
            name: record.name.clone(),
            normalized_name: normalize(&record.name).trim().to_string(),
            acronym: derive_acronym(&record.name),
        }
    }
}

/// Lookup structures derived from the catalog records.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    cities: IndexSet<String>,
    by_city: IndexMap<String, Vec<usize>>,
    profiles: Vec<MatchProfile>,
}

impl CatalogIndex {
    /// Builds every structure in one pass over the records.
    #[must_use]
    pub fn build(records: &[UniversityRecord]) -> Self {
        let mut index = Self {
            profiles: Vec::with_capacity(records.len()),
            ..Self::default()
        };
        for (position, record) in records.iter().enumerate() {
            index.profiles.push(MatchProfile::derive(record));
            let city = normalize(&record.city).trim().to_string();
            if city.is_empty() {
                continue;
            }
            index.cities.insert(city.clone());
            index.by_city.entry(city).or_default().push(position);
        }
        index
    }

    /// Distinct normalized cities, in first-seen order.
    #[must_use]
    pub const fn cities(&self) -> &IndexSet<String> {
        &self.cities
    }

    /// Whether `city` (normalized) hosts at least one record.
    #[must_use]
    pub fn has_city(&self, city: &str) -> bool {
        self.cities.contains(city)
    }

    /// Record positions located in `city` (normalized), catalog order.
    #[must_use]
    pub fn positions_in(&self, city: &str) -> &[usize] {
        self.by_city.get(city).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Match profiles in catalog order.
    #[must_use]
    pub fn profiles(&self) -> &[MatchProfile] {
        &self.profiles
    }

    /// True when built from no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
