use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{
    index::{CatalogIndex, MatchProfile},
    record::{Status, UniversityRecord},
};

/// Public/private breakdown shown on the admin side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct CatalogStats {
    /// Number of records.
    pub total: usize,
    /// Records marked `Publique`.
    pub public: usize,
    /// Records marked `Privée`.
    pub private: usize,
    /// Records without a recognized status.
    pub unspecified: usize,
}

/// Immutable catalog state at one version: the records plus their index.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    version: u64,
    loaded_at: DateTime<Utc>,
    records: Vec<UniversityRecord>,
    index: CatalogIndex,
}

impl CatalogSnapshot {
    /// Indexes `records` and stamps the snapshot.
    #[must_use]
    pub fn new(records: Vec<UniversityRecord>, version: u64) -> Self {
        let index = CatalogIndex::build(&records);
        Self {
            version,
            loaded_at: Utc::now(),
            records,
            index,
        }
    }

    /// Snapshot with no records.
    #[must_use]
    pub fn empty(version: u64) -> Self {
        Self::new(Vec::new(), version)
    }

    /// Store version this snapshot was installed at.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Build time.
    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Derived lookup structures.
    #[must_use]
    pub const fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Match profiles in catalog order.
    #[must_use]
    pub fn profiles(&self) -> &[MatchProfile] {
        self.index.profiles()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for an empty catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact lookup by display name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&UniversityRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Records located in `city` (normalized), catalog order.
    #[must_use]
    pub fn universities_in(&self, city: &str) -> Vec<&UniversityRecord> {
        self.index
            .positions_in(city)
            .iter()
            .filter_map(|&position| self.records.get(position))
            .collect()
    }

    /// Records sorted by display name.
    #[must_use]
    pub fn listing(&self) -> Vec<&UniversityRecord> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    /// Status counts.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        self.records
            .iter()
            .fold(CatalogStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    Some(Status::Public) => stats.public += 1,
                    Some(Status::Private) => stats.private += 1,
                    None => stats.unspecified += 1,
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![
                UniversityRecord::new("UM5", "Rabat").with_status(Status::Public),
                UniversityRecord::new("EHTP", "Casablanca").with_status(Status::Public),
                UniversityRecord::new("UIR", "rabat").with_status(Status::Private),
                UniversityRecord::new("Atelier", "Rabat"),
            ],
            7,
        )
    }

    #[test]
    fn groups_by_normalized_city() {
        let snapshot = snapshot();
        let names: Vec<_> = snapshot
            .universities_in("rabat")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["UM5", "UIR", "Atelier"]);
        assert_eq!(snapshot.version(), 7);
    }

    #[test]
    fn listing_sorts_by_name_and_stats_count_statuses() {
        let snapshot = snapshot();
        let names: Vec<_> = snapshot.listing().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Atelier", "EHTP", "UIR", "UM5"]);
        assert_eq!(
            snapshot.stats(),
            CatalogStats {
                total: 4,
                public: 2,
                private: 1,
                unspecified: 1
            }
        );
    }

    #[test]
    fn find_is_exact() {
        let snapshot = snapshot();
        assert!(snapshot.find("EHTP").is_some());
        assert!(snapshot.find("ehtp").is_none());
    }
}
