//! Entity extraction: which university, city, status and intent a question is about.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogSnapshot, MatchProfile, Status},
    config::{AcronymMatch, AcronymSettings, AssistantConfig, SynonymTable},
    text::{acronym::strip_elision, best_match, normalize},
};

/// Kind of information requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Scholarship description and type.
    Scholarships,
    /// Offered programs.
    Programs,
    /// Website URL.
    Website,
}

/// Entities found in one question. `university` and `city` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Catalog display name of the matched university.
    pub university: Option<String>,
    /// Normalized city name.
    pub city: Option<String>,
    /// Requested status filter.
    pub status: Option<Status>,
    /// Requested information.
    pub intent: Option<Intent>,
}

/// Dictionary- and rule-based extractor configured from [`AssistantConfig`].
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    fuzzy_threshold: u8,
    acronym: AcronymSettings,
    known_cities: Vec<String>,
    synonyms: SynonymTable,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(&AssistantConfig::default())
    }
}

impl EntityExtractor {
    /// Copies the matching settings out of the config.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            fuzzy_threshold: config.fuzzy_threshold,
            acronym: config.acronym.clone(),
            known_cities: config.known_cities.clone(),
            synonyms: config.synonyms.clone(),
        }
    }

    /// Runs every detector over `normalize(question)`.
    ///
    /// The university detector has priority: the city detector only runs when
    /// no university matched. Intent and status are detected independently.
    #[must_use]
    pub fn extract(&self, question: &str, snapshot: &CatalogSnapshot) -> ExtractedEntities {
        let normalized = normalize(question);
        let university = self
            .detect_university(question, snapshot)
            .map(|profile| profile.name.clone());
        let city = if university.is_none() {
            self.detect_city(&normalized, snapshot)
        } else {
            None
        };
        ExtractedEntities {
            university,
            city,
            status: self.detect_status(&normalized),
            intent: self.detect_intent(&normalized),
        }
    }

    /// First profile, in catalog order, whose normalized name occurs in the
    /// question or whose acronym matches under the configured policy.
    ///
    /// Takes the raw question: `l'`/`d'` is only peeled off words that were
    /// written with the apostrophe.
    #[must_use]
    pub fn detect_university<'s>(
        &self,
        question: &str,
        snapshot: &'s CatalogSnapshot,
    ) -> Option<&'s MatchProfile> {
        let normalized = normalize(question);
        let words = acronym_words(question);
        snapshot.profiles().iter().find(|profile| {
            (!profile.normalized_name.is_empty() && normalized.contains(&profile.normalized_name))
                || self.acronym_matches(&normalized, &words, &profile.acronym)
        })
    }

    /// Best fuzzy city over catalog cities followed by the known-city list.
    #[must_use]
    pub fn detect_city(&self, normalized: &str, snapshot: &CatalogSnapshot) -> Option<String> {
        let index = snapshot.index();
        let catalog_cities = index.cities().iter().map(String::as_str);
        let extra_cities = self
            .known_cities
            .iter()
            .filter(|city| !index.has_city(city))
            .map(String::as_str);
        best_match(
            normalized,
            catalog_cities.chain(extra_cities),
            self.fuzzy_threshold,
        )
        .map(str::to_string)
    }

    /// Scholarships, then programs, then website; first keyword hit wins.
    #[must_use]
    pub fn detect_intent(&self, normalized: &str) -> Option<Intent> {
        [
            (Intent::Scholarships, &self.synonyms.scholarships),
            (Intent::Programs, &self.synonyms.programs),
            (Intent::Website, &self.synonyms.website),
        ]
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| normalized.contains(kw.as_str())))
        .map(|(intent, _)| intent)
    }

    /// Private keywords are checked before public ones; both must be whole words.
    #[must_use]
    pub fn detect_status(&self, normalized: &str) -> Option<Status> {
        if has_any_phrase(normalized, &self.synonyms.private) {
            Some(Status::Private)
        } else if has_any_phrase(normalized, &self.synonyms.public) {
            Some(Status::Public)
        } else {
            None
        }
    }

    fn acronym_matches(&self, normalized: &str, words: &[String], acronym: &str) -> bool {
        if acronym.chars().count() < self.acronym.min_len {
            return false;
        }
        match self.acronym.policy {
            AcronymMatch::Substring => normalized.contains(acronym),
            AcronymMatch::WordBounded => words.iter().any(|word| word == acronym),
        }
    }
}

/// Normalized words of the raw question, with `l'`/`d'` elisions removed
/// (`l'EHTP` gives `ehtp`, `les` stays `les`).
fn acronym_words(question: &str) -> Vec<String> {
    question
        .split_whitespace()
        .flat_map(|word| {
            let lowered = word.to_lowercase();
            normalize(strip_elision(&lowered))
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn has_any_phrase(normalized: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| has_phrase(normalized, phrase))
}

/// Whole-word containment of a (possibly multi-word) phrase.
fn has_phrase(normalized: &str, phrase: &str) -> bool {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    !needle.is_empty() && words.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UniversityRecord;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![
                UniversityRecord::new("École Hassania des Travaux Publics (EHTP)", "Casablanca")
                    .with_status(Status::Public),
                UniversityRecord::new("Université Internationale de Rabat", "Rabat")
                    .with_status(Status::Private),
                UniversityRecord::new("Université Cadi Ayyad", "Marrakech")
                    .with_status(Status::Public),
            ],
            1,
        )
    }

    #[test]
    fn university_by_name_or_acronym() {
        let extractor = EntityExtractor::default();
        let snapshot = snapshot();
        let by_name = extractor.extract("Parlez-moi de l'Université Cadi Ayyad", &snapshot);
        assert_eq!(by_name.university.as_deref(), Some("Université Cadi Ayyad"));

        let by_acronym = extractor.extract("Quelles bourses à l'UIR ?", &snapshot);
        assert_eq!(
            by_acronym.university.as_deref(),
            Some("Université Internationale de Rabat")
        );
        assert_eq!(by_acronym.intent, Some(Intent::Scholarships));
    }

    #[test]
    fn university_wins_over_city() {
        let extractor = EntityExtractor::default();
        let entities = extractor.extract("EHTP ou une autre école à Marrakech ?", &snapshot());
        assert_eq!(
            entities.university.as_deref(),
            Some("École Hassania des Travaux Publics (EHTP)")
        );
        assert_eq!(entities.city, None);
    }

    #[test]
    fn word_bounded_acronyms_ignore_fragments() {
        let extractor = EntityExtractor::default();
        // "uca" is the acronym of Cadi Ayyad; "educative" contains it
        let entities = extractor.extract("une offre educative à tanger", &snapshot());
        assert_eq!(entities.university, None);
        assert_eq!(entities.city.as_deref(), Some("tanger"));
    }

    #[test]
    fn plain_words_starting_with_l_or_d_are_not_elisions() {
        let extractor = EntityExtractor::default();
        let snapshot = CatalogSnapshot::new(
            vec![
                UniversityRecord::new("École Supérieure", "Casablanca"),
                UniversityRecord::new("Université Mohammed V", "Rabat"),
            ],
            1,
        );
        // "es" is the acronym of the first record
        let entities = extractor.extract("les universités à Rabat", &snapshot);
        assert_eq!(entities.university, None);
        assert_eq!(entities.city.as_deref(), Some("rabat"));
        assert_eq!(
            extractor.extract("les cursus de l'ES ?", &snapshot).university.as_deref(),
            Some("École Supérieure")
        );
    }

    #[test]
    fn substring_policy_reproduces_loose_matching() {
        let mut config = AssistantConfig::default();
        config.acronym.policy = AcronymMatch::Substring;
        let extractor = EntityExtractor::new(&config);
        let entities = extractor.extract("une offre educative à tanger", &snapshot());
        assert_eq!(entities.university.as_deref(), Some("Université Cadi Ayyad"));
    }

    #[test]
    fn city_comes_from_catalog_or_known_list() {
        let extractor = EntityExtractor::default();
        let snapshot = snapshot();
        assert_eq!(
            extractor.extract("universités à Rabat", &snapshot).city.as_deref(),
            Some("rabat")
        );
        assert_eq!(
            extractor.extract("universités à Fès", &snapshot).city.as_deref(),
            Some("fes")
        );
        assert_eq!(
            extractor.detect_city("marrakch", &snapshot).as_deref(),
            Some("marrakech")
        );
        assert_eq!(extractor.extract("bonjour", &snapshot).city, None);
    }

    #[test]
    fn intent_priority_and_synonyms() {
        let extractor = EntityExtractor::default();
        let n = |q: &str| normalize(q);
        assert_eq!(
            extractor.detect_intent(&n("bourses et formations")),
            Some(Intent::Scholarships)
        );
        assert_eq!(
            extractor.detect_intent(&n("quelles filières ?")),
            Some(Intent::Programs)
        );
        assert_eq!(
            extractor.detect_intent(&n("un financement possible ?")),
            Some(Intent::Scholarships)
        );
        assert_eq!(
            extractor.detect_intent(&n("le lien svp")),
            Some(Intent::Website)
        );
        assert_eq!(extractor.detect_intent(&n("bonjour")), None);
    }

    #[test]
    fn status_keywords_are_whole_words() {
        let extractor = EntityExtractor::default();
        let n = |q: &str| normalize(q);
        assert_eq!(
            extractor.detect_status(&n("écoles privées à Rabat")),
            Some(Status::Private)
        );
        assert_eq!(
            extractor.detect_status(&n("universités publiques")),
            Some(Status::Public)
        );
        assert_eq!(extractor.detect_status(&n("la publication")), None);
    }

    #[test]
    fn empty_catalog_still_extracts_known_cities() {
        let extractor = EntityExtractor::default();
        let empty = CatalogSnapshot::empty(0);
        let entities = extractor.extract("universités à agadir", &empty);
        assert_eq!(entities.university, None);
        assert_eq!(entities.city.as_deref(), Some("agadir"));
    }
}
