//! TOML configuration for the assistant.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shared_logging::LogLevel;

use crate::text::normalizer::normalize;

/// When the catalog snapshot is re-derived from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Only on an explicit rebuild (admin upload or `rebuild()`).
    #[default]
    OnInvalidate,
    /// Before every answered question.
    EveryQuery,
}

/// How a university acronym is matched against the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcronymMatch {
    /// The acronym must be a whole word of the question.
    #[default]
    WordBounded,
    /// Plain containment anywhere in the question.
    Substring,
}

/// Acronym matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcronymSettings {
    /// Matching mode.
    #[serde(default)]
    pub policy: AcronymMatch,
    /// Acronyms shorter than this never match.
    #[serde(default = "default_min_acronym_len")]
    pub min_len: usize,
}

impl Default for AcronymSettings {
    fn default() -> Self {
        Self {
            policy: AcronymMatch::default(),
            min_len: default_min_acronym_len(),
        }
    }
}

/// Keyword groups consulted by entity extraction. Entries are normalized on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymTable {
    /// Scholarship intent keywords.
    #[serde(default = "default_scholarship_keywords")]
    pub scholarships: Vec<String>,
    /// Program intent keywords.
    #[serde(default = "default_program_keywords")]
    pub programs: Vec<String>,
    /// Website intent keywords.
    #[serde(default = "default_website_keywords")]
    pub website: Vec<String>,
    /// Words selecting public universities.
    #[serde(default = "default_public_keywords")]
    pub public: Vec<String>,
    /// Words selecting private universities.
    #[serde(default = "default_private_keywords")]
    pub private: Vec<String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self {
            scholarships: default_scholarship_keywords(),
            programs: default_program_keywords(),
            website: default_website_keywords(),
            public: default_public_keywords(),
            private: default_private_keywords(),
        }
    }
}

impl SynonymTable {
    fn normalized(self) -> Self {
        Self {
            scholarships: normalize_keywords(self.scholarships),
            programs: normalize_keywords(self.programs),
            website: normalize_keywords(self.website),
            public: normalize_keywords(self.public),
            private: normalize_keywords(self.private),
        }
    }
}

/// Logging sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file; logging is off when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Severity floor (`debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            path: None,
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    /// Parsed severity floor.
    pub fn min_level(&self) -> Result<LogLevel> {
        self.level.parse()
    }
}

/// Complete assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Catalog JSON file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Minimum token-set score (0-100) for a city match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Snapshot reload policy.
    #[serde(default)]
    pub reload: ReloadPolicy,
    /// Acronym matching settings.
    #[serde(default)]
    pub acronym: AcronymSettings,
    /// City names recognized even when no catalog record is located there.
    #[serde(default = "default_known_cities")]
    pub known_cities: Vec<String>,
    /// Intent and status keywords.
    #[serde(default)]
    pub synonyms: SynonymTable,
    /// Log sink.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            fuzzy_threshold: default_fuzzy_threshold(),
            reload: ReloadPolicy::default(),
            acronym: AcronymSettings::default(),
            known_cities: default_known_cities(),
            synonyms: SynonymTable::default(),
            logging: LoggingSettings::default(),
        }
        .normalized()
    }
}

impl AssistantConfig {
    /// Loads a TOML file; relative paths inside it resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading assistant config {}", path.display()))?;
        let config = Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config.rebased(&base))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config.normalized())
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_threshold > 100 {
            bail!(
                "fuzzy_threshold must be within 0..=100, got {}",
                self.fuzzy_threshold
            );
        }
        if self.acronym.min_len == 0 {
            bail!("acronym.min_len must be at least 1");
        }
        self.logging.min_level()?;
        Ok(())
    }

    /// Returns the config with `catalog_path` pointing at the given file.
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    fn normalized(mut self) -> Self {
        self.known_cities = normalize_keywords(self.known_cities);
        self.synonyms = self.synonyms.normalized();
        self
    }

    fn rebased(mut self, base: &Path) -> Self {
        if self.catalog_path.is_relative() {
            self.catalog_path = base.join(&self.catalog_path);
        }
        if let Some(log_path) = self.logging.path.take() {
            self.logging.path = Some(if log_path.is_relative() {
                base.join(log_path)
            } else {
                log_path
            });
        }
        self
    }
}

fn normalize_keywords(words: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        let word = normalize(&word).trim().to_string();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("universities.json")
}

const fn default_fuzzy_threshold() -> u8 {
    65
}

const fn default_min_acronym_len() -> usize {
    2
}

fn default_log_level() -> String {
    "info".into()
}

fn default_scholarship_keywords() -> Vec<String> {
    owned(&[
        "bourse",
        "aide financière",
        "subvention",
        "financement",
        "aide financiere",
    ])
}

fn default_program_keywords() -> Vec<String> {
    owned(&["formation", "filière", "cursus", "programme", "diplôme"])
}

fn default_website_keywords() -> Vec<String> {
    owned(&["site", "site internet", "lien", "page web"])
}

fn default_public_keywords() -> Vec<String> {
    owned(&[
        "publique",
        "publiques",
        "public",
        "publics",
        "étatique",
        "étatiques",
    ])
}

fn default_private_keywords() -> Vec<String> {
    owned(&["privée", "privées", "privé", "privés"])
}

fn default_known_cities() -> Vec<String> {
    owned(&[
        "casablanca",
        "rabat",
        "marrakech",
        "fès",
        "kenitra",
        "nador",
        "tanger",
        "settat",
        "agadir",
        "oujda",
        "tétouan",
        "eljadida",
        "essaouira",
        "safi",
        "benslimane",
        "khemisset",
        "azilal",
        "taroudant",
        "khouribga",
        "mohammedia",
        "beni mellal",
        "larache",
        "sidi ifni",
        "meknès",
        "oufella",
        "taounate",
        "tiznit",
        "ouarzazate",
        "chichaoua",
        "ifrane",
    ])
}
