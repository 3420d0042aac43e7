use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    errors::{CatalogError, CatalogResult},
    text::normalize,
};

/// Legal status of a university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// State-run.
    #[serde(rename = "Publique", alias = "Public")]
    Public,
    /// Privately run.
    #[serde(rename = "Privée", alias = "Private", alias = "Privee")]
    Private,
}

impl Status {
    /// Display label, as written in the catalog file.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Public => "Publique",
            Self::Private => "Privée",
        }
    }

    /// Accepts French or English spellings in any case or accentuation.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match normalize(raw).trim() {
            "publique" | "public" => Some(Self::Public),
            "privee" | "prive" | "private" => Some(Self::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One catalog entry. Keys follow the catalog file (`nom`, `ville`, ...); the
/// English names are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityRecord {
    /// Display name, unique within the catalog.
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
    /// Free-form city name.
    #[serde(rename = "ville", alias = "city", default)]
    pub city: String,
    /// Public or private; unknown spellings load as absent.
    #[serde(
        rename = "statut",
        alias = "status",
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Status>,
    /// Website URL.
    #[serde(
        rename = "site_web",
        alias = "website",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<String>,
    /// Scholarship description.
    #[serde(
        rename = "bourses",
        alias = "scholarships",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scholarships: Option<String>,
    /// Scholarship category.
    #[serde(
        rename = "type_bourse",
        alias = "scholarshipType",
        alias = "scholarship_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scholarship_type: Option<String>,
    /// Offered programs, in catalog order.
    #[serde(rename = "formations", alias = "programs", default)]
    pub programs: Vec<String>,
}

impl UniversityRecord {
    /// Creates a record with only a name and a city.
    #[must_use]
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            status: None,
            website: None,
            scholarships: None,
            scholarship_type: None,
            programs: Vec::new(),
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the website.
    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Sets scholarship description and category.
    #[must_use]
    pub fn with_scholarships(
        mut self,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.scholarships = Some(description.into());
        self.scholarship_type = Some(kind.into());
        self
    }

    /// Sets the program list.
    #[must_use]
    pub fn with_programs<I, S>(mut self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.programs = programs.into_iter().map(Into::into).collect();
        self
    }

    /// Status, or `RecordFieldMissing`.
    pub fn require_status(&self) -> CatalogResult<Status> {
        self.status.ok_or_else(|| self.missing("statut"))
    }

    /// Non-blank website, or `RecordFieldMissing`.
    pub fn require_website(&self) -> CatalogResult<&str> {
        self.present(self.website.as_deref(), "site_web")
    }

    /// Non-blank scholarship description, or `RecordFieldMissing`.
    pub fn require_scholarships(&self) -> CatalogResult<&str> {
        self.present(self.scholarships.as_deref(), "bourses")
    }

    /// Non-blank scholarship category, or `RecordFieldMissing`.
    pub fn require_scholarship_type(&self) -> CatalogResult<&str> {
        self.present(self.scholarship_type.as_deref(), "type_bourse")
    }

    /// Non-empty program list, or `RecordFieldMissing`.
    pub fn require_programs(&self) -> CatalogResult<&[String]> {
        if self.programs.iter().all(|p| p.trim().is_empty()) {
            return Err(self.missing("formations"));
        }
        Ok(&self.programs)
    }

    fn present<'a>(&self, value: Option<&'a str>, field: &'static str) -> CatalogResult<&'a str> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| self.missing(field))
    }

    fn missing(&self, field: &'static str) -> CatalogError {
        CatalogError::RecordFieldMissing {
            university: self.name.clone(),
            field,
        }
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<Status>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Status::parse_lenient))
}
