use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use uuid::Uuid;

use crate::{
    catalog::record::UniversityRecord,
    errors::{CatalogError, CatalogResult},
};

/// JSON file holding the catalog as an array of university objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    path: PathBuf,
}

impl CatalogSource {
    /// Points at the catalog file; nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Catalog file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and validates the whole catalog. Nothing partial is ever returned.
    pub fn load(&self) -> CatalogResult<Vec<UniversityRecord>> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            CatalogError::SourceUnreadable {
                path: self.path.clone(),
                source,
            }
        })?;
        let records: Vec<UniversityRecord> =
            serde_json::from_str(&raw).map_err(|err| self.malformed(err.to_string()))?;
        if let Some(position) = records.iter().position(|r| r.name.trim().is_empty()) {
            return Err(self.malformed(format!("record #{position} has a blank `nom`")));
        }
        Ok(records)
    }

    /// Creates the file holding an empty array when it does not exist yet.
    pub fn ensure_exists(&self) -> CatalogResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        self.write_atomically(b"[]")
    }

    /// Validates `records` and swaps them in through a temp file + rename.
    pub fn replace(&self, records: &[UniversityRecord]) -> CatalogResult<usize> {
        validate_upload(records)?;
        let body = serde_json::to_vec_pretty(records)
            .map_err(|err| CatalogError::InvalidUpload(err.to_string()))?;
        self.write_atomically(&body)?;
        Ok(records.len())
    }

    fn write_atomically(&self, body: &[u8]) -> CatalogResult<()> {
        let temp = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_failed(parent))?;
            }
        }
        fs::write(&temp, body).map_err(write_failed(&temp))?;
        fs::rename(&temp, &self.path).map_err(write_failed(&self.path))
    }

    fn malformed(&self, reason: String) -> CatalogError {
        CatalogError::SourceMalformed {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Parses an admin upload body: it must be a JSON array of objects, each with a name.
pub fn parse_upload(raw: &str) -> CatalogResult<Vec<UniversityRecord>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| CatalogError::InvalidUpload(err.to_string()))?;
    let Value::Array(items) = &value else {
        return Err(CatalogError::InvalidUpload(
            "the body must be an array of universities, e.g. [{\"nom\": \"...\", \"ville\": \"...\"}]"
                .into(),
        ));
    };
    if let Some(position) = items.iter().position(|item| !item.is_object()) {
        return Err(CatalogError::InvalidUpload(format!(
            "item #{position} is not an object"
        )));
    }
    let records: Vec<UniversityRecord> = serde_json::from_value(value)
        .map_err(|err| CatalogError::InvalidUpload(err.to_string()))?;
    validate_upload(&records)?;
    Ok(records)
}

fn write_failed(path: &Path) -> impl FnOnce(io::Error) -> CatalogError {
    let path = path.to_path_buf();
    move |source| CatalogError::SourceWrite { path, source }
}

fn validate_upload(records: &[UniversityRecord]) -> CatalogResult<()> {
    if let Some(position) = records.iter().position(|r| r.name.trim().is_empty()) {
        return Err(CatalogError::InvalidUpload(format!(
            "record #{position} has a blank `nom`"
        )));
    }
    Ok(())
}
