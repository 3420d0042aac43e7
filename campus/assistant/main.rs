//! Query and admin entry points over an owned catalog store.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    answer::ResponseGenerator,
    catalog::{parse_upload, CatalogSource, CatalogStats, CatalogStore, UniversityRecord},
    config::{AssistantConfig, ReloadPolicy},
    errors::CatalogResult,
    extract::{EntityExtractor, ExtractedEntities},
    telemetry::AssistantTelemetry,
};

/// Reply when the catalog holds no records.
pub const NO_DATA: &str = "Aucune donnée universitaire n'est disponible pour le moment.";
/// Reply to a blank question.
pub const EMPTY_QUESTION: &str = "Veuillez poser une question.";

/// Session value handed back to the caller with each answer. Questions are
/// answered independently, so the returned context is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext(serde_json::Map<String, serde_json::Value>);

impl ConversationContext {
    /// True when nothing is carried over.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The assistant: extraction and rendering over a lock-guarded catalog.
#[derive(Debug, Clone)]
pub struct CampusAssistant {
    reload: ReloadPolicy,
    store: CatalogStore,
    extractor: EntityExtractor,
    generator: ResponseGenerator,
    telemetry: Option<AssistantTelemetry>,
}

impl CampusAssistant {
    /// Wires the components from config. The catalog is not read yet; call
    /// [`CampusAssistant::rebuild`].
    pub fn open(config: &AssistantConfig) -> Result<Self> {
        let telemetry = AssistantTelemetry::from_settings("campus", &config.logging)?;
        Ok(Self::with_telemetry(config, telemetry))
    }

    /// Same as [`CampusAssistant::open`] with an explicit telemetry handle.
    #[must_use]
    pub fn with_telemetry(config: &AssistantConfig, telemetry: Option<AssistantTelemetry>) -> Self {
        let store = CatalogStore::new(
            CatalogSource::new(config.catalog_path.clone()),
            telemetry.clone(),
        );
        Self {
            reload: config.reload,
            store,
            extractor: EntityExtractor::new(config),
            generator: ResponseGenerator::new(telemetry.clone()),
            telemetry,
        }
    }

    /// Answers one question. `prior` is accepted for session plumbing and not consulted.
    pub fn answer(
        &self,
        question: &str,
        _prior: &ConversationContext,
    ) -> (String, ConversationContext) {
        if self.reload == ReloadPolicy::EveryQuery {
            // failures are logged by the store and leave an empty snapshot
            let _ = self.store.rebuild();
        }
        let snapshot = self.store.snapshot();
        let trace_id = Uuid::new_v4();

        let (text, entities) = if snapshot.is_empty() {
            (NO_DATA.to_string(), None)
        } else if question.trim().is_empty() {
            (EMPTY_QUESTION.to_string(), None)
        } else {
            let entities = self.extractor.extract(question, &snapshot);
            (self.generator.render(&entities, &snapshot), Some(entities))
        };

        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "assistant.answer",
                json!({
                    "trace_id": trace_id,
                    "catalog_version": snapshot.version(),
                    "entities": entities,
                    "lines": text.lines().count(),
                }),
            );
        }
        (text, ConversationContext::default())
    }

    /// Entities the extractor finds in `question`, without rendering.
    #[must_use]
    pub fn extract(&self, question: &str) -> ExtractedEntities {
        self.extractor.extract(question, &self.store.snapshot())
    }

    /// Re-derives every index from the catalog file.
    pub fn rebuild(&self) -> CatalogResult<usize> {
        self.store.rebuild()
    }

    /// Admin view of the catalog: creates an empty catalog file when none
    /// exists yet, then rebuilds.
    pub fn ensure_catalog(&self) -> CatalogResult<usize> {
        self.store.ensure_source()
    }

    /// Admin upload of a raw JSON body: validate, replace the file atomically, rebuild.
    pub fn upload(&self, raw_json: &str) -> CatalogResult<usize> {
        let records = parse_upload(raw_json)?;
        self.replace_catalog(&records)
    }

    /// Replaces the catalog with `records` and rebuilds.
    pub fn replace_catalog(&self, records: &[UniversityRecord]) -> CatalogResult<usize> {
        self.store.replace(records)
    }

    /// Records sorted by name.
    #[must_use]
    pub fn listing(&self) -> Vec<UniversityRecord> {
        self.store
            .snapshot()
            .listing()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Public/private counts of the current snapshot.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        self.store.snapshot().stats()
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &CatalogStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{answer::HELP, errors::CatalogError};
    use serde_json::json;
    use std::{fs, path::Path};
    use tempfile::tempdir;

    fn write_catalog(path: &Path, body: &serde_json::Value) {
        fs::write(path, serde_json::to_vec_pretty(body).unwrap()).unwrap();
    }

    fn ehtp_catalog() -> serde_json::Value {
        json!([{
            "nom": "EHTP",
            "ville": "Casablanca",
            "statut": "Publique",
            "site_web": "ehtp.ac.ma",
            "bourses": "Mérite",
            "type_bourse": "Excellence",
            "formations": ["Génie Civil", "Informatique"]
        }])
    }

    fn assistant_at(path: &Path) -> CampusAssistant {
        let config = AssistantConfig::default().with_catalog_path(path);
        CampusAssistant::with_telemetry(&config, None)
    }

    fn ask(assistant: &CampusAssistant, question: &str) -> String {
        assistant.answer(question, &ConversationContext::default()).0
    }

    #[test]
    fn answers_programs_for_a_named_school() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(&path, &ehtp_catalog());
        let assistant = assistant_at(&path);
        assistant.rebuild().unwrap();

        let (text, context) =
            assistant.answer("formations à l'EHTP", &ConversationContext::default());
        assert_eq!(text, "🎓 Formations proposées : Génie Civil, Informatique");
        assert!(context.is_empty());
    }

    #[test]
    fn known_city_without_universities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(&path, &ehtp_catalog());
        let assistant = assistant_at(&path);
        assistant.rebuild().unwrap();

        assert_eq!(
            ask(&assistant, "universités à rabat"),
            "Aucune université trouvée à Rabat"
        );
        assert_eq!(
            ask(&assistant, "universités à Casablanca"),
            "🏫 Universités à Casablanca (1) :\n- EHTP (Publique): ehtp.ac.ma"
        );
        assert_eq!(ask(&assistant, "bonjour"), HELP);
        assert_eq!(ask(&assistant, "   "), EMPTY_QUESTION);
    }

    #[test]
    fn empty_or_broken_catalog_degrades_to_no_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        fs::write(&path, "[]").unwrap();
        let assistant = assistant_at(&path);
        assert_eq!(assistant.rebuild().unwrap(), 0);
        assert_eq!(ask(&assistant, "formations à l'EHTP"), NO_DATA);

        fs::write(&path, "{ broken").unwrap();
        assert!(matches!(
            assistant.rebuild(),
            Err(CatalogError::SourceMalformed { .. })
        ));
        assert_eq!(ask(&assistant, "universités à rabat"), NO_DATA);

        let missing = assistant_at(&dir.path().join("absent.json"));
        assert!(missing.rebuild().is_err());
        assert_eq!(ask(&missing, ""), NO_DATA);
    }

    #[test]
    fn status_filter_on_city_answers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(
            &path,
            &json!([
                { "nom": "Université Mohammed V", "ville": "Rabat", "statut": "Publique", "site_web": "um5.ac.ma" },
                { "nom": "Université Internationale de Rabat", "ville": "Rabat", "statut": "Privée", "site_web": "uir.ac.ma" }
            ]),
        );
        let assistant = assistant_at(&path);
        assistant.rebuild().unwrap();
        assert_eq!(
            ask(&assistant, "universités publiques à rabat"),
            "🏫 Universités à Rabat (1) :\n- Université Mohammed V (Publique): um5.ac.ma"
        );
        assert_eq!(
            ask(&assistant, "écoles privées à Rabat"),
            "🏫 Universités à Rabat (1) :\n- Université Internationale de Rabat (Privée): uir.ac.ma"
        );
    }

    #[test]
    fn upload_replaces_catalog_and_invalidates_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(&path, &ehtp_catalog());
        let assistant = assistant_at(&path);
        assistant.rebuild().unwrap();
        let before = assistant.store().version();

        let count = assistant
            .upload(r#"[{"nom": "ENSIAS", "ville": "Rabat", "statut": "Publique", "site_web": "ensias.um5.ac.ma"}]"#)
            .unwrap();
        assert_eq!(count, 1);
        assert!(assistant.store().version() > before);
        assert_eq!(
            ask(&assistant, "le site de l'ENSIAS ?"),
            "🌐 Site web : ensias.um5.ac.ma"
        );
        assert_eq!(assistant.stats().public, 1);
        assert_eq!(assistant.listing()[0].name, "ENSIAS");

        assert!(matches!(
            assistant.upload(r#"{"nom": "ENSIAS"}"#),
            Err(CatalogError::InvalidUpload(_))
        ));
        assert_eq!(assistant.listing().len(), 1);
    }

    #[test]
    fn help_examples_resolve_to_their_templates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(&path, &ehtp_catalog());
        let assistant = assistant_at(&path);
        assistant.rebuild().unwrap();
        assert_eq!(
            ask(&assistant, "Présentez-moi l'EHTP"),
            "🏛️ EHTP (Publique)\n📍 Ville : Casablanca\n🌐 Site web : ehtp.ac.ma"
        );
        assert_eq!(
            ask(&assistant, "Quelles formations propose l'EHTP ?"),
            "🎓 Formations proposées : Génie Civil, Informatique"
        );
    }

    #[test]
    fn admin_view_creates_missing_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/universities.json");
        let assistant = assistant_at(&path);
        assert_eq!(assistant.ensure_catalog().unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(assistant.listing().is_empty());
        assert_eq!(ask(&assistant, "formations à l'EHTP"), NO_DATA);
    }

    #[test]
    fn every_query_policy_sees_file_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        fs::write(&path, "[]").unwrap();
        let mut config = AssistantConfig::default().with_catalog_path(&path);
        config.reload = ReloadPolicy::EveryQuery;
        let assistant = CampusAssistant::with_telemetry(&config, None);
        assert_eq!(ask(&assistant, "formations à l'EHTP"), NO_DATA);

        write_catalog(&path, &ehtp_catalog());
        assert_eq!(
            ask(&assistant, "formations à l'EHTP"),
            "🎓 Formations proposées : Génie Civil, Informatique"
        );
    }

    #[test]
    fn answers_are_logged_with_trace_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universities.json");
        write_catalog(&path, &ehtp_catalog());
        let log_path = dir.path().join("campus.log");
        let telemetry = AssistantTelemetry::builder("campus")
            .log_path(&log_path)
            .build()
            .unwrap();
        let config = AssistantConfig::default().with_catalog_path(&path);
        let assistant = CampusAssistant::with_telemetry(&config, Some(telemetry));
        assistant.rebuild().unwrap();
        ask(&assistant, "bourses EHTP");

        let log = fs::read_to_string(log_path).unwrap();
        assert!(log.contains("catalog.rebuild.complete"));
        assert!(log.contains("assistant.answer"));
        assert!(log.contains("trace_id"));
        assert!(log.contains("\"intent\":\"scholarships\""));
    }
}
