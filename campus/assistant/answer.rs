use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    catalog::{CatalogSnapshot, UniversityRecord},
    errors::{CatalogError, CatalogResult},
    extract::{ExtractedEntities, Intent},
    telemetry::AssistantTelemetry,
};

/// Reply when the named university is not in the snapshot.
pub const UNKNOWN_UNIVERSITY: &str =
    "Désolé, je n'ai trouvé aucune information sur cette université.";

/// Reply when no entity could be extracted.
pub const HELP: &str = "Je peux vous renseigner sur les universités du catalogue. Exemples :\n\
- Formations : « Quelles formations propose l'EHTP ? »\n\
- Bourses : « Quelles bourses offre l'UIR ? »\n\
- Site web : « Quel est le site de l'ENSIAS ? »\n\
- Présentation : « Présentez-moi l'EHTP »\n\
- Ville : « Universités publiques à Rabat »";

const UNAVAILABLE: &str = "information non disponible";
const NO_STATUS: &str = "statut non renseigné";

/// Renders extracted entities into the reply text.
///
/// Rendering is deterministic and never fails: missing record fields become a
/// placeholder and are logged at debug level.
#[derive(Debug, Clone, Default)]
pub struct ResponseGenerator {
    telemetry: Option<AssistantTelemetry>,
}

impl ResponseGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new(telemetry: Option<AssistantTelemetry>) -> Self {
        Self { telemetry }
    }

    /// University branch first, then city branch, then the help text.
    #[must_use]
    pub fn render(&self, entities: &ExtractedEntities, snapshot: &CatalogSnapshot) -> String {
        let lines = if let Some(name) = &entities.university {
            snapshot.find(name).map_or_else(
                || vec![UNKNOWN_UNIVERSITY.to_string()],
                |record| self.university_lines(record, entities.intent),
            )
        } else if let Some(city) = &entities.city {
            self.city_lines(city, entities, snapshot)
        } else {
            vec![HELP.to_string()]
        };
        lines.join("\n")
    }

    fn university_lines(&self, record: &UniversityRecord, intent: Option<Intent>) -> Vec<String> {
        match intent {
            Some(Intent::Scholarships) => vec![
                format!(
                    "💰 Bourses : {}",
                    self.or_unavailable(record.require_scholarships())
                ),
                format!(
                    "📋 Type de bourse : {}",
                    self.or_unavailable(record.require_scholarship_type())
                ),
            ],
            Some(Intent::Programs) => match record.require_programs() {
                Ok(programs) => vec![format!(
                    "🎓 Formations proposées : {}",
                    programs
                        .iter()
                        .map(|p| p.trim())
                        .filter(|p| !p.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ")
                )],
                Err(err) => {
                    self.field_missing(&err);
                    vec![format!("🎓 Aucune formation renseignée pour {}", record.name)]
                }
            },
            Some(Intent::Website) => vec![format!(
                "🌐 Site web : {}",
                self.or_unavailable(record.require_website())
            )],
            None => vec![
                format!("🏛️ {} ({})", record.name, self.status_label(record)),
                format!("📍 Ville : {}", non_blank(&record.city).unwrap_or(UNAVAILABLE)),
                format!(
                    "🌐 Site web : {}",
                    self.or_unavailable(record.require_website())
                ),
            ],
        }
    }

    fn city_lines(
        &self,
        city: &str,
        entities: &ExtractedEntities,
        snapshot: &CatalogSnapshot,
    ) -> Vec<String> {
        let mut group = snapshot.universities_in(city);
        if let Some(status) = entities.status {
            group.retain(|record| record.status == Some(status));
        }
        let display = capitalize(city);
        if group.is_empty() {
            return vec![format!("Aucune université trouvée à {display}")];
        }
        let mut lines = Vec::with_capacity(group.len() + 1);
        lines.push(format!("🏫 Universités à {display} ({}) :", group.len()));
        lines.extend(group.into_iter().map(|record| {
            format!(
                "- {} ({}): {}",
                record.name,
                self.status_label(record),
                self.or_unavailable(record.require_website())
            )
        }));
        lines
    }

    fn status_label(&self, record: &UniversityRecord) -> &'static str {
        match record.require_status() {
            Ok(status) => status.label(),
            Err(err) => {
                self.field_missing(&err);
                NO_STATUS
            }
        }
    }

    fn or_unavailable<'r>(&self, value: CatalogResult<&'r str>) -> &'r str {
        value.unwrap_or_else(|err| {
            self.field_missing(&err);
            UNAVAILABLE
        })
    }

    fn field_missing(&self, err: &CatalogError) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Debug,
                "render.field_missing",
                json!({ "error": err.to_string() }),
            );
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Status;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![
                UniversityRecord::new("EHTP", "Casablanca")
                    .with_status(Status::Public)
                    .with_website("ehtp.ac.ma")
                    .with_scholarships("Mérite", "Excellence")
                    .with_programs(["Génie Civil", "Informatique"]),
                UniversityRecord::new("UM5", "Rabat")
                    .with_status(Status::Public)
                    .with_website("um5.ac.ma"),
                UniversityRecord::new("UIR", "Rabat")
                    .with_status(Status::Private)
                    .with_website("uir.ac.ma"),
                UniversityRecord::new("Institut Sans Fiche", ""),
            ],
            1,
        )
    }

    fn about(name: &str, intent: Option<Intent>) -> ExtractedEntities {
        ExtractedEntities {
            university: Some(name.into()),
            intent,
            ..ExtractedEntities::default()
        }
    }

    fn in_city(city: &str, status: Option<Status>) -> ExtractedEntities {
        ExtractedEntities {
            city: Some(city.into()),
            status,
            ..ExtractedEntities::default()
        }
    }

    #[test]
    fn university_templates_follow_intent() {
        let generator = ResponseGenerator::default();
        let snapshot = snapshot();
        assert_eq!(
            generator.render(&about("EHTP", Some(Intent::Programs)), &snapshot),
            "🎓 Formations proposées : Génie Civil, Informatique"
        );
        assert_eq!(
            generator.render(&about("EHTP", Some(Intent::Scholarships)), &snapshot),
            "💰 Bourses : Mérite\n📋 Type de bourse : Excellence"
        );
        assert_eq!(
            generator.render(&about("EHTP", Some(Intent::Website)), &snapshot),
            "🌐 Site web : ehtp.ac.ma"
        );
        assert_eq!(
            generator.render(&about("EHTP", None), &snapshot),
            "🏛️ EHTP (Publique)\n📍 Ville : Casablanca\n🌐 Site web : ehtp.ac.ma"
        );
    }

    #[test]
    fn missing_fields_degrade_per_line() {
        let generator = ResponseGenerator::default();
        let snapshot = snapshot();
        assert_eq!(
            generator.render(&about("Institut Sans Fiche", None), &snapshot),
            "🏛️ Institut Sans Fiche (statut non renseigné)\n\
             📍 Ville : information non disponible\n\
             🌐 Site web : information non disponible"
        );
        assert_eq!(
            generator.render(&about("UM5", Some(Intent::Programs)), &snapshot),
            "🎓 Aucune formation renseignée pour UM5"
        );
        assert_eq!(
            generator.render(&about("UM5", Some(Intent::Scholarships)), &snapshot),
            "💰 Bourses : information non disponible\n📋 Type de bourse : information non disponible"
        );
    }

    #[test]
    fn unknown_university_gets_fixed_message() {
        let generator = ResponseGenerator::default();
        assert_eq!(
            generator.render(&about("Nulle Part", Some(Intent::Website)), &snapshot()),
            UNKNOWN_UNIVERSITY
        );
    }

    #[test]
    fn city_listing_and_status_filter() {
        let generator = ResponseGenerator::default();
        let snapshot = snapshot();
        assert_eq!(
            generator.render(&in_city("rabat", None), &snapshot),
            "🏫 Universités à Rabat (2) :\n- UM5 (Publique): um5.ac.ma\n- UIR (Privée): uir.ac.ma"
        );
        assert_eq!(
            generator.render(&in_city("rabat", Some(Status::Public)), &snapshot),
            "🏫 Universités à Rabat (1) :\n- UM5 (Publique): um5.ac.ma"
        );
        assert_eq!(
            generator.render(&in_city("casablanca", Some(Status::Private)), &snapshot),
            "Aucune université trouvée à Casablanca"
        );
        assert_eq!(
            generator.render(&in_city("beni mellal", None), &snapshot),
            "Aucune université trouvée à Beni mellal"
        );
    }

    #[test]
    fn nothing_extracted_gives_help() {
        let text = ResponseGenerator::default().render(&ExtractedEntities::default(), &snapshot());
        assert_eq!(text, HELP);
        assert!(!text.ends_with('\n'));
    }
}
