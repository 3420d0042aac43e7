use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

use crate::config::LoggingSettings;

/// Builder configuring assistant telemetry.
pub struct AssistantTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl AssistantTelemetryBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Info,
        }
    }

    /// Sets the JSON log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the severity floor.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Finalizes the builder.
    pub fn build(self) -> Result<AssistantTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(JsonLogger::with_min_level(path, self.min_level)?),
            None => None,
        };
        Ok(AssistantTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
            }),
        })
    }
}

/// Cloneable logging handle shared by the catalog store and the assistant.
#[derive(Clone)]
pub struct AssistantTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for AssistantTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantTelemetry")
            .field("module", &self.inner.module)
            .field("sink", &self.inner.logger.as_ref().map(JsonLogger::path))
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
}

impl AssistantTelemetry {
    /// Returns a builder for this telemetry helper.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> AssistantTelemetryBuilder {
        AssistantTelemetryBuilder::new(module)
    }

    /// Builds telemetry from config; `None` when no log path is configured.
    pub fn from_settings(
        module: impl Into<String>,
        settings: &LoggingSettings,
    ) -> Result<Option<Self>> {
        let Some(path) = &settings.path else {
            return Ok(None);
        };
        Self::builder(module)
            .log_path(path)
            .min_level(settings.min_level()?)
            .build()
            .map(Some)
    }

    /// Logs a structured record.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message).with_fields(metadata);
            logger.log(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_to_configured_sink() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("assistant.log");
        let telemetry = AssistantTelemetry::builder("assistant")
            .log_path(&log_path)
            .min_level(LogLevel::Debug)
            .build()
            .unwrap();
        telemetry
            .log(
                LogLevel::Debug,
                "assistant.answer",
                json!({ "intent": "programs" }),
            )
            .unwrap();
        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("assistant.answer"));
        assert!(content.contains("\"intent\":\"programs\""));
    }

    #[test]
    fn settings_without_path_disable_telemetry() {
        let settings = LoggingSettings::default();
        assert!(AssistantTelemetry::from_settings("assistant", &settings)
            .unwrap()
            .is_none());
    }
}
