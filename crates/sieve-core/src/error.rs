//! Error types for sieve-core

use sieve_config::ConfigError;
use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use sieve_purge::ScanError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SieveError {
    /// The configuration record is malformed. Raised before any merging.
    #[error("{message}")]
    ConfigParse {
        message: String,
        diagnostics: Vec<DiagnosticMessage>,
    },

    #[error("plugin `{name}` is not registered (available: {})", available.join(", "))]
    PluginResolution { name: String, available: Vec<String> },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to read {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SieveError {
    /// A malformed-record error built from the diagnostics collected so far.
    pub(crate) fn config_parse(diagnostics: Vec<DiagnosticMessage>) -> Self {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let message = match diagnostics.iter().find(|d| d.is_error()) {
            Some(first) if errors == 1 => format!("invalid configuration: {}", first.title),
            Some(first) => format!("invalid configuration: {} (and {} more)", first.title, errors - 1),
            None => "invalid configuration".to_string(),
        };
        SieveError::ConfigParse {
            message,
            diagnostics,
        }
    }

    /// Diagnostics describing this error, for rendering to the user.
    pub fn diagnostics(&self) -> Vec<DiagnosticMessage> {
        match self {
            SieveError::ConfigParse { diagnostics, .. } => diagnostics.clone(),
            SieveError::PluginResolution { name, available } => {
                let mut builder = DiagnosticMessageBuilder::error("Unresolved plugin")
                    .with_code("S-3-1")
                    .problem(format!("Plugin `{}` must be registered before it can be used", name));
                builder = if available.is_empty() {
                    builder.add_info("No plugins are registered")
                } else {
                    builder.add_info(format!("Registered plugins: {}", available.join(", ")))
                };
                vec![builder.add_hint("Is the plugin name spelled correctly?").build()]
            }
            SieveError::Config(err) => vec![err.to_diagnostic()],
            SieveError::Scan(err) => vec![err.to_diagnostic()],
            SieveError::ReadConfig { path, source } => vec![
                DiagnosticMessageBuilder::error("Configuration file could not be read")
                    .with_code("S-1-1")
                    .problem(source.to_string())
                    .with_location(path.display().to_string())
                    .build(),
            ],
        }
    }
}

pub type Result<T> = std::result::Result<T, SieveError>;
