//! Error types for schema discovery.

use thiserror::Error;

/// Main error type for schema discovery operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No driver is registered under this engine identifier.
    #[error("Unknown database engine: '{0}'")]
    UnknownEngine(String),

    /// The engine could not be reached, authenticated against, or a
    /// connection could not be acquired.
    #[error("[{engine}] connection failed: {message}")]
    Connectivity { engine: String, message: String },

    /// A catalog sub-query was rejected by the engine.
    #[error("[{engine}] catalog query for {section} failed: {message}")]
    CatalogQuery {
        engine: String,
        section: String,
        message: String,
    },

    /// A statement failed before any engine/section context was attached.
    #[error("Statement failed: {0}")]
    Statement(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a Connectivity error for an engine.
    pub fn connectivity(engine: impl Into<String>, message: impl ToString) -> Self {
        ProbeError::Connectivity {
            engine: engine.into(),
            message: message.to_string(),
        }
    }

    /// Create a CatalogQuery error for one logical section.
    pub fn catalog_query(
        engine: impl Into<String>,
        section: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ProbeError::CatalogQuery {
            engine: engine.into(),
            section: section.into(),
            message: message.into(),
        }
    }

    /// Attach catalog context to an executor failure.
    ///
    /// Connectivity failures keep their category (with the engine filled in
    /// if the executor left it empty); raw statement failures become
    /// [`ProbeError::CatalogQuery`] for `section`.
    pub fn in_section(self, engine: &str, section: &str) -> Self {
        match self {
            ProbeError::Statement(message) => Self::catalog_query(engine, section, message),
            ProbeError::Connectivity { engine: e, message } if e.is_empty() => {
                Self::connectivity(engine, message)
            }
            other => other,
        }
    }

    /// Whether this error means the engine was unreachable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ProbeError::Connectivity { .. })
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProbeError::Config(_)
            | ProbeError::UnknownEngine(_)
            | ProbeError::Yaml(_)
            | ProbeError::Io(_) => 2,
            ProbeError::Connectivity { .. } => 3,
            ProbeError::CatalogQuery { .. } => 4,
            ProbeError::Statement(_) | ProbeError::Json(_) => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema discovery operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
