//! Error types for quest-core operations.
//!
//! Network failures of a path or quest lookup are *not* errors at this level:
//! they are captured into the store as `Failure` outcomes. `QuestError` covers
//! everything that is returned to the immediate caller instead.

/// All errors that can occur in quest-core operations.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid API base URL {url}: {details}")]
    InvalidApiUrl { url: String, details: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    // ─────────────────────────────────────────────────────────────────────
    // Parameter Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Unknown parameter field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {details}")]
    InvalidFieldValue { field: String, details: String },

    #[error("Action index {index} out of range (path has {len} actions)")]
    ActionOutOfRange { index: usize, len: usize },

    // ─────────────────────────────────────────────────────────────────────
    // Host Platform Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Host operation {operation} failed for {target}: {reason}")]
    Host {
        operation: &'static str,
        target: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Sync Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("No cross-window sync strategy available (hub: {hub}; journal: {journal})")]
    NoSyncStrategy { hub: String, journal: String },

    #[error("Sync transport failed: {0}")]
    Sync(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl QuestError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        QuestError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        QuestError::Json {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using QuestError.
pub type Result<T> = std::result::Result<T, QuestError>;

// Conversion for string error compatibility at binary edges
impl From<QuestError> for String {
    fn from(err: QuestError) -> String {
        err.to_string()
    }
}
