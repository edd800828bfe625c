/// Configuration errors: bad config files and rejected deploy / experiment definitions.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("model {name} version {version} is already deployed")]
    DuplicateModelVersion { name: String, version: String },

    #[error("ab test {test_id} already exists")]
    DuplicateAbTest { test_id: String },

    #[error("traffic shares must sum to 1.0, got {sum:.6}")]
    TrafficShareSum { sum: f64 },

    #[error("unknown algorithm: {name}")]
    UnknownAlgorithm { name: String },
}
