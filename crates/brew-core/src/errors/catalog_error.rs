/// Errors raised by the coffee catalog collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("catalog load failed from {source_name}: {reason}")]
    LoadFailed { source_name: String, reason: String },
}
