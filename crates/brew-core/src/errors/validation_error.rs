/// Per-event validation failures. Reported per item, never fatal to a batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid identifier in {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("unknown interaction type: {value}")]
    UnknownInteractionType { value: String },

    #[error("rating events require a value between {min} and {max}")]
    MissingRating { min: f64, max: f64 },

    #[error("rating {value} outside [{min}, {max}]")]
    RatingOutOfRange { value: f64, min: f64, max: f64 },

    #[error("timestamp is not RFC 3339: {value}")]
    MalformedTimestamp { value: String },

    #[error("{reason}")]
    Rejected { reason: String },
}
