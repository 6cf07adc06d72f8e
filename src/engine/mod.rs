pub mod live_score;
pub mod misc;
pub mod normalizer;
pub mod odds;
pub mod slug;
pub mod start_time;

pub use normalizer::{BatchOutcome, MatchRecordNormalizer, NormalizedMatch};

/// Per-record failures. Everything else is recovered inside the normalizer
/// as a null field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record could not be decoded: {0}")]
    Malformed(String),
    #[error("record has neither an id nor team names")]
    MissingIdentity,
    #[error("invalid start timestamp: {0}")]
    InvalidTimestamp(String),
}
