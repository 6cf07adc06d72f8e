pub mod catalog;
pub mod exchange;
pub mod line_feed;
pub mod types;

use crate::engine::NormalizeError;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use types::RawMatch;

/// One fetched response, flattened into raw records.
#[derive(Debug, Default)]
pub struct FeedPage {
    pub records: Vec<RawMatch>,
    /// Entries that were not objects or failed to decode.
    pub skipped: usize,
}

#[async_trait]
pub trait MatchFeed: Send + Sync {
    type Query: Send + Sync;

    async fn fetch_matches(&self, query: &Self::Query) -> Result<FeedPage>;
}

/// Decode one array element, rejecting non-objects before serde sees them.
pub(crate) fn decode_record<T>(value: Value) -> Result<T, NormalizeError>
where
    T: serde::de::DeserializeOwned,
{
    if !value.is_object() {
        return Err(NormalizeError::NotAnObject);
    }
    serde_json::from_value(value).map_err(|e| NormalizeError::Malformed(e.to_string()))
}
