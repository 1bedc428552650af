//! Signal store abstraction: reviews, enrichment records, and establishment
//! documents, plus write-back of computed scores.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::InMemorySignalStore;

use crate::scoring::{
    EnrichmentRecord, EstablishmentId, EstablishmentScores, ReviewId, ReviewSignal,
};
use serde::{Deserialize, Serialize};

/// Establishment document. Scoring only ever replaces `scores`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentDocument {
    pub id: EstablishmentId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<EstablishmentScores>,
}

/// Full contents of a store, as persisted by [`JsonFileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub establishments: Vec<EstablishmentDocument>,
    #[serde(default)]
    pub reviews: Vec<ReviewSignal>,
    #[serde(default)]
    pub enrichments: Vec<EnrichmentRecord>,
}

/// Storage abstraction so scoring and publication can run against any
/// document store.
pub trait SignalStore: Send + Sync {
    fn establishment_ids(&self) -> Result<Vec<EstablishmentId>, StoreError>;
    fn establishments(&self) -> Result<Vec<EstablishmentDocument>, StoreError>;
    fn reviews_for(&self, establishment: &EstablishmentId)
        -> Result<Vec<ReviewSignal>, StoreError>;
    fn enrichments_for(&self, reviews: &[ReviewId]) -> Result<Vec<EnrichmentRecord>, StoreError>;
    /// Replaces the establishment's score field-set; returns whether the
    /// stored document changed.
    fn write_scores(
        &self,
        establishment: &EstablishmentId,
        scores: &EstablishmentScores,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("establishment {0} not found")]
    NotFound(EstablishmentId),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("establishment {establishment} has an unreadable record: {reason}")]
    InvalidRecord {
        establishment: EstablishmentId,
        reason: String,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
