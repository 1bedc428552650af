use super::{EstablishmentDocument, InMemorySignalStore, SignalStore, StoreError, StoreSnapshot};
use crate::scoring::{
    EnrichmentRecord, EstablishmentId, EstablishmentScores, ReviewId, ReviewSignal,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store backed by a single JSON snapshot on disk. Every score write is
/// persisted through a temp file and rename before it becomes visible in
/// memory.
///
/// Review and enrichment records are decoded one at a time. A record that
/// does not decode fails its own establishment, which is reported by
/// [`SignalStore::reviews_for`], and leaves the rest of the store usable.
/// Such records are written back to disk as they were read.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: InMemorySignalStore,
    rejected: BTreeMap<EstablishmentId, String>,
    unreadable_reviews: Vec<Value>,
    unreadable_enrichments: Vec<Value>,
    persist: Mutex<()>,
}

// On-disk layout with signal records kept undecoded.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    establishments: Vec<EstablishmentDocument>,
    #[serde(default)]
    reviews: Vec<Value>,
    #[serde(default)]
    enrichments: Vec<Value>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path)?;
        let raw: RawSnapshot = serde_json::from_str(&raw)?;

        let mut rejected = BTreeMap::new();
        // Unreadable records that cannot be tied to an establishment.
        let mut orphaned = 0usize;

        let mut reviews = Vec::with_capacity(raw.reviews.len());
        let mut unreadable_reviews = Vec::new();
        for value in raw.reviews {
            let id = string_field(&value, "id");
            let owner = string_field(&value, "establishment_id").map(EstablishmentId);
            match ReviewSignal::deserialize(&value) {
                Ok(review) => reviews.push(review),
                Err(err) => {
                    tracing::warn!(review = ?id, establishment = ?owner, error = %err, "unreadable review record");
                    match owner {
                        Some(owner) => {
                            rejected
                                .entry(owner)
                                .or_insert_with(|| format!("review {}: {err}", id.as_deref().unwrap_or("<no id>")));
                        }
                        None => orphaned += 1,
                    }
                    unreadable_reviews.push(value);
                }
            }
        }

        let owners: HashMap<&str, &EstablishmentId> = reviews
            .iter()
            .map(|review| (review.id.0.as_str(), &review.establishment_id))
            .collect();
        let mut enrichments = Vec::with_capacity(raw.enrichments.len());
        let mut unreadable_enrichments = Vec::new();
        for value in raw.enrichments {
            let id = string_field(&value, "id");
            let owner = string_field(&value, "establishment_id")
                .map(EstablishmentId)
                .or_else(|| {
                    id.as_deref()
                        .and_then(|id| owners.get(id))
                        .map(|owner| (*owner).clone())
                });
            match EnrichmentRecord::deserialize(&value) {
                Ok(record) => enrichments.push(record),
                Err(err) => {
                    tracing::warn!(review = ?id, establishment = ?owner, error = %err, "unreadable enrichment record");
                    match owner {
                        Some(owner) => {
                            rejected
                                .entry(owner)
                                .or_insert_with(|| format!("enrichment {}: {err}", id.as_deref().unwrap_or("<no id>")));
                        }
                        None => orphaned += 1,
                    }
                    unreadable_enrichments.push(value);
                }
            }
        }

        let snapshot = StoreSnapshot {
            establishments: raw.establishments,
            reviews,
            enrichments,
        };

        tracing::debug!(
            path = %path.display(),
            establishments = snapshot.establishments.len(),
            reviews = snapshot.reviews.len(),
            enrichments = snapshot.enrichments.len(),
            rejected = rejected.len(),
            orphaned,
            "signal store loaded"
        );

        Ok(Self {
            path,
            memory: InMemorySignalStore::new(snapshot),
            rejected,
            unreadable_reviews,
            unreadable_enrichments,
            persist: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, snapshot: &StoreSnapshot) -> Result<Vec<u8>, StoreError> {
        let mut document = serde_json::to_value(snapshot)?;
        for (key, records) in [
            ("reviews", &self.unreadable_reviews),
            ("enrichments", &self.unreadable_enrichments),
        ] {
            if let Some(Value::Array(items)) = document.get_mut(key) {
                items.extend(records.iter().cloned());
            }
        }
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let encoded = self.encode(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

impl SignalStore for JsonFileStore {
    fn establishment_ids(&self) -> Result<Vec<EstablishmentId>, StoreError> {
        self.memory.establishment_ids()
    }

    fn establishments(&self) -> Result<Vec<EstablishmentDocument>, StoreError> {
        self.memory.establishments()
    }

    fn reviews_for(
        &self,
        establishment: &EstablishmentId,
    ) -> Result<Vec<ReviewSignal>, StoreError> {
        if let Some(reason) = self.rejected.get(establishment) {
            return Err(StoreError::InvalidRecord {
                establishment: establishment.clone(),
                reason: reason.clone(),
            });
        }
        self.memory.reviews_for(establishment)
    }

    fn enrichments_for(&self, reviews: &[ReviewId]) -> Result<Vec<EnrichmentRecord>, StoreError> {
        self.memory.enrichments_for(reviews)
    }

    fn write_scores(
        &self,
        establishment: &EstablishmentId,
        scores: &EstablishmentScores,
    ) -> Result<bool, StoreError> {
        let _guard = self
            .persist
            .lock()
            .map_err(|_| StoreError::Unavailable("persist mutex poisoned".to_string()))?;

        let mut candidate = self.memory.snapshot()?;
        let document = candidate
            .establishments
            .iter_mut()
            .find(|document| &document.id == establishment)
            .ok_or_else(|| StoreError::NotFound(establishment.clone()))?;
        if document.scores.as_ref() == Some(scores) {
            return Ok(false);
        }
        document.scores = Some(scores.clone());

        // Memory only takes the new scores once they are on disk.
        self.persist(&candidate)?;
        self.memory.write_scores(establishment, scores)
    }
}
