use super::{EstablishmentDocument, SignalStore, StoreError, StoreSnapshot};
use crate::scoring::{
    EnrichmentRecord, EstablishmentId, EstablishmentScores, ReviewId, ReviewSignal,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutex-guarded store used by tests, the HTTP service, and as the working
/// copy behind [`super::JsonFileStore`].
#[derive(Debug, Default, Clone)]
pub struct InMemorySignalStore {
    snapshot: Arc<Mutex<StoreSnapshot>>,
}

impl InMemorySignalStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>, StoreError> {
        self.snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl SignalStore for InMemorySignalStore {
    fn establishment_ids(&self) -> Result<Vec<EstablishmentId>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .establishments
            .iter()
            .map(|establishment| establishment.id.clone())
            .collect())
    }

    fn establishments(&self) -> Result<Vec<EstablishmentDocument>, StoreError> {
        Ok(self.lock()?.establishments.clone())
    }

    fn reviews_for(
        &self,
        establishment: &EstablishmentId,
    ) -> Result<Vec<ReviewSignal>, StoreError> {
        let guard = self.lock()?;
        if !guard
            .establishments
            .iter()
            .any(|document| &document.id == establishment)
        {
            return Err(StoreError::NotFound(establishment.clone()));
        }

        Ok(guard
            .reviews
            .iter()
            .filter(|review| &review.establishment_id == establishment)
            .cloned()
            .collect())
    }

    fn enrichments_for(&self, reviews: &[ReviewId]) -> Result<Vec<EnrichmentRecord>, StoreError> {
        let wanted: HashSet<&ReviewId> = reviews.iter().collect();
        let guard = self.lock()?;
        Ok(guard
            .enrichments
            .iter()
            .filter(|record| wanted.contains(&record.id))
            .cloned()
            .collect())
    }

    fn write_scores(
        &self,
        establishment: &EstablishmentId,
        scores: &EstablishmentScores,
    ) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let document = guard
            .establishments
            .iter_mut()
            .find(|document| &document.id == establishment)
            .ok_or_else(|| StoreError::NotFound(establishment.clone()))?;

        if document.scores.as_ref() == Some(scores) {
            return Ok(false);
        }
        document.scores = Some(scores.clone());
        Ok(true)
    }
}
