use super::config::ScoringConfig;
use super::domain::{EstablishmentId, ReviewId};
use super::score_establishment;
use crate::store::{SignalStore, StoreError};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

const PROGRESS_INTERVAL: usize = 10;

/// Counts reported after a scoring batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringSummary {
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Drives [`score_establishment`] over the store and writes results back.
pub struct ScoringOrchestrator<S> {
    store: Arc<S>,
    config: Arc<ScoringConfig>,
}

impl<S> ScoringOrchestrator<S>
where
    S: SignalStore + 'static,
{
    pub fn new(store: Arc<S>, config: ScoringConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Scores the given establishments, or every establishment when `None`.
    ///
    /// A failure while scoring one establishment is logged and counted; that
    /// establishment keeps its previous scores and the batch moves on. Only a
    /// failure to list establishments aborts the run.
    pub fn run(
        &self,
        establishment_ids: Option<&[EstablishmentId]>,
    ) -> Result<ScoringSummary, StoreError> {
        let targets = match establishment_ids {
            Some(ids) => {
                info!(count = ids.len(), "scoring specified establishments");
                ids.to_vec()
            }
            None => {
                let ids = self.store.establishment_ids()?;
                info!(count = ids.len(), "scoring all establishments");
                ids
            }
        };

        let total = targets.len();
        let mut summary = ScoringSummary::default();

        for establishment in &targets {
            match self.score_one(establishment) {
                Ok(modified) => {
                    summary.processed += 1;
                    if modified {
                        summary.updated += 1;
                    }
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(establishment = %establishment, error = %err, "failed to score establishment");
                }
            }

            let attempted = summary.processed + summary.failed;
            if attempted % PROGRESS_INTERVAL == 0 {
                info!(attempted, total, "scoring progress");
            }
        }

        info!(
            processed = summary.processed,
            updated = summary.updated,
            failed = summary.failed,
            "scoring complete"
        );
        Ok(summary)
    }

    /// Scores one establishment; returns whether the stored record changed.
    pub fn score_one(&self, establishment: &EstablishmentId) -> Result<bool, StoreError> {
        let reviews = self.store.reviews_for(establishment)?;
        let review_ids: Vec<ReviewId> = reviews.iter().map(|review| review.id.clone()).collect();
        let enrichments = self.store.enrichments_for(&review_ids)?;

        let Some(scores) = score_establishment(&reviews, &enrichments, &self.config, Utc::now())
        else {
            debug!(establishment = %establishment, "no rated or enriched reviews; nothing to write");
            return Ok(false);
        };

        self.store.write_scores(establishment, &scores)
    }
}
