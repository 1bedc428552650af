use super::aggregate::round_to;
use super::record::EstablishmentScores;
use crate::store::{SignalStore, StoreError};
use serde::Serialize;

/// Coverage and averages across persisted establishment scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringStatistics {
    pub total_establishments: usize,
    pub establishments_with_scores: usize,
    pub coverage_percentage: f64,
    pub average_scores: AverageScores,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AverageScores {
    pub raw_rating: Option<f64>,
    pub weighted_rating: Option<f64>,
    pub service_quality: Option<f64>,
    pub communication: Option<f64>,
    pub affordability: Option<f64>,
    pub recommendation: Option<f64>,
    pub clinic_score: Option<f64>,
}

impl ScoringStatistics {
    /// Establishments count as scored once they carry a weighted rating.
    pub fn collect<S: SignalStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let establishments = store.establishments()?;
        let scored: Vec<&EstablishmentScores> = establishments
            .iter()
            .filter_map(|document| document.scores.as_ref())
            .filter(|scores| scores.weighted_average_rating.is_some())
            .collect();

        let total_establishments = establishments.len();
        let establishments_with_scores = scored.len();
        let coverage_percentage = if total_establishments > 0 {
            round_to(
                establishments_with_scores as f64 / total_establishments as f64 * 100.0,
                2,
            )
        } else {
            0.0
        };

        let flat: Vec<_> = scored.iter().map(|scores| scores.flat_fields()).collect();
        let average = |field: &str| {
            let values: Vec<f64> = flat
                .iter()
                .filter_map(|fields| fields.get(field).copied())
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(round_to(values.iter().sum::<f64>() / values.len() as f64, 2))
            }
        };

        Ok(Self {
            total_establishments,
            establishments_with_scores,
            coverage_percentage,
            average_scores: AverageScores {
                raw_rating: average("raw_average_rating"),
                weighted_rating: average("weighted_average_rating"),
                service_quality: average("service_quality_score"),
                communication: average("communication_score"),
                affordability: average("affordability_score"),
                recommendation: average("recommendation_score"),
                clinic_score: average("clinic_score"),
            },
        })
    }
}
