//! Turns per-review signals into establishment scores.
//!
//! Every function here is pure and takes the [`ScoringConfig`] explicitly, so
//! establishments can be scored independently of each other.

pub mod aggregate;
pub mod composite;
pub mod config;
pub mod domain;
mod orchestrator;
pub mod record;
mod statistics;
pub mod weighting;

pub use aggregate::{normalize, weighted_nps, AttributeStatistic, WeightedSample};
pub use composite::{
    composite_score, final_clinic_score, online_communication_value, CompositeScore,
    NO_SIGNAL_CONTRIBUTION, NO_SIGNAL_SCORE,
};
pub use config::{
    CompositeWeights, OnlineCommunicationRules, ReviewerTrustConfig, ScoringConfig,
    ScoringConfigError,
};
pub use domain::{Attribute, EnrichmentRecord, EstablishmentId, Platform, ReviewId, ReviewSignal};
pub use orchestrator::{ScoringOrchestrator, ScoringSummary};
pub use record::{AttributeScore, EstablishmentScores};
pub use statistics::{AverageScores, ScoringStatistics};
pub use weighting::{reviewer_weight, star_ratings, StarRatings};

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Computes the full score record for one establishment.
///
/// `reviews` are the establishment's unified reviews; `enrichments` may
/// contain records for any review, and only those matching a review in
/// `reviews` are used. Returns `None` when the establishment has neither a
/// valid star rating nor an enriched review.
pub fn score_establishment(
    reviews: &[ReviewSignal],
    enrichments: &[EnrichmentRecord],
    config: &ScoringConfig,
    computed_at: DateTime<Utc>,
) -> Option<EstablishmentScores> {
    let mut enrichment_by_review: HashMap<&ReviewId, &EnrichmentRecord> = HashMap::new();
    for enrichment in enrichments {
        enrichment_by_review.entry(&enrichment.id).or_insert(enrichment);
    }

    let rated: Vec<&ReviewSignal> = reviews
        .iter()
        .filter(|review| review.valid_rating().is_some())
        .collect();
    let enriched: Vec<(&ReviewSignal, &EnrichmentRecord)> = reviews
        .iter()
        .filter_map(|review| {
            enrichment_by_review
                .get(&review.id)
                .map(|enrichment| (review, *enrichment))
        })
        .collect();

    if rated.is_empty() && enriched.is_empty() {
        return None;
    }

    let ratings = star_ratings(rated.iter().copied(), &config.reviewer_trust);

    let mut samples: BTreeMap<Attribute, Vec<WeightedSample>> = BTreeMap::new();
    for (review, enrichment) in &enriched {
        let weight = reviewer_weight(review, &config.reviewer_trust);

        if let Some(value) =
            online_communication_value(enrichment, &config.online_communication_rules)
        {
            samples
                .entry(Attribute::OnlineCommunication)
                .or_default()
                .push(WeightedSample::new(value, weight));
        }

        for attribute in Attribute::SENTIMENT {
            if let Some(value) = enrichment.sentiment(attribute) {
                samples
                    .entry(attribute)
                    .or_default()
                    .push(WeightedSample::new(value, weight));
            }
        }
    }

    let mut attributes: BTreeMap<Attribute, AttributeScore> = samples
        .iter()
        .filter_map(|(attribute, set)| {
            weighted_nps(set, &config.nps_included_values)
                .map(|statistic| (*attribute, AttributeScore::Measured(statistic)))
        })
        .collect();
    attributes
        .entry(Attribute::OnlineCommunication)
        .or_insert(AttributeScore::NoSignal);

    let nps_scores: BTreeMap<Attribute, f64> = attributes
        .iter()
        .filter_map(|(attribute, score)| {
            score
                .measured()
                .map(|statistic| (*attribute, statistic.score))
        })
        .collect();

    let service_quality = composite_score(&nps_scores, &config.service_quality_weights);
    let communication = composite_score(&nps_scores, &config.communication_weights);

    let clinic_score = final_clinic_score(
        ratings.weighted_average,
        attributes.values().map(AttributeScore::final_contribution),
    );

    let total_reviews_analyzed = rated
        .iter()
        .map(|review| &review.id)
        .chain(enriched.iter().map(|(review, _)| &review.id))
        .collect::<HashSet<_>>()
        .len();

    Some(EstablishmentScores {
        total_reviews_analyzed,
        scores_updated_at: computed_at,
        raw_average_rating: ratings.raw_average,
        weighted_average_rating: ratings.weighted_average,
        attributes,
        service_quality,
        communication,
        clinic_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn computed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn review(id: &str, platform: Platform, rating: Option<f64>) -> ReviewSignal {
        ReviewSignal {
            id: ReviewId(id.to_string()),
            establishment_id: EstablishmentId("clinic-1".to_string()),
            platform,
            rating,
            is_local_guide: None,
            verification_level: None,
        }
    }

    fn enrichment(id: &str) -> EnrichmentRecord {
        EnrichmentRecord {
            id: ReviewId(id.to_string()),
            ..EnrichmentRecord::default()
        }
    }

    #[test]
    fn no_ratings_and_no_enrichment_yields_nothing() {
        let reviews = vec![review("r-1", Platform::Google, None)];
        assert!(score_establishment(&reviews, &[], &ScoringConfig::default(), computed_at())
            .is_none());
    }

    #[test]
    fn rating_only_establishment_gets_sentinel_and_rating_score() {
        let reviews = vec![
            review("r-1", Platform::Google, Some(4.0)),
            review("r-2", Platform::Trustpilot, Some(4.0)),
        ];
        let scores = score_establishment(&reviews, &[], &ScoringConfig::default(), computed_at())
            .expect("scores");

        assert_eq!(scores.total_reviews_analyzed, 2);
        assert_eq!(scores.weighted_average_rating, Some(4.0));
        assert_eq!(
            scores.attribute(Attribute::OnlineCommunication),
            Some(&AttributeScore::NoSignal)
        );
        assert!(scores.service_quality.is_none());
        assert!(scores.communication.is_none());
        // mean(80, 99)
        assert_eq!(scores.clinic_score, Some(90));
    }

    #[test]
    fn enrichment_for_other_establishments_is_ignored() {
        let reviews = vec![review("r-1", Platform::Google, None)];
        let mut stray = enrichment("r-9");
        stray.facility = Some(3);
        assert!(score_establishment(&reviews, &[stray], &ScoringConfig::default(), computed_at())
            .is_none());
    }

    #[test]
    fn complaints_feed_online_communication_and_composite() {
        let mut guide = review("r-1", Platform::Google, Some(2.0));
        guide.is_local_guide = Some(true);
        let reviews = vec![guide, review("r-2", Platform::Trustpilot, Some(5.0))];

        let mut answered = enrichment("r-1");
        answered.is_complaint = Some(1);
        answered.has_response = Some(1);
        answered.has_constructive_response = Some(1);
        answered.onsite_communication = Some(1);
        let mut silent = enrichment("r-2");
        silent.is_complaint = Some(1);
        silent.has_response = Some(0);
        silent.onsite_communication = Some(3);

        let scores = score_establishment(
            &reviews,
            &[answered, silent],
            &ScoringConfig::default(),
            computed_at(),
        )
        .expect("scores");

        let online = scores
            .attribute(Attribute::OnlineCommunication)
            .and_then(AttributeScore::measured)
            .expect("online communication measured");
        // (1.25 - 1.0) / 2.25 * 100
        assert_eq!(online.score, 11.11);
        let onsite = scores
            .attribute(Attribute::OnsiteCommunication)
            .and_then(AttributeScore::measured)
            .expect("onsite measured");
        assert_eq!(onsite.score, -11.11);

        let communication = scores.communication.expect("communication composite");
        // onsite and online carry equal weight, scheduling absent
        assert_eq!(communication.score, 0.0);
        assert_eq!(communication.normalized, 50);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let reviews = vec![
            review("r-1", Platform::Google, Some(5.0)),
            review("r-2", Platform::Google, Some(3.0)),
        ];
        let mut first = enrichment("r-1");
        first.staff_satisfaction = Some(3);
        first.affordability = Some(2);
        let mut second = enrichment("r-2");
        second.staff_satisfaction = Some(1);
        second.is_complaint = Some(1);

        let config = ScoringConfig::default();
        let enrichments = vec![first, second];
        let a = score_establishment(&reviews, &enrichments, &config, computed_at());
        let b = score_establishment(&reviews, &enrichments, &config, computed_at());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).expect("serialize"),
            serde_json::to_string(&b).expect("serialize")
        );
    }
}
