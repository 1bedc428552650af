use super::aggregate::{normalize, round_to};
use super::config::{CompositeWeights, OnlineCommunicationRules};
use super::domain::{Attribute, EnrichmentRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw online-communication score recorded when an establishment has no
/// complaint to judge its responses by. Lies outside the NPS range.
pub const NO_SIGNAL_SCORE: f64 = 99.99;

/// What [`NO_SIGNAL_SCORE`] contributes to the final clinic score.
pub const NO_SIGNAL_CONTRIBUTION: u8 = 99;

/// Star rating to points multiplier (5 stars -> 100).
const RATING_SCALE: f64 = 20.0;

/// Composite score: raw weighted NPS and its normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub normalized: u8,
}

/// Weighted average of the attribute NPS scores listed in `weights`, with
/// the weights re-normalized over the attributes that have a score.
pub fn composite_score(
    scores: &BTreeMap<Attribute, f64>,
    weights: &CompositeWeights,
) -> Option<CompositeScore> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (attribute, weight) in weights.iter() {
        if let Some(score) = scores.get(&attribute) {
            weighted_sum += score * weight;
            total_weight += weight;
        }
    }

    if total_weight <= 0.0 {
        return None;
    }

    let score = round_to(weighted_sum / total_weight, 2);
    Some(CompositeScore {
        score,
        normalized: normalize(score),
    })
}

/// Derives the online-communication code for one review.
///
/// A missing complaint flag means "not a complaint"; a missing response flag
/// means "no response". A flag holding anything but 0 or 1 invalidates the
/// sample and yields `None`.
pub fn online_communication_value(
    enrichment: &EnrichmentRecord,
    rules: &OnlineCommunicationRules,
) -> Option<i64> {
    let is_complaint = binary_flag(enrichment.is_complaint)?;
    let has_response = binary_flag(enrichment.has_response)?;
    let has_constructive_response = binary_flag(enrichment.has_constructive_response)?;

    let value = match (is_complaint, has_response, has_constructive_response) {
        (false, _, _) => rules.no_complaint,
        (true, false, _) => rules.complaint_no_response,
        (true, true, true) => rules.complaint_response_good,
        (true, true, false) => rules.complaint_response_poor,
    };
    Some(value)
}

fn binary_flag(raw: Option<i64>) -> Option<bool> {
    match raw {
        None | Some(0) => Some(false),
        Some(1) => Some(true),
        Some(_) => None,
    }
}

/// Star rating rescaled onto the 0-100 points scale.
pub fn rating_points(rating: f64) -> f64 {
    (rating * RATING_SCALE).clamp(0.0, 100.0)
}

/// Mean of the rescaled weighted rating and every normalized attribute
/// contribution, rounded to an integer. `None` when nothing contributes.
pub fn final_clinic_score<I>(weighted_rating: Option<f64>, contributions: I) -> Option<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut components: Vec<f64> = weighted_rating.map(rating_points).into_iter().collect();
    components.extend(contributions.into_iter().map(f64::from));

    if components.is_empty() {
        return None;
    }

    let mean = components.iter().sum::<f64>() / components.len() as f64;
    Some(mean.round_ties_even().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrichment(
        is_complaint: Option<i64>,
        has_response: Option<i64>,
        has_constructive_response: Option<i64>,
    ) -> EnrichmentRecord {
        EnrichmentRecord {
            is_complaint,
            has_response,
            has_constructive_response,
            ..EnrichmentRecord::default()
        }
    }

    #[test]
    fn decision_table_matches_defaults() {
        let rules = OnlineCommunicationRules::default();
        let cases = [
            (enrichment(Some(0), Some(1), Some(1)), 0),
            (enrichment(None, None, None), 0),
            (enrichment(Some(1), Some(0), Some(1)), 1),
            (enrichment(Some(1), None, None), 1),
            (enrichment(Some(1), Some(1), Some(1)), 3),
            (enrichment(Some(1), Some(1), Some(0)), 2),
            (enrichment(Some(1), Some(1), None), 2),
        ];

        for (record, expected) in cases {
            assert_eq!(
                online_communication_value(&record, &rules),
                Some(expected),
                "{record:?}"
            );
        }
    }

    #[test]
    fn decision_table_honours_overrides() {
        let rules = OnlineCommunicationRules {
            complaint_response_poor: 1,
            ..OnlineCommunicationRules::default()
        };
        let record = enrichment(Some(1), Some(1), Some(0));
        assert_eq!(online_communication_value(&record, &rules), Some(1));
    }

    #[test]
    fn invalid_flags_invalidate_the_sample() {
        let rules = OnlineCommunicationRules::default();
        assert_eq!(
            online_communication_value(&enrichment(Some(2), Some(1), Some(1)), &rules),
            None
        );
        assert_eq!(
            online_communication_value(&enrichment(Some(1), Some(-1), None), &rules),
            None
        );
    }

    #[test]
    fn composite_renormalizes_over_present_attributes() {
        let scores = BTreeMap::from([
            (Attribute::TreatmentSatisfaction, 80.0),
            (Attribute::PostOp, 60.0),
        ]);
        let composite = composite_score(&scores, &CompositeWeights::service_quality())
            .expect("composite present");
        assert_eq!(composite.score, 72.0);
        assert_eq!(composite.normalized, 86);
    }

    #[test]
    fn composite_ignores_attributes_outside_its_table() {
        let scores = BTreeMap::from([(Attribute::Affordability, 50.0)]);
        assert_eq!(
            composite_score(&scores, &CompositeWeights::service_quality()),
            None
        );
        assert_eq!(
            composite_score(&BTreeMap::new(), &CompositeWeights::communication()),
            None
        );
    }

    #[test]
    fn communication_composite_uses_all_three_inputs() {
        let scores = BTreeMap::from([
            (Attribute::OnsiteCommunication, 50.0),
            (Attribute::Scheduling, -20.0),
            (Attribute::OnlineCommunication, 10.0),
        ]);
        let composite =
            composite_score(&scores, &CompositeWeights::communication()).expect("composite");
        // 0.4 * 50 + 0.2 * -20 + 0.4 * 10 = 20
        assert_eq!(composite.score, 20.0);
        assert_eq!(composite.normalized, 60);
    }

    #[test]
    fn final_score_averages_rating_and_attributes() {
        let score = final_clinic_score(Some(4.0), [70, 60, 90, NO_SIGNAL_CONTRIBUTION]);
        assert_eq!(score, Some(80));
    }

    #[test]
    fn final_score_without_rating_uses_attributes_only() {
        assert_eq!(final_clinic_score(None, [70, 71]), Some(70));
        assert_eq!(final_clinic_score(Some(5.0), Vec::<u8>::new()), Some(100));
        assert_eq!(final_clinic_score(None, Vec::<u8>::new()), None);
    }

    #[test]
    fn rating_points_are_clamped() {
        assert_eq!(rating_points(4.0), 80.0);
        assert_eq!(rating_points(5.5), 100.0);
        assert_eq!(rating_points(-1.0), 0.0);
    }
}
