use super::aggregate::round_to;
use super::config::ReviewerTrustConfig;
use super::domain::{Platform, ReviewSignal};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Multiplicative weight for a reviewer. Google local guides and Trustpilot
/// reviewers at the configured verification tier earn the bonus; everyone
/// else, including unknown platforms, counts once.
pub fn reviewer_weight(review: &ReviewSignal, trust: &ReviewerTrustConfig) -> f64 {
    let elevated = match review.platform {
        Platform::Google => trust.google_local_guide_bonus && review.is_local_guide == Some(true),
        Platform::Trustpilot => match trust.trustpilot_verified_level.as_deref() {
            Some(level) => review.verification_level.as_deref() == Some(level),
            None => false,
        },
        Platform::Other => false,
    };

    if elevated {
        trust.bonus_multiplier
    } else {
        DEFAULT_WEIGHT
    }
}

/// Plain and reviewer-weighted star averages, rounded to three decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StarRatings {
    pub raw_average: Option<f64>,
    pub weighted_average: Option<f64>,
}

pub fn star_ratings<'a, I>(reviews: I, trust: &ReviewerTrustConfig) -> StarRatings
where
    I: IntoIterator<Item = &'a ReviewSignal>,
{
    let mut count = 0usize;
    let mut plain_sum = 0.0;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for review in reviews {
        let Some(rating) = review.valid_rating() else {
            continue;
        };
        let weight = reviewer_weight(review, trust);
        count += 1;
        plain_sum += rating;
        weighted_sum += rating * weight;
        total_weight += weight;
    }

    if count == 0 {
        return StarRatings::default();
    }

    let weighted_average = if total_weight > 0.0 {
        Some(round_to(weighted_sum / total_weight, 3))
    } else {
        None
    };

    StarRatings {
        raw_average: Some(round_to(plain_sum / count as f64, 3)),
        weighted_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{EstablishmentId, ReviewId};

    fn review(platform: Platform, rating: Option<f64>) -> ReviewSignal {
        ReviewSignal {
            id: ReviewId("r".to_string()),
            establishment_id: EstablishmentId("e".to_string()),
            platform,
            rating,
            is_local_guide: None,
            verification_level: None,
        }
    }

    #[test]
    fn google_local_guides_receive_bonus() {
        let trust = ReviewerTrustConfig::default();
        let mut signal = review(Platform::Google, Some(5.0));
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);
        signal.is_local_guide = Some(true);
        assert_eq!(reviewer_weight(&signal, &trust), 1.25);
        signal.is_local_guide = Some(false);
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);
    }

    #[test]
    fn trustpilot_verified_reviews_receive_bonus() {
        let trust = ReviewerTrustConfig::default();
        let mut signal = review(Platform::Trustpilot, Some(5.0));
        signal.verification_level = Some("verified".to_string());
        assert_eq!(reviewer_weight(&signal, &trust), 1.25);
        signal.verification_level = Some("invited".to_string());
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);
    }

    #[test]
    fn trust_indicators_only_count_on_their_own_platform() {
        let trust = ReviewerTrustConfig::default();
        let mut signal = review(Platform::Trustpilot, Some(5.0));
        signal.is_local_guide = Some(true);
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);

        let mut signal = review(Platform::Google, Some(5.0));
        signal.verification_level = Some("verified".to_string());
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);

        let mut signal = review(Platform::Other, Some(5.0));
        signal.is_local_guide = Some(true);
        signal.verification_level = Some("verified".to_string());
        assert_eq!(reviewer_weight(&signal, &trust), 1.0);
    }

    #[test]
    fn configured_multiplier_is_applied() {
        let trust = ReviewerTrustConfig {
            bonus_multiplier: 2.0,
            ..ReviewerTrustConfig::default()
        };
        let mut signal = review(Platform::Google, None);
        signal.is_local_guide = Some(true);
        assert_eq!(reviewer_weight(&signal, &trust), 2.0);
    }

    #[test]
    fn star_ratings_weight_elevated_reviewers() {
        let trust = ReviewerTrustConfig::default();
        let mut guide = review(Platform::Google, Some(5.0));
        guide.is_local_guide = Some(true);
        let reviews = vec![
            guide,
            review(Platform::Google, Some(3.0)),
            review(Platform::Trustpilot, Some(0.0)),
        ];

        let ratings = star_ratings(&reviews, &trust);
        assert_eq!(ratings.raw_average, Some(4.0));
        // (5 * 1.25 + 3) / 2.25
        assert_eq!(ratings.weighted_average, Some(4.111));
    }

    #[test]
    fn star_ratings_absent_without_valid_ratings() {
        let trust = ReviewerTrustConfig::default();
        let reviews = vec![review(Platform::Google, None)];
        assert_eq!(star_ratings(&reviews, &trust), StarRatings::default());
    }
}
