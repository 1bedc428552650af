use super::aggregate::AttributeStatistic;
use super::composite::{CompositeScore, NO_SIGNAL_CONTRIBUTION, NO_SIGNAL_SCORE};
use super::domain::Attribute;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score of one attribute. Only online communication can be `NoSignal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttributeScore {
    Measured(AttributeStatistic),
    NoSignal,
}

impl AttributeScore {
    pub fn measured(&self) -> Option<&AttributeStatistic> {
        match self {
            AttributeScore::Measured(statistic) => Some(statistic),
            AttributeScore::NoSignal => None,
        }
    }

    /// Raw score as persisted, with the sentinel for `NoSignal`.
    pub fn raw_score(&self) -> f64 {
        match self {
            AttributeScore::Measured(statistic) => statistic.score,
            AttributeScore::NoSignal => NO_SIGNAL_SCORE,
        }
    }

    /// Contribution to the final clinic score.
    pub fn final_contribution(&self) -> u8 {
        match self {
            AttributeScore::Measured(statistic) => statistic.normalized,
            AttributeScore::NoSignal => NO_SIGNAL_CONTRIBUTION,
        }
    }
}

/// Score field-set of one establishment. Recomputed from scratch on every
/// run and written as a unit; absent values stay absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentScores {
    pub total_reviews_analyzed: usize,
    pub scores_updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_average_rating: Option<f64>,
    #[serde(default)]
    pub attributes: BTreeMap<Attribute, AttributeScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_quality: Option<CompositeScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication: Option<CompositeScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_score: Option<u8>,
}

impl EstablishmentScores {
    pub fn attribute(&self, attribute: Attribute) -> Option<&AttributeScore> {
        self.attributes.get(&attribute)
    }

    /// Flat `field -> value` view used by the CMS export and API clients,
    /// e.g. `affordability_score_normalized` or `clinic_score`. Absent values
    /// have no entry.
    pub fn flat_fields(&self) -> BTreeMap<String, f64> {
        let mut fields = BTreeMap::new();
        fields.insert(
            "total_reviews_analyzed".to_string(),
            self.total_reviews_analyzed as f64,
        );

        if let Some(rating) = self.raw_average_rating {
            fields.insert("raw_average_rating".to_string(), rating);
        }
        if let Some(rating) = self.weighted_average_rating {
            fields.insert("weighted_average_rating".to_string(), rating);
        }

        for (attribute, score) in &self.attributes {
            let key = attribute.key();
            fields.insert(format!("{key}_score"), score.raw_score());
            if let Some(statistic) = score.measured() {
                fields.insert(
                    format!("{key}_score_normalized"),
                    f64::from(statistic.normalized),
                );
                fields.insert(format!("{key}_pct"), f64::from(statistic.pct));
                fields.insert(
                    format!("{key}_pct_weighted"),
                    f64::from(statistic.pct_weighted),
                );
            }
        }

        for (name, composite) in [
            ("service_quality", self.service_quality),
            ("communication", self.communication),
        ] {
            if let Some(composite) = composite {
                fields.insert(format!("{name}_score"), composite.score);
                fields.insert(
                    format!("{name}_score_normalized"),
                    f64::from(composite.normalized),
                );
            }
        }

        if let Some(score) = self.clinic_score {
            fields.insert("clinic_score".to_string(), f64::from(score));
        }

        fields
    }
}
