use super::domain::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Immutable tunables for the scoring engine. Every field falls back to the
/// production defaults, so a partial JSON document only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub service_quality_weights: CompositeWeights,
    pub communication_weights: CompositeWeights,
    pub online_communication_rules: OnlineCommunicationRules,
    pub nps_included_values: BTreeSet<i64>,
    pub reviewer_trust: ReviewerTrustConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            service_quality_weights: CompositeWeights::service_quality(),
            communication_weights: CompositeWeights::communication(),
            online_communication_rules: OnlineCommunicationRules::default(),
            nps_included_values: BTreeSet::from([1, 2, 3]),
            reviewer_trust: ReviewerTrustConfig::default(),
        }
    }
}

impl ScoringConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoringConfigError> {
        let config: ScoringConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for (name, weights) in [
            ("service_quality_weights", &self.service_quality_weights),
            ("communication_weights", &self.communication_weights),
        ] {
            if let Some((attribute, weight)) = weights
                .iter()
                .find(|(_, weight)| !weight.is_finite() || *weight < 0.0)
            {
                return Err(ScoringConfigError::Invalid(format!(
                    "{name}.{attribute} must be a non-negative number, got {weight}"
                )));
            }
        }

        if let Some(value) = self
            .nps_included_values
            .iter()
            .find(|value| !(0..=3).contains(*value))
        {
            return Err(ScoringConfigError::Invalid(format!(
                "nps_included_values may only contain 0..=3, got {value}"
            )));
        }

        let multiplier = self.reviewer_trust.bonus_multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ScoringConfigError::Invalid(format!(
                "reviewer_trust.bonus_multiplier must be positive, got {multiplier}"
            )));
        }

        Ok(())
    }
}

/// Weight table for one composite score. Only attributes with a value
/// contribute, and the weights are re-normalized over those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeWeights(pub BTreeMap<Attribute, f64>);

impl CompositeWeights {
    pub fn service_quality() -> Self {
        Self(BTreeMap::from([
            (Attribute::TreatmentSatisfaction, 0.30),
            (Attribute::PostOp, 0.20),
            (Attribute::StaffSatisfaction, 0.30),
            (Attribute::Facility, 0.20),
        ]))
    }

    pub fn communication() -> Self {
        Self(BTreeMap::from([
            (Attribute::OnsiteCommunication, 0.40),
            (Attribute::Scheduling, 0.20),
            (Attribute::OnlineCommunication, 0.40),
        ]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        self.0.iter().map(|(attribute, weight)| (*attribute, *weight))
    }
}

/// Decision table mapping complaint/response flags onto the sentiment scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineCommunicationRules {
    pub no_complaint: i64,
    pub complaint_no_response: i64,
    pub complaint_response_poor: i64,
    pub complaint_response_good: i64,
}

impl Default for OnlineCommunicationRules {
    fn default() -> Self {
        Self {
            no_complaint: 0,
            complaint_no_response: 1,
            complaint_response_poor: 2,
            complaint_response_good: 3,
        }
    }
}

/// Which reviewers earn the trust bonus, and how large it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerTrustConfig {
    pub bonus_multiplier: f64,
    pub google_local_guide_bonus: bool,
    pub trustpilot_verified_level: Option<String>,
}

impl Default for ReviewerTrustConfig {
    fn default() -> Self {
        Self {
            bonus_multiplier: 1.25,
            google_local_guide_bonus: true,
            trustpilot_verified_level: Some("verified".to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("failed to read scoring config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scoring config: {0}")]
    Invalid(String),
}
