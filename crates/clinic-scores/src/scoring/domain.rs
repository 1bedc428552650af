use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an establishment (clinic) in the signal store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstablishmentId(pub String);

impl fmt::Display for EstablishmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier shared by a unified review and its enrichment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

/// Review platforms the ingestion layer knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Google,
    Trustpilot,
    #[default]
    #[serde(other)]
    Other,
}

/// Unified review as read from the signal store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSignal {
    pub id: ReviewId,
    pub establishment_id: EstablishmentId,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_local_guide: Option<bool>,
    #[serde(default)]
    pub verification_level: Option<String>,
}

impl ReviewSignal {
    pub const MIN_RATING: f64 = 1.0;
    pub const MAX_RATING: f64 = 5.0;

    /// Star rating when it lies inside the 1-5 scale. Zero means "no rating"
    /// upstream and is dropped along with any other out-of-range value.
    pub fn valid_rating(&self) -> Option<f64> {
        self.rating
            .filter(|rating| rating.is_finite())
            .filter(|rating| (Self::MIN_RATING..=Self::MAX_RATING).contains(rating))
    }
}

/// Scored attributes of an establishment. Declaration order matters: it is
/// the iteration order of every attribute-keyed map, which fixes the order in
/// which composite weights are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    TreatmentSatisfaction,
    PostOp,
    StaffSatisfaction,
    Facility,
    OnsiteCommunication,
    Scheduling,
    OnlineCommunication,
    Affordability,
    Recommendation,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::TreatmentSatisfaction,
        Attribute::PostOp,
        Attribute::StaffSatisfaction,
        Attribute::Facility,
        Attribute::OnsiteCommunication,
        Attribute::Scheduling,
        Attribute::OnlineCommunication,
        Attribute::Affordability,
        Attribute::Recommendation,
    ];

    /// Attributes read straight from the enrichment oracle.
    pub const SENTIMENT: [Attribute; 8] = [
        Attribute::StaffSatisfaction,
        Attribute::Scheduling,
        Attribute::TreatmentSatisfaction,
        Attribute::OnsiteCommunication,
        Attribute::Facility,
        Attribute::PostOp,
        Attribute::Affordability,
        Attribute::Recommendation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Attribute::TreatmentSatisfaction => "treatment_satisfaction",
            Attribute::PostOp => "post_op",
            Attribute::StaffSatisfaction => "staff_satisfaction",
            Attribute::Facility => "facility",
            Attribute::OnsiteCommunication => "onsite_communication",
            Attribute::Scheduling => "scheduling",
            Attribute::OnlineCommunication => "online_communication",
            Attribute::Affordability => "affordability",
            Attribute::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// AI-derived attributes for a single review, keyed by the review id.
///
/// Sentiment attributes use 0 (not mentioned), 1 (negative), 2 (neutral),
/// 3 (positive); flags use 0/1. Values are kept as raw integers so that
/// out-of-range codes can be discarded during aggregation instead of failing
/// the whole document. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentRecord {
    pub id: ReviewId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EstablishmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_complaint: Option<i64>,
    #[serde(default)]
    pub has_response: Option<i64>,
    #[serde(default)]
    pub has_constructive_response: Option<i64>,
    #[serde(default)]
    pub staff_satisfaction: Option<i64>,
    #[serde(default)]
    pub scheduling: Option<i64>,
    #[serde(default)]
    pub treatment_satisfaction: Option<i64>,
    #[serde(default)]
    pub onsite_communication: Option<i64>,
    #[serde(default)]
    pub facility: Option<i64>,
    #[serde(default)]
    pub post_op: Option<i64>,
    #[serde(default)]
    pub affordability: Option<i64>,
    #[serde(default)]
    pub recommendation: Option<i64>,
}

impl EnrichmentRecord {
    /// Raw oracle value for a sentiment attribute; `None` for the derived
    /// online-communication attribute.
    pub fn sentiment(&self, attribute: Attribute) -> Option<i64> {
        match attribute {
            Attribute::StaffSatisfaction => self.staff_satisfaction,
            Attribute::Scheduling => self.scheduling,
            Attribute::TreatmentSatisfaction => self.treatment_satisfaction,
            Attribute::OnsiteCommunication => self.onsite_communication,
            Attribute::Facility => self.facility,
            Attribute::PostOp => self.post_op,
            Attribute::Affordability => self.affordability,
            Attribute::Recommendation => self.recommendation,
            Attribute::OnlineCommunication => None,
        }
    }
}
