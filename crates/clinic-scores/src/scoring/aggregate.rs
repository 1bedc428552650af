use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const NEGATIVE: i64 = 1;
pub const NEUTRAL: i64 = 2;
pub const POSITIVE: i64 = 3;

/// Highest code on the sentiment scale; anything above is an invalid sample.
const SCALE_MAX: i64 = 3;

/// One review's contribution to one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub value: i64,
    pub weight: f64,
}

impl WeightedSample {
    pub fn new(value: i64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Weighted NPS-style statistic for one attribute of one establishment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeStatistic {
    /// Weighted NPS in [-100, 100], two decimals.
    pub score: f64,
    /// `score` rescaled onto [0, 100].
    pub normalized: u8,
    /// Share of positive samples, unweighted.
    pub pct: u8,
    /// Share of positive weight.
    pub pct_weighted: u8,
}

/// Aggregates a sample set into an [`AttributeStatistic`].
///
/// Samples outside the sentiment scale, with a non-positive weight, or whose
/// value is not in `included` are dropped before anything is counted. Returns
/// `None` when nothing survives the filter.
pub fn weighted_nps(
    samples: &[WeightedSample],
    included: &BTreeSet<i64>,
) -> Option<AttributeStatistic> {
    let mut count = 0usize;
    let mut positive_count = 0usize;
    let mut total_weight = 0.0;
    let mut positive_weight = 0.0;
    let mut neutral_weight = 0.0;
    let mut negative_weight = 0.0;

    for sample in samples {
        if !(0..=SCALE_MAX).contains(&sample.value) || !included.contains(&sample.value) {
            continue;
        }
        if !sample.weight.is_finite() || sample.weight <= 0.0 {
            continue;
        }

        count += 1;
        total_weight += sample.weight;
        match sample.value {
            POSITIVE => {
                positive_count += 1;
                positive_weight += sample.weight;
            }
            NEUTRAL => neutral_weight += sample.weight,
            NEGATIVE => negative_weight += sample.weight,
            _ => {}
        }
    }

    if count == 0 || total_weight <= 0.0 {
        return None;
    }

    tracing::trace!(
        count,
        positive_weight,
        neutral_weight,
        negative_weight,
        "aggregated attribute samples"
    );

    let score = round_to(
        ((positive_weight - negative_weight) / total_weight) * 100.0,
        2,
    );

    Some(AttributeStatistic {
        score,
        normalized: normalize(score),
        pct: percentage(positive_count as f64, count as f64),
        pct_weighted: percentage(positive_weight, total_weight),
    })
}

/// Rescales an NPS value from [-100, 100] onto [0, 100].
pub fn normalize(score: f64) -> u8 {
    ((score + 100.0) / 2.0).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Rounds half-to-even at the given number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

fn percentage(part: f64, whole: f64) -> u8 {
    (100.0 * part / whole).round_ties_even().clamp(0.0, 100.0) as u8
}
