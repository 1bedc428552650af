use super::mapping::{
    is_publishable, parse_number, DISPLAY_COLUMN, RANK_FIELDS, WEIGHTED_RATING_COLUMN,
};
use super::table::CmsTable;
use serde::Serialize;
use std::cmp::Ordering;

/// A publishable row competing for a rank on one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankCandidate {
    pub row: usize,
    pub metric: f64,
    pub rating: f64,
}

/// Orders candidates by metric, then weighted rating, both descending, and
/// hands out ranks 1..=N in that order.
///
/// Ranks are positional: candidates with identical (metric, rating) pairs
/// still receive distinct consecutive ranks, in input order.
pub fn positional_ranks(mut candidates: Vec<RankCandidate>) -> Vec<(usize, usize)> {
    candidates.sort_by(|a, b| {
        b.metric
            .partial_cmp(&a.metric)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
    });

    candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| (candidate.row, position + 1))
        .collect()
}

/// Result of ranking one metric column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankOutcome {
    pub metric: &'static str,
    pub rank_column: &'static str,
    pub ranked: usize,
}

/// Writes the rank columns for every published metric.
///
/// A row takes part when it is publishable and both the metric and the
/// weighted rating parse as numbers. Rows outside the ranking keep whatever
/// their rank cell held. A metric with no candidates (or no column) is
/// skipped with a warning.
pub fn assign_ranks(table: &mut CmsTable) -> Vec<RankOutcome> {
    let (Some(display), Some(rating_column)) = (
        table.column(DISPLAY_COLUMN),
        table.column(WEIGHTED_RATING_COLUMN),
    ) else {
        tracing::warn!("CMS table lacks Display or rating column; no ranks computed");
        return Vec::new();
    };

    let mut outcomes = Vec::new();
    for (metric, rank_column) in RANK_FIELDS {
        let Some(metric_column) = table.column(metric) else {
            tracing::warn!(metric, "no valid scores found");
            continue;
        };

        let candidates: Vec<RankCandidate> = (0..table.len())
            .filter(|row| is_publishable(table.cell(*row, display)))
            .filter_map(|row| {
                let metric = parse_number(table.cell(row, metric_column))?;
                let rating = parse_number(table.cell(row, rating_column))?;
                Some(RankCandidate {
                    row,
                    metric,
                    rating,
                })
            })
            .collect();

        if candidates.is_empty() {
            tracing::warn!(metric, "no valid scores found");
            continue;
        }

        let ranks = positional_ranks(candidates);
        let rank_index = table.ensure_column(rank_column);
        for (row, rank) in &ranks {
            table.set_cell(*row, rank_index, rank.to_string());
        }

        tracing::info!(metric, ranked = ranks.len(), "calculated ranks");
        outcomes.push(RankOutcome {
            metric,
            rank_column,
            ranked: ranks.len(),
        });
    }

    outcomes
}
