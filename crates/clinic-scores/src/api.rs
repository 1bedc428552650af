//! HTTP endpoints for ad-hoc scoring and ranking.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::publication::{assign_ranks, CmsTable, PublicationError, RankOutcome};
use crate::scoring::{
    score_establishment, EnrichmentRecord, EstablishmentScores, ReviewSignal, ScoringConfig,
};

const RANK_REQUIRED_COLUMNS: [&str; 2] = ["Display", "Weighted Rating Average"];

/// Review signals for a single establishment.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub reviews: Vec<ReviewSignal>,
    #[serde(default)]
    pub enrichments: Vec<EnrichmentRecord>,
    #[serde(default)]
    pub computed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub scores: Option<EstablishmentScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, f64>>,
}

/// Router builder for the scoring endpoints.
pub fn scoring_router(config: Arc<ScoringConfig>) -> Router {
    Router::new()
        .route("/api/v1/scores", post(score_handler))
        .route("/api/v1/rankings", post(rankings_handler))
        .with_state(config)
}

pub(crate) async fn score_handler(
    State(config): State<Arc<ScoringConfig>>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let computed_at = request.computed_at.unwrap_or_else(Utc::now);
    let scores = score_establishment(
        &request.reviews,
        &request.enrichments,
        &config,
        computed_at,
    );
    let fields = scores.as_ref().map(EstablishmentScores::flat_fields);

    tracing::debug!(
        reviews = request.reviews.len(),
        enrichments = request.enrichments.len(),
        scored = scores.is_some(),
        "scored establishment payload"
    );

    Json(ScoreResponse { scores, fields })
}

pub(crate) async fn rankings_handler(body: String) -> Result<Response, AppError> {
    let mut table = CmsTable::from_reader(body.as_bytes()).map_err(PublicationError::from)?;
    for column in RANK_REQUIRED_COLUMNS {
        if table.column(column).is_none() {
            return Err(PublicationError::MissingColumn(column).into());
        }
    }

    let outcomes: Vec<RankOutcome> = assign_ranks(&mut table);
    let csv = table.to_csv_string().map_err(PublicationError::from)?;
    tracing::info!(
        rows = table.len(),
        metrics = outcomes.len(),
        "ranked CMS payload"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response())
}
