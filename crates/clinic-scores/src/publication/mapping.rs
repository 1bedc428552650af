pub(crate) const DISPLAY_COLUMN: &str = "Display";
pub(crate) const DISPLAY_NAME_COLUMN: &str = "Display Name";
pub(crate) const REVIEWS_COLUMN: &str = "Reviews";
pub(crate) const WEIGHTED_RATING_COLUMN: &str = "Weighted Rating Average";

/// Establishment score field -> CMS column.
pub(crate) const FIELD_MAPPINGS: [(&str, &str); 14] = [
    ("weighted_average_rating", WEIGHTED_RATING_COLUMN),
    ("communication_score_normalized", "Communication Score"),
    ("affordability_score_normalized", "Affordability Score"),
    ("service_quality_score_normalized", "Service Score"),
    ("recommendation_score_normalized", "Recommendation Score"),
    ("affordability_pct_weighted", "Affordability Stat"),
    ("recommendation_pct_weighted", "Recommendation Stat"),
    ("facility_pct_weighted", "Facility Stat"),
    ("onsite_communication_pct_weighted", "Onsite Communication Stat"),
    ("post_op_pct_weighted", "Post-op Stat"),
    ("scheduling_pct_weighted", "Scheduling Stat"),
    ("staff_satisfaction_pct_weighted", "Staff Stat"),
    ("treatment_satisfaction_pct_weighted", "Treatment Stat"),
    ("clinic_score", "Score"),
];

/// Published metric column -> rank column.
pub(crate) const RANK_FIELDS: [(&str, &str); 5] = [
    ("Communication Score", "Communication Rank"),
    ("Affordability Score", "Affordability Rank"),
    ("Service Score", "Service Rank"),
    ("Recommendation Score", "Recommendation Rank"),
    ("Score", "Rank"),
];

/// Rows with `Display` set to TRUE, in any case, are publishable.
pub(crate) fn is_publishable(value: &str) -> bool {
    value.to_uppercase() == "TRUE"
}

/// Parses a numeric cell; blanks and non-numeric text are `None`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Whole numbers are written without a fractional part.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
