//! Syncs establishment scores into the CMS ranking export.
//!
//! The CMS file is read whole, merged with the persisted scores, ranked, and
//! written back after the previous version is moved aside as a backup.

mod mapping;
mod ranking;
mod table;

pub use ranking::{assign_ranks, positional_ranks, RankCandidate, RankOutcome};
pub use table::CmsTable;

use crate::store::{EstablishmentDocument, SignalStore, StoreError};
use mapping::{
    format_number, is_publishable, DISPLAY_COLUMN, DISPLAY_NAME_COLUMN, FIELD_MAPPINGS,
    REVIEWS_COLUMN,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CMS_FILE_PREFIX: &str = "ClinicScores - Clinics(";
const CMS_FILE_SUFFIX: &str = ").csv";

#[derive(Debug, thiserror::Error)]
pub enum PublicationError {
    #[error("no CMS export matching 'ClinicScores - Clinics(N).csv' in {}", .0.display())]
    NoCmsFile(PathBuf),
    #[error("CMS export is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("no establishments with a display name in the signal store")]
    NoEstablishments,
    #[error("CMS io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CMS CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Finds the export with the highest `(N)` suffix in `directory`.
pub fn latest_cms_file<P: AsRef<Path>>(directory: P) -> Result<Option<PathBuf>, std::io::Error> {
    let mut latest: Option<(u64, PathBuf)> = None;

    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(number) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(cms_file_number)
        else {
            continue;
        };

        if latest.as_ref().map_or(true, |(best, _)| number > *best) {
            latest = Some((number, path));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

fn cms_file_number(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(CMS_FILE_PREFIX)?
        .strip_suffix(CMS_FILE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Outcome of joining store records onto the CMS rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub publishable_rows: usize,
    pub updated: usize,
    pub missing: Vec<String>,
}

/// Copies score fields onto publishable CMS rows, joined on display name.
///
/// Rows whose display name has no establishment are logged and skipped.
/// Absent score fields leave the existing cell alone.
pub fn merge_scores(
    table: &mut CmsTable,
    establishments: &[EstablishmentDocument],
) -> Result<MergeSummary, PublicationError> {
    let display = table
        .column(DISPLAY_COLUMN)
        .ok_or(PublicationError::MissingColumn(DISPLAY_COLUMN))?;
    let display_name = table
        .column(DISPLAY_NAME_COLUMN)
        .ok_or(PublicationError::MissingColumn(DISPLAY_NAME_COLUMN))?;

    let by_name: HashMap<&str, &EstablishmentDocument> = establishments
        .iter()
        .filter_map(|document| {
            document
                .display_name
                .as_deref()
                .map(|name| (name, document))
        })
        .collect();

    let mut summary = MergeSummary::default();
    for row in 0..table.len() {
        if !is_publishable(table.cell(row, display)) {
            continue;
        }
        summary.publishable_rows += 1;

        let name = table.cell(row, display_name).to_string();
        let Some(document) = by_name.get(name.as_str()) else {
            warn!(display_name = %name, "establishment not found in signal store");
            summary.missing.push(name);
            continue;
        };

        let fields = document
            .scores
            .as_ref()
            .map(|scores| scores.flat_fields())
            .unwrap_or_default();

        let reviews = fields.get("total_reviews_analyzed").copied().unwrap_or(0.0);
        let reviews_column = table.ensure_column(REVIEWS_COLUMN);
        table.set_cell(row, reviews_column, format_number(reviews));

        for (field, column) in FIELD_MAPPINGS {
            if let Some(value) = fields.get(field) {
                let index = table.ensure_column(column);
                table.set_cell(row, index, format_number(*value));
            }
        }

        summary.updated += 1;
    }

    info!(
        publishable = summary.publishable_rows,
        updated = summary.updated,
        missing = summary.missing.len(),
        "merged establishment scores into CMS rows"
    );
    Ok(summary)
}

/// Summary of one publication run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationReport {
    pub cms_file: PathBuf,
    pub backup_file: PathBuf,
    pub total_rows: usize,
    pub merge: MergeSummary,
    pub ranks: Vec<RankOutcome>,
}

/// Publishes store scores into the latest CMS export in a directory.
pub struct CmsPublisher {
    directory: PathBuf,
}

impl CmsPublisher {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn publish<S: SignalStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<PublicationReport, PublicationError> {
        let cms_file = latest_cms_file(&self.directory)?
            .ok_or_else(|| PublicationError::NoCmsFile(self.directory.clone()))?;
        info!(file = %cms_file.display(), "found latest CMS file");

        // Read everything up front so ranks come from one consistent snapshot.
        let mut table = CmsTable::from_path(&cms_file)?;
        let establishments: Vec<EstablishmentDocument> = store
            .establishments()?
            .into_iter()
            .filter(|document| document.display_name.is_some())
            .collect();
        if establishments.is_empty() {
            return Err(PublicationError::NoEstablishments);
        }

        let merge = merge_scores(&mut table, &establishments)?;
        let ranks = assign_ranks(&mut table);

        let backup_file = cms_file.with_extension("csv.backup");
        std::fs::rename(&cms_file, &backup_file)?;
        let file = std::fs::File::create(&cms_file)?;
        table.write_to(file)?;
        info!(file = %cms_file.display(), backup = %backup_file.display(), "saved updated CMS data");

        Ok(PublicationReport {
            cms_file,
            backup_file,
            total_rows: table.len(),
            merge,
            ranks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cms_file_number_requires_exact_pattern() {
        assert_eq!(cms_file_number("ClinicScores - Clinics(12).csv"), Some(12));
        assert_eq!(cms_file_number("ClinicScores - Clinics().csv"), None);
        assert_eq!(cms_file_number("ClinicScores - Clinics(1a).csv"), None);
        assert_eq!(cms_file_number("ClinicScores - Clinics(3).csv.backup"), None);
        assert_eq!(cms_file_number("Other(3).csv"), None);
    }
}
