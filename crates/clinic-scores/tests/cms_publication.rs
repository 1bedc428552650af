mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinic_scores::publication::{CmsPublisher, CmsTable, PublicationError};
use clinic_scores::scoring::{ScoringConfig, ScoringOrchestrator};
use clinic_scores::store::JsonFileStore;
use common::clinic_snapshot;

const LATEST_EXPORT: &str = "Display Name,Display,Weighted Rating Average,Score,Communication Score,Rank\n\
Alpha Clinic,TRUE,,,,\n\
Beta Clinic,true,,,,\n\
Hidden Clinic,FALSE,4.9,99,80,7\n\
Unknown Clinic,TRUE,3.0,50,,\n";

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "clinic-scores-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("temp dir created");
    dir
}

fn scored_store(dir: &Path) -> JsonFileStore {
    let path = dir.join("signal_store.json");
    let encoded = serde_json::to_vec_pretty(&clinic_snapshot()).expect("snapshot encodes");
    fs::write(&path, encoded).expect("snapshot written");

    let store = Arc::new(JsonFileStore::open(&path).expect("store opens"));
    ScoringOrchestrator::new(store.clone(), ScoringConfig::default())
        .run(None)
        .expect("scoring run completes");

    // Reopen to publish from what was persisted.
    JsonFileStore::open(&path).expect("store reopens")
}

#[test]
fn publish_merges_scores_and_ranks_latest_export() {
    let dir = workspace("publish");
    fs::write(
        dir.join("ClinicScores - Clinics(1).csv"),
        "Display Name,Display\nAlpha Clinic,TRUE\n",
    )
    .expect("older export written");
    fs::write(dir.join("ClinicScores - Clinics(2).csv"), LATEST_EXPORT)
        .expect("latest export written");

    let store = scored_store(&dir);
    let report = CmsPublisher::new(&dir)
        .publish(&store)
        .expect("publication succeeds");

    assert_eq!(report.cms_file, dir.join("ClinicScores - Clinics(2).csv"));
    assert_eq!(
        report.backup_file,
        dir.join("ClinicScores - Clinics(2).csv.backup")
    );
    assert_eq!(report.total_rows, 4);
    assert_eq!(report.merge.publishable_rows, 3);
    assert_eq!(report.merge.updated, 2);
    assert_eq!(report.merge.missing, vec!["Unknown Clinic".to_string()]);

    let backup = fs::read_to_string(&report.backup_file).expect("backup readable");
    assert_eq!(backup, LATEST_EXPORT);
    let untouched = fs::read_to_string(dir.join("ClinicScores - Clinics(1).csv"))
        .expect("older export readable");
    assert_eq!(untouched, "Display Name,Display\nAlpha Clinic,TRUE\n");

    let table = CmsTable::from_path(&report.cms_file).expect("published export parses");
    assert_eq!(table.get(0, "Weighted Rating Average"), Some("4"));
    assert_eq!(table.get(0, "Score"), Some("76"));
    assert_eq!(table.get(0, "Communication Score"), Some("100"));
    assert_eq!(table.get(0, "Reviews"), Some("3"));
    assert_eq!(table.get(1, "Weighted Rating Average"), Some("4.5"));
    assert_eq!(table.get(1, "Score"), Some("94"));
    assert_eq!(table.get(1, "Communication Score"), Some(""));

    // Score ranking: Beta 94, Alpha 76, Unknown 50; Hidden keeps its old rank.
    assert_eq!(table.get(1, "Rank"), Some("1"));
    assert_eq!(table.get(0, "Rank"), Some("2"));
    assert_eq!(table.get(3, "Rank"), Some("3"));
    assert_eq!(table.get(2, "Rank"), Some("7"));

    assert_eq!(table.get(0, "Communication Rank"), Some("1"));
    assert_eq!(table.get(1, "Communication Rank"), Some(""));

    let score_rank = report
        .ranks
        .iter()
        .find(|outcome| outcome.rank_column == "Rank")
        .expect("score ranked");
    assert_eq!(score_rank.ranked, 3);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn publish_keeps_byte_order_mark_of_export() {
    let dir = workspace("publish-bom");
    fs::write(
        dir.join("ClinicScores - Clinics(1).csv"),
        "\u{feff}Display Name,Display\nAlpha Clinic,TRUE\n",
    )
    .expect("export written");

    let store = scored_store(&dir);
    let report = CmsPublisher::new(&dir)
        .publish(&store)
        .expect("publication succeeds");

    let published = fs::read(&report.cms_file).expect("published export readable");
    assert!(published.starts_with("\u{feff}Display Name,Display,".as_bytes()));
    let table = CmsTable::from_path(&report.cms_file).expect("published export parses");
    assert_eq!(table.get(0, "Score"), Some("76"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn publish_requires_a_cms_export() {
    let dir = workspace("missing-export");
    fs::write(dir.join("ClinicScores - Clinics.csv"), "Display Name,Display\n")
        .expect("unnumbered export written");

    let store = scored_store(&dir);
    let error = CmsPublisher::new(&dir)
        .publish(&store)
        .expect_err("no numbered export");
    assert!(matches!(error, PublicationError::NoCmsFile(_)));

    let _ = fs::remove_dir_all(&dir);
}
