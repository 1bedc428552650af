use crate::infra::{establishment_ids, load_settings, open_store};
use clap::Args;
use clinic_scores::error::AppError;
use clinic_scores::publication::{CmsPublisher, PublicationReport};
use clinic_scores::scoring::{
    EstablishmentId, ScoringOrchestrator, ScoringStatistics, ScoringSummary,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Comma-separated establishment IDs to score (defaults to every establishment)
    #[arg(long, value_delimiter = ',')]
    pub(crate) establishments: Option<Vec<String>>,
    /// Signal store snapshot to read and update (overrides SIGNAL_STORE_PATH)
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Scoring configuration JSON (overrides SCORING_CONFIG_PATH)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Skip the statistics summary after scoring
    #[arg(long)]
    pub(crate) quick: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CmsArgs {
    /// Directory holding the CMS exports (overrides CMS_DIRECTORY)
    #[arg(long)]
    pub(crate) cms_directory: Option<PathBuf>,
    /// Signal store snapshot to read scores from (overrides SIGNAL_STORE_PATH)
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Skip the publication summary
    #[arg(long)]
    pub(crate) quick: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// Signal store snapshot to inspect (overrides SIGNAL_STORE_PATH)
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        establishments,
        store,
        config,
        quick,
    } = args;

    let mut settings = load_settings()?;
    if let Some(path) = store {
        settings.storage.signal_store_path = path;
    }
    if let Some(path) = config {
        settings.storage.scoring_config_path = Some(path);
    }

    let scoring_config = settings.storage.scoring_config()?;
    let store = Arc::new(open_store(&settings.storage.signal_store_path)?);
    let orchestrator = ScoringOrchestrator::new(store.clone(), scoring_config);

    println!("Starting clinic scoring");
    let targets: Option<Vec<EstablishmentId>> = establishments.map(establishment_ids);
    let summary = orchestrator.run(targets.as_deref())?;
    render_scoring_summary(&summary);

    if !quick {
        let statistics = ScoringStatistics::collect(&*store)?;
        render_statistics(&statistics);
    }

    Ok(())
}

pub(crate) fn run_cms(args: CmsArgs) -> Result<(), AppError> {
    let CmsArgs {
        cms_directory,
        store,
        quick,
    } = args;

    let mut settings = load_settings()?;
    if let Some(path) = store {
        settings.storage.signal_store_path = path;
    }
    if let Some(path) = cms_directory {
        settings.storage.cms_directory = path;
    }

    let store = open_store(&settings.storage.signal_store_path)?;
    let publisher = CmsPublisher::new(settings.storage.cms_directory);

    println!("Starting CMS update in {}", publisher.directory().display());
    let report = publisher.publish(&store)?;

    if !quick {
        render_publication_report(&report);
    }

    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let mut settings = load_settings()?;
    if let Some(path) = args.store {
        settings.storage.signal_store_path = path;
    }

    let store = open_store(&settings.storage.signal_store_path)?;
    let statistics = ScoringStatistics::collect(&store)?;
    render_statistics(&statistics);
    Ok(())
}

fn render_scoring_summary(summary: &ScoringSummary) {
    println!("\nScoring summary");
    println!("  Processed: {}", summary.processed);
    println!("  Updated:   {}", summary.updated);
    println!("  Failed:    {}", summary.failed);
}

fn render_statistics(statistics: &ScoringStatistics) {
    println!("\nScoring statistics");
    println!(
        "  Establishments: {} ({} scored, {:.2}% coverage)",
        statistics.total_establishments,
        statistics.establishments_with_scores,
        statistics.coverage_percentage
    );

    let averages = &statistics.average_scores;
    println!("  Average scores:");
    for (label, value) in [
        ("raw rating", averages.raw_rating),
        ("weighted rating", averages.weighted_rating),
        ("service quality", averages.service_quality),
        ("communication", averages.communication),
        ("affordability", averages.affordability),
        ("recommendation", averages.recommendation),
        ("clinic score", averages.clinic_score),
    ] {
        match value {
            Some(value) => println!("    {label}: {value:.2}"),
            None => println!("    {label}: n/a"),
        }
    }
}

fn render_publication_report(report: &PublicationReport) {
    println!("\nCMS update summary");
    println!("  File:      {}", report.cms_file.display());
    println!("  Backup:    {}", report.backup_file.display());
    println!("  Rows:      {}", report.total_rows);
    println!("  Displayed: {}", report.merge.publishable_rows);
    println!("  Updated:   {}", report.merge.updated);
    if !report.merge.missing.is_empty() {
        println!("  Not in store ({}):", report.merge.missing.len());
        for name in &report.merge.missing {
            println!("    - {name}");
        }
    }
    for outcome in &report.ranks {
        println!(
            "  {} -> {} ({} ranked)",
            outcome.metric, outcome.rank_column, outcome.ranked
        );
    }
}
