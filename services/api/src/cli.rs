use crate::commands::{run_cms, run_score, run_stats, CmsArgs, ScoreArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use clinic_scores::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Clinic Scores",
    about = "Score clinics from their review signals and publish rankings to the CMS export",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Recompute establishment scores in the signal store
    Score(ScoreArgs),
    /// Merge stored scores into the latest CMS export and rank clinics
    Cms(CmsArgs),
    /// Show scoring coverage and average scores
    Stats(StatsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Cms(args) => run_cms(args),
        Command::Stats(args) => run_stats(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_command_splits_establishment_ids() {
        let cli = Cli::try_parse_from([
            "clinic-scores",
            "score",
            "--establishments",
            " c-1 ,c-2,c-3",
            "--quick",
        ])
        .expect("arguments parse");

        let Some(Command::Score(args)) = cli.command else {
            panic!("expected score command");
        };
        let raw = args.establishments.expect("ids parsed");
        let ids: Vec<String> = crate::infra::establishment_ids(raw)
            .into_iter()
            .map(|id| id.0)
            .collect();
        assert_eq!(ids, vec!["c-1", "c-2", "c-3"]);
        assert!(args.quick);
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["clinic-scores"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn cms_command_accepts_directory_override() {
        let cli = Cli::try_parse_from(["clinic-scores", "cms", "--cms-directory", "exports"])
            .expect("arguments parse");
        let Some(Command::Cms(args)) = cli.command else {
            panic!("expected cms command");
        };
        assert_eq!(
            args.cms_directory.as_deref(),
            Some(std::path::Path::new("exports"))
        );
        assert!(!args.quick);
    }
}
