use crate::demo::{run_catalog, run_demo, run_import, run_replay, DemoArgs, ImportArgs, ReplayArgs};
use crate::infra::CatalogArgs;
use crate::server;
use clap::{Args, Parser, Subcommand};
use joint_assessment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Joint Assessment",
    about = "Run the guided joint assessment service or drive assessments from the command line",
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
    /// Inspect the region catalog or run assessments offline
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },
    /// Walk a scripted assessment step by step and print every screen
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AssessmentCommand {
    /// Print the regions and joints walked by the assessment
    Catalog(CatalogArgs),
    /// Replay a JSON array of assessment events and print the resulting state
    Replay(ReplayArgs),
    /// Import recorded findings from CSV and optionally compute the score
    Import(ImportArgs),
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
        Command::Assessment { command } => match command {
            AssessmentCommand::Catalog(args) => run_catalog(args),
            AssessmentCommand::Replay(args) => run_replay(args),
            AssessmentCommand::Import(args) => run_import(args),
        },
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["joint-assessment"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn import_accepts_csv_and_score_flags() {
        let cli = Cli::try_parse_from([
            "joint-assessment",
            "assessment",
            "import",
            "--csv",
            "findings.csv",
            "--score",
            "--assessed-on",
            "2025-10-02",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Assessment {
                command: AssessmentCommand::Import(args),
            }) => {
                assert!(args.score);
                assert_eq!(args.csv.to_str(), Some("findings.csv"));
                assert!(args.assessed_on.is_some());
            }
            other => panic!("expected import command, got {other:?}"),
        }
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let result = Cli::try_parse_from([
            "joint-assessment",
            "assessment",
            "replay",
            "--events",
            "events.json",
            "--assessed-on",
            "10/02/2025",
        ]);
        assert!(result.is_err());
    }
}
