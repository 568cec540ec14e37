use crate::explore::{run_check, run_explore, CheckArgs, ExploreArgs};
use crate::infra::DatasetArgs;
use crate::server;
use clap::{Args, Parser, Subcommand};
use volcano_atlas::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Volcano Atlas",
    about = "Explore volcano activity and danger levels from the command line or over HTTP",
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
    /// Filter the dataset and print summary counts and country breakdown
    Explore(ExploreArgs),
    /// Load and validate the dataset and boundary file
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Explore(args) => run_explore(args),
        Command::Check(args) => run_check(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explore_accepts_filters_and_negative_elevation() {
        let cli = Cli::try_parse_from([
            "volcano-atlas",
            "explore",
            "--type",
            "Caldera",
            "--elevation-min",
            "-500",
            "--metric",
            "danger",
            "--top",
            "3",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Explore(args)) => {
                assert_eq!(args.filters.volcano_type.as_deref(), Some("Caldera"));
                assert_eq!(args.filters.elevation_min, Some(-500.0));
                assert_eq!(args.top, 3);
            }
            other => panic!("expected explore command, got {other:?}"),
        }
    }
}
