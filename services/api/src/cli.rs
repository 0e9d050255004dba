use crate::demo::{run_demo, run_scoreboard_report, DemoArgs, ScoreboardReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use delivery_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Delivery Insights",
    about = "Score driver, carrier, and depot performance from delivery task exports",
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
    /// Work with the performance scoreboard from the command line
    Scoreboard {
        #[command(subcommand)]
        command: ScoreboardCommand,
    },
    /// Render the scoreboard and alert recurrence over built-in fixture data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScoreboardCommand {
    /// Compute the scoreboard from an Urbantz task export
    Report(ScoreboardReportArgs),
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
        Command::Scoreboard {
            command: ScoreboardCommand::Report(args),
        } => run_scoreboard_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
