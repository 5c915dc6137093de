use crate::demo::{run_demo, run_summary, DemoArgs, SummaryArgs};
use crate::server;
use action_orchestrator::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Action Orchestrator",
    about = "Rank property maintenance actions and run completion workflows from the command line",
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
    /// Compute an orchestration summary from a signal CSV export
    Summary(SummaryArgs),
    /// Run an end-to-end demo: ranking, evidence upload, completion, and claim gating
    Demo(DemoArgs),
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
        Command::Summary(args) => run_summary(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
