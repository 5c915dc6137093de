mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use action_orchestrator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
