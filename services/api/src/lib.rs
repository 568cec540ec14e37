mod cli;
mod explore;
mod infra;
mod routes;
mod server;

use volcano_atlas::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
