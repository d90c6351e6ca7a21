mod cli;
mod infra;
mod routes;
mod server;

use edu_platform::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
