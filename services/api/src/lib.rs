mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use joint_assessment::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
