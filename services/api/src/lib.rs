mod cli;
mod commands;
mod infra;
mod routes;
mod server;
mod session;
mod views;

use reservation_watch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
