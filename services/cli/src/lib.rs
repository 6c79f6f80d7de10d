mod cli;
mod commands;
mod infra;

use admissions::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
