mod cli;
mod demo;
mod infra;
mod inspect;

use intake_wizard::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
