use std::process::ExitCode;

use image_describer::logging::{LogLevel, init_logging};
use image_describer::{RunConfig, Services, default_secret_store, run_with_secrets};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogLevel::Info);

    let secrets = default_secret_store();
    let result = run_with_secrets(
        &secrets,
        RunConfig::default(),
        Services::google,
        &mut std::io::stdout(),
    )
    .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}
