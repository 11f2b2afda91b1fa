use std::process::ExitCode;

use log::{error, info};
use scanward_lib::{init_logging, settings, trigger};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let settings = match settings::load_monitor_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let stop = CancellationToken::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Exiting...");
                stop.cancel();
            }
        });
    }

    match trigger::run_monitor(settings, stop).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
