use std::process::ExitCode;

use log::{error, info};
use scanward_lib::{init_logging, settings, station};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    info!("scanward station starting up...");

    let settings = match settings::load_station_settings() {
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
                info!("interrupt received");
                stop.cancel();
            }
        });
    }

    match station::run_station(settings, stop).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
