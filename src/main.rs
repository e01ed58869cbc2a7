use load_planner::config::AppConfig;
use load_planner::{api, logging};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();
    logging::init();
    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    info!("Load planner starting...");
    if let Err(err) = api::start_api_server(app_config.api, app_config.planner).await {
        error!("API server terminated with an error: {err}");
        std::process::exit(1);
    }
}
