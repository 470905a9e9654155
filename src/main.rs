use blood_app_backend::app::app::App;
use blood_app_backend::config::app_conf::AppConfig;
use blood_app_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dotenv_result = dotenv();

    let config = AppConfig::from_env();
    // keep the guards alive for the whole run so file writers flush
    let _logger = Logger::new(config.log_to_files).map_err(|e| e.to_string())?;

    info!("🚀 Starting Blood Bank Backend");
    match dotenv_result {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new(config).await?;
    app.start().await
}
