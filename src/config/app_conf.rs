use std::env;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed by CORS (the web frontend)
    pub cors_allowed_origin: String,
    /// Write rolling log files in addition to the console
    pub log_to_files: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let log_to_files = env::var("LOG_TO_FILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);
        AppConfig { host, port, cors_allowed_origin, log_to_files }
    }
}
