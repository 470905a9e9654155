use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Holds the appender guards; dropping it flushes and stops the file writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Console logging always; rolling text and JSON files when `to_files` is set.
    pub fn new(to_files: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let guards = Self::setup_logging(to_files)?;
        Ok(Logger { guards })
    }

    pub fn setup_logging(to_files: bool) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,blood_app_backend=debug"));

        let console = fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(console_filter);

        if !to_files {
            tracing_subscriber::registry().with(console).try_init()?;
            return Ok(Vec::new());
        }

        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        std::fs::create_dir_all(&log_dir)?;

        let (general_writer, general_guard) = non_blocking(rolling::daily(&log_dir, "bloodbank-backend.log"));
        let (error_writer, error_guard) =
            non_blocking(rolling::daily(format!("{log_dir}/error"), "bloodbank-backend-error.log"));
        let (json_writer, json_guard) =
            non_blocking(rolling::daily(format!("{log_dir}/json"), "bloodbank-backend.json"));

        tracing_subscriber::registry()
            .with(console)
            .with(
                fmt::layer()
                    .with_writer(general_writer)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(error_writer)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(json_writer)
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .try_init()?;

        Ok(vec![general_guard, error_guard, json_guard])
    }
}
