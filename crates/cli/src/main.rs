use std::process::ExitCode;

use fabquote_core::config::{AppConfig, LoadOptions, LogFormat};

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn main() -> ExitCode {
    // Logging comes up even when the config file is broken; the command
    // itself reports config errors through its own output.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    fabquote_cli::run()
}
