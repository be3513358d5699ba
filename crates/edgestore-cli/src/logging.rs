use edgestore_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Resolve the filter directive: command-line level first, then the config file
pub fn filter_directive(cli_level: Option<LevelFilter>, config: &LoggingConfig) -> String {
    match cli_level {
        Some(level) => level.to_string().to_lowercase(),
        None => config.level.clone(),
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries command output.
pub fn init(cli_level: Option<LevelFilter>, config: &LoggingConfig) {
    let filter = EnvFilter::new(filter_directive(cli_level, config));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Text => builder.init(),
    }
}
