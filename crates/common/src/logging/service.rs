//! Common logging initialization for binaries.

use std::path::Path;

use tracing::info;

use super::{format_service_name, init, FileLoggingConfig, LogFormat, LoggerConfig, LoggingError};

/// Configuration parameters for logging initialization.
#[derive(Debug)]
pub struct LoggingInitConfig<'a> {
    /// Base service name
    pub service_base_name: &'a str,
    /// Optional service label to append like prod or dev
    pub service_label: Option<&'a str>,
    /// Directory for file-based logging
    pub log_dir: Option<&'a Path>,
    /// Prefix for log file names
    pub log_file_prefix: Option<&'a str>,
    /// Use JSON format instead of compact
    pub json_format: Option<bool>,
    /// Extra filter directives
    pub directives: &'a [String],
}

/// Builds the [`LoggerConfig`] a binary asks for.
pub fn logger_config(config: &LoggingInitConfig<'_>) -> LoggerConfig {
    let service_name = format_service_name(config.service_base_name, config.service_label);
    let mut lconfig = LoggerConfig::new(service_name);

    if let Some(dir) = config.log_dir {
        let prefix = config
            .log_file_prefix
            .unwrap_or(config.service_base_name)
            .to_string();
        let file = FileLoggingConfig::new(dir.to_path_buf(), prefix)
            .with_format(LogFormat::from_json_flag(config.json_format.unwrap_or(false)));
        lconfig = lconfig.with_file_logging(file);
    }

    if let Some(json_format) = config.json_format {
        lconfig = lconfig.with_stdout_format(LogFormat::from_json_flag(json_format));
    }

    for directive in config.directives {
        lconfig = lconfig.with_directive(directive.clone());
    }

    lconfig
}

/// Initialize logging from configuration with all standard setup.
pub fn init_logging_from_config(config: LoggingInitConfig<'_>) -> Result<(), LoggingError> {
    let lconfig = logger_config(&config);
    let file_logging_config = lconfig.file.clone();

    init(lconfig)?;

    if let Some(file_config) = &file_logging_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}
