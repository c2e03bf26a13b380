//! Configuration types for the logging subsystem.

use std::path::PathBuf;

use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Line encoding of a log output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Terminal output.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    pub format: LogFormat,
    /// Span lifecycle events to emit. CLOSE reports how long each tracked
    /// transaction took.
    pub span_events: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            span_events: FmtSpan::CLOSE,
        }
    }
}

/// Rolling log files under `directory`, named `<prefix>.<date>`.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub format: LogFormat,
}

impl FileLoggingConfig {
    /// Daily rotation, compact lines.
    pub fn new(directory: PathBuf, file_name_prefix: impl Into<String>) -> Self {
        Self {
            directory,
            file_name_prefix: file_name_prefix.into(),
            rotation: Rotation::DAILY,
            format: LogFormat::Compact,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    /// Filter directives applied after `RUST_LOG`.
    pub extra_directives: Vec<String>,
    pub stdout: StdoutConfig,
    pub file: Option<FileLoggingConfig>,
}

impl LoggerConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: None,
            extra_directives: Vec::new(),
            stdout: StdoutConfig::default(),
            file: None,
        }
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Adds a filter directive such as `"alloy_transport_http=debug"`.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.extra_directives.push(directive.into());
        self
    }

    pub fn with_stdout_format(mut self, format: LogFormat) -> Self {
        self.stdout.format = format;
        self
    }

    pub fn with_span_events(mut self, span_events: FmtSpan) -> Self {
        self.stdout.span_events = span_events;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("(curate)")
    }
}
