//! Subscriber setup.

use std::io;

use thiserror::Error;
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    filter::{Directive, EnvFilter, ParseError},
    fmt::{format::FmtSpan, layer, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::{SubscriberInitExt, TryInitError},
    Layer,
};

use super::types::{LogFormat, LoggerConfig};

/// Noisy transport crates, quieted unless `RUST_LOG` or the config says
/// otherwise.
const DEFAULT_DIRECTIVES: &[&str] = &["hyper_util=warn", "reqwest=warn"];

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid filter directive '{directive}': {source}")]
    Directive {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builds the level filter: INFO unless `RUST_LOG` says otherwise, then the
/// quiet defaults, then `extra_directives`.
pub fn build_filter(extra_directives: &[String]) -> Result<EnvFilter, LoggingError> {
    let defaults = DEFAULT_DIRECTIVES.iter().copied();
    let extra = extra_directives.iter().map(String::as_str);

    defaults.chain(extra).try_fold(
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .from_env_lossy(),
        |filt, directive| {
            let parsed: Directive =
                directive
                    .parse()
                    .map_err(|source| LoggingError::Directive {
                        directive: directive.to_owned(),
                        source,
                    })?;
            Ok(filt.add_directive(parsed))
        },
    )
}

fn output_layer<S, W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
    span_events: FmtSpan,
    filter: EnvFilter,
) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(span_events);
    match format {
        LogFormat::Compact => base.compact().with_filter(filter).boxed(),
        LogFormat::Json => base.json().with_filter(filter).boxed(),
    }
}

/// Installs the global subscriber: stdout plus an optional rolling file.
///
/// Fails if a directive does not parse or a global subscriber is already set.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let filt = build_filter(&config.extra_directives)?;

    let stdout = output_layer(
        config.stdout.format,
        io::stdout,
        config.stdout.format == LogFormat::Compact,
        config.stdout.span_events.clone(),
        filt.clone(),
    );

    let file = config.file.as_ref().map(|file| {
        let appender =
            RollingFileAppender::new(file.rotation.clone(), &file.directory, &file.file_name_prefix);
        output_layer(file.format, appender, false, FmtSpan::NONE, filt.clone())
    });

    tracing_subscriber::registry()
        .with(stdout)
        .with(file)
        .try_init()?;

    info!(
        service_name = %config.service_name,
        service_version = ?config.service_version,
        "logging initialized"
    );
    Ok(())
}
