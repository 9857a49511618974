//! Sets up `tracing` with a compact stdout layer and an optional OTLP exporter.

use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use thiserror::Error;
use tracing::{info, Subscriber};
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Envvar holding the OTLP collector endpoint. Spans are only exported when it is set.
pub const OTLP_URL_ENVVAR: &str = "SYNTH_BRIDGE_OTLP_URL";

/// Envvar holding a label appended to the whoami string, e.g. the name of a simulated chain.
pub const SVC_LABEL_ENVVAR: &str = "SYNTH_BRIDGE_SVC_LABEL";

/// Envvar that adds the source file to every stdout line when set to `1`.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Envvar that adds the line number to every stdout line when set to `1`.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

const TRACER_NAME: &str = "synth-bridge";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The OTLP span exporter could not be built.
    #[error("could not build otlp exporter for {url}: {reason}")]
    Exporter {
        /// The collector endpoint.
        url: String,
        /// Why the exporter failed.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("could not install subscriber: {0}")]
    Install(String),
}

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Identifies the service in logs and as the OTLP `service.name`.
    whoami: String,

    /// The OTLP collector endpoint.
    otel_url: Option<String>,

    with_file: bool,

    with_line_number: bool,
}

impl LoggerConfig {
    /// Creates a config with the given whoami string and nothing else enabled.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
            with_file: false,
            with_line_number: false,
        }
    }

    /// Creates a config whose whoami string is `base` plus the service label from the
    /// environment, picking up the OTLP endpoint and the stdout format switches from the
    /// environment too.
    pub fn from_env(base: &str) -> Self {
        let mut config = Self::new(get_whoami_string(base));
        config.otel_url = get_otlp_url_from_env();
        config.with_file = env_flag(LOG_FILE_ENVVAR);
        config.with_line_number = env_flag(LOG_LINE_NUM_ENVVAR);
        config
    }

    /// Sets the OTLP collector endpoint.
    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    /// The whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }

    /// The OTLP collector endpoint, if any.
    pub fn otlp_url(&self) -> Option<&str> {
        self.otel_url.as_deref()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("(synth-bridge)".to_string())
    }
}

/// Installs the global subscriber.
///
/// The stdout layer honours `RUST_LOG`. Fails if a subscriber is already installed.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let stdout = stdout_layer(&config);

    match &config.otel_url {
        Some(url) => {
            let otel = otel_layer(&config.whoami, url)?;
            tracing_subscriber::registry()
                .with(stdout)
                .with(otel)
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;
        }
        None => {
            tracing_subscriber::registry()
                .with(stdout)
                .try_init()
                .map_err(|e| LoggingError::Install(e.to_string()))?;
        }
    }

    info!(whoami = %config.whoami, otlp = ?config.otel_url, "logging started");

    Ok(())
}

fn stdout_layer<S>(config: &LoggerConfig) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(config.with_file)
                .with_line_number(config.with_line_number),
        )
        .with_filter(EnvFilter::from_default_env())
}

fn otel_layer<S>(whoami: &str, url: &str) -> Result<impl Layer<S>, LoggingError>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", whoami.to_owned()))
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()
        .map_err(|e| LoggingError::Exporter {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    Ok(tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME)))
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}

/// Reads the OTLP collector endpoint from [`OTLP_URL_ENVVAR`].
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Reads the service label from [`SVC_LABEL_ENVVAR`].
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes the whoami string as `base%label`, or just `base` without a label.
pub fn get_whoami_string(base: &str) -> String {
    format_whoami(base, get_service_label_from_env().as_deref())
}

fn format_whoami(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whoami_includes_label() {
        assert_eq!(format_whoami("bridge-sim", Some("chain-56")), "bridge-sim%chain-56");
        assert_eq!(format_whoami("bridge-sim", None), "bridge-sim");
    }

    #[test]
    fn otlp_url_is_opt_in() {
        let mut config = LoggerConfig::new("bridge-sim".to_string());
        assert_eq!(config.otlp_url(), None);

        config.set_otlp_url("http://localhost:4317".to_string());
        assert_eq!(config.otlp_url(), Some("http://localhost:4317"));
        assert_eq!(config.whoami(), "bridge-sim");
    }
}
