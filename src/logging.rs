//! Structured logging setup
//!
//! Provides JSON-formatted and human-readable logging with optional file output.
//! `RUST_LOG` takes precedence over the configured filter.

use crate::config::LoggingConfig;
use crate::error::Result;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used before the configured one is known.
const BOOTSTRAP_FILTER: &str = "voxdash=warn";

/// Run `f` with a temporary stderr subscriber installed.
///
/// Config loading happens before `init_logging`, so its warnings (missing
/// file, unparseable `VOXDASH_*` values) are emitted through this scoped
/// subscriber instead of being dropped.
///
/// # Examples
///
/// ```no_run
/// use voxdash::logging::with_bootstrap_logging;
///
/// let answer = with_bootstrap_logging(|| {
///     tracing::warn!("visible before init_logging");
///     42
/// });
/// assert_eq!(answer, 42);
/// ```
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(bootstrap_subscriber(std::io::stderr), f)
}

fn bootstrap_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .finish()
}

/// Initialize the global tracing subscriber.
///
/// Log lines go to stderr so command output on stdout stays clean, and are
/// also appended to `config.file_path` when set.
///
/// # Errors
///
/// Returns error if the filter directive is invalid, the log file cannot be
/// opened, or a global subscriber is already installed
///
/// # Examples
///
/// ```no_run
/// use voxdash::config::LoggingConfig;
/// use voxdash::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "voxdash=debug".to_string(),
///     json_format: true,
///     file_path: None,
/// };
///
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        let stderr_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    } else {
        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    }

    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(level)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::Config;
    use serial_test::serial;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn status_cli() -> Cli {
        Cli {
            config: None,
            store: None,
            verbose: false,
            command: Commands::Status,
        }
    }

    #[test]
    #[serial]
    fn test_build_filter_accepts_directives() {
        std::env::remove_var("RUST_LOG");
        assert!(build_filter("voxdash=debug").is_ok());
        assert!(build_filter("info").is_ok());
        assert!(build_filter("voxdash=debug,reqwest=warn").is_ok());
    }

    #[test]
    #[serial]
    fn test_build_filter_rejects_garbage() {
        std::env::remove_var("RUST_LOG");
        assert!(build_filter("voxdash=loud").is_err());
    }

    #[test]
    #[serial]
    fn test_rust_log_takes_precedence() {
        std::env::set_var("RUST_LOG", "warn");
        let result = build_filter("voxdash=loud");
        std::env::remove_var("RUST_LOG");
        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn test_config_warnings_reach_bootstrap_subscriber() {
        std::env::remove_var("RUST_LOG");
        std::env::set_var("VOXDASH_API_TIMEOUT_SECONDS", "soon");
        let buf = SharedBuf::default();
        let writer = buf.clone();

        let subscriber = bootstrap_subscriber(move || writer.clone());
        let config = tracing::subscriber::with_default(subscriber, || {
            Config::load("nonexistent.yaml", &status_cli())
        });
        std::env::remove_var("VOXDASH_API_TIMEOUT_SECONDS");

        assert!(config.is_ok());
        let output = buf.contents();
        assert!(output.contains("Config file not found at nonexistent.yaml"));
        assert!(output.contains("Invalid VOXDASH_API_TIMEOUT_SECONDS: soon"));
    }

    #[test]
    #[serial]
    fn test_bootstrap_logging_returns_closure_value() {
        assert_eq!(with_bootstrap_logging(|| 7), 7);
    }
}
