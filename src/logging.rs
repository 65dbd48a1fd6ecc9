use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application (default: INFO)
    pub level: Level,
    /// Whether to use json format for logs (default: false)
    pub json_format: bool,
    /// Path to store log files. If None, logs will only go to stdout
    pub log_dir: Option<String>,
    /// Whether to colorize logs when output is a terminal (default: true)
    pub colorize: bool,
    /// Log file name to use if log_dir is specified
    pub log_file_name: String,
    /// Targets the level applies to
    pub log_targets: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_dir: None,
            colorize: true,
            log_file_name: "leaning-classifier".to_string(),
            log_targets: vec!["leaning_classifier".to_string(), "actix_web".to_string()],
        }
    }
}

/// Guard that keeps the file appender worker thread alive
///
/// Must be held for the lifetime of the server so buffered lines reach the file.
#[allow(dead_code)]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Parse a textual level, falling back to INFO for unknown values
pub fn parse_level(level: Option<&str>) -> Level {
    match level.map(|l| l.to_ascii_lowercase()).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    }
}

fn filter_directives(config: &LoggingConfig) -> String {
    let level = config.level.as_str().to_ascii_lowercase();
    config
        .log_targets
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Daily rolling file layer under `log_dir`, created if missing
fn build_file_layer<S>(
    config: &LoggingConfig,
    log_dir: &str,
) -> std::io::Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let log_dir = PathBuf::from(log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, log_dir, config.log_file_name.clone());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()))
        .with_writer(non_blocking);

    let file_layer = if config.json_format {
        file_layer.json().flatten_event(true).boxed()
    } else {
        file_layer.boxed()
    };

    Ok((file_layer, guard))
}

/// Stdout layer plus the file layer when `log_dir` is usable
///
/// A log directory that cannot be created only drops the file layer.
fn build_layers<S>(config: &LoggingConfig) -> (Vec<Box<dyn Layer<S> + Send + Sync>>, Option<WorkerGuard>)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let mut layers = Vec::new();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_ansi(config.colorize)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()));

    let stdout_layer = if config.json_format {
        stdout_layer.json().flatten_event(true).boxed()
    } else {
        stdout_layer.boxed()
    };

    layers.push(stdout_layer);

    let mut file_guard = None;

    if let Some(log_dir) = &config.log_dir {
        match build_file_layer(config, log_dir) {
            Ok((file_layer, guard)) => {
                layers.push(file_layer);
                file_guard = Some(guard);
            }
            Err(e) => eprintln!("Failed to create log directory {}: {}", log_dir, e),
        }
    }

    (layers, file_guard)
}

/// Initialize the logging system with the given configuration
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(config: LoggingConfig) -> LogGuard {
    // Forward `log` records (actix) to tracing
    let _ = LogTracer::init();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(&config)));

    let (layers, file_guard) = build_layers::<Layered<EnvFilter, Registry>>(&config);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init();

    LogGuard {
        _file_guard: file_guard,
    }
}
