use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LEVEL: &str = "warn";

/// Diagnostics go to stderr so stdout stays clean for command output.
/// `RUST_LOG` wins over `fallback_level`, which wins over `warn`.
pub fn init(fallback_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level.unwrap_or(DEFAULT_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
