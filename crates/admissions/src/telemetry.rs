use crate::config::{AppEnvironment, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose debug output drowns the wizard's own events.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "reqwest", "rustls", "h2"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{}'", value)
            }
            TelemetryError::Subscriber(err) => {
                write!(f, "tracing subscriber already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(err.as_ref()),
        }
    }
}

/// Expand a bare level (`debug`) into a directive that keeps the HTTP stack at
/// `warn`. Full directives (anything with `=` or `,`) pass through untouched.
pub fn filter_directive(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directive = level.to_string();
    for dependency in QUIET_DEPENDENCIES {
        directive.push_str(&format!(",{dependency}=warn"));
    }
    directive
}

/// Install the global fmt subscriber on stderr so command output stays on stdout.
/// `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig, environment: AppEnvironment) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = filter_directive(&config.log_level);
            EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
                value: directive,
                source,
            })?
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(environment != AppEnvironment::Production)
        .compact()
        .with_ansi(false);

    match environment {
        AppEnvironment::Test => builder.with_test_writer().try_init(),
        _ => builder.with_writer(std::io::stderr).try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_levels_quiet_the_http_stack() {
        let directive = filter_directive(" debug ");
        assert!(directive.starts_with("debug,"));
        assert!(directive.contains("reqwest=warn"));
        assert!(directive.contains("hyper=warn"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn explicit_directives_are_kept() {
        assert_eq!(
            filter_directive("admissions=trace,hyper=info"),
            "admissions=trace,hyper=info"
        );
    }

    #[test]
    fn invalid_levels_surface_as_env_filter_errors() {
        let err = EnvFilter::try_new(filter_directive("admissions=loud"))
            .expect_err("not a level");
        let wrapped = TelemetryError::EnvFilter {
            value: "admissions=loud".to_string(),
            source: err,
        };
        assert!(wrapped.to_string().contains("admissions=loud"));
        assert!(std::error::Error::source(&wrapped).is_some());
    }
}
