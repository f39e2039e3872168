//! Telemetry failures: installing the log subscriber and managing the metrics registry.

use prometheus::Error as PrometheusError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already in place.
    #[error("logging is already initialized")]
    LoggingInstalled {
        /// Underlying subscriber error.
        #[source]
        source: TryInitError,
    },
    /// A collector could not be built or added to the registry.
    #[error("metric setup failed")]
    Metric {
        /// `build` or `register`.
        operation: &'static str,
        /// Metric name.
        name: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The registry could not be rendered in the text exposition format.
    #[error("metrics could not be rendered")]
    Render {
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
}

impl TelemetryError {
    pub(crate) const fn metric(
        operation: &'static str,
        name: &'static str,
        source: PrometheusError,
    ) -> Self {
        Self::Metric {
            operation,
            name,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_are_constant_and_keep_the_cause() {
        let setup = TelemetryError::metric(
            "register",
            "rolecast_runs_total",
            PrometheusError::AlreadyReg,
        );
        assert_eq!(setup.to_string(), "metric setup failed");
        assert!(setup.source().is_some());
        assert!(matches!(
            setup,
            TelemetryError::Metric {
                operation: "register",
                name: "rolecast_runs_total",
                ..
            }
        ));

        let render = TelemetryError::Render {
            source: PrometheusError::Msg("broken family".to_string()),
        };
        assert_eq!(render.to_string(), "metrics could not be rendered");
        assert!(
            render
                .source()
                .is_some_and(|cause| cause.to_string().contains("broken family"))
        );
    }
}
