//! Integration tests for logging system

use bridge_traits::logging::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(config.enable_spans);
    assert!(config.display_target);
}

#[test]
fn test_init_logging_only_once() {
    // Only one global subscriber may be installed per process, so both the
    // first and the second call live in this single test.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_filter("core_service=debug,provider_spotify=trace");

    assert!(init_logging(config.clone()).is_ok());

    tracing::info!(playlist_id = "pl-1", "logging initialized");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Logging(_))));
}
