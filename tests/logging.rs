// tests/logging.rs

use inotools::logging::{resolve_level, LogLevel};

#[test]
fn log_level_parses_case_insensitively() {
    assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert_eq!("Trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    assert!("loud".parse::<LogLevel>().is_err());
}

#[test]
fn explicit_level_wins() {
    assert_eq!(resolve_level(Some(LogLevel::Error)), tracing::Level::ERROR);
    assert_eq!(resolve_level(Some(LogLevel::Trace)), tracing::Level::TRACE);
}
