//! Tests for PilotError type

use super::*;

#[test]
fn test_malformed_payload_display() {
    let error = PilotError::MalformedPayload("expected ','".to_string());
    let msg = error.to_string();
    assert!(msg.contains("Malformed dictionary payload"));
    assert!(msg.contains("expected ','"));
}

#[test]
fn test_remote_error_display() {
    let error = PilotError::Remote("connection refused".to_string());
    let msg = error.to_string();
    assert!(msg.contains("Remote tag search failed"));
    assert!(msg.contains("connection refused"));
}

#[test]
fn test_settings_error_display() {
    let error = PilotError::Settings("unknown delimiter mode".to_string());
    assert!(error.to_string().contains("unknown delimiter mode"));
}

#[test]
fn test_io_error_from_std_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test error");
    let pilot_err = PilotError::from(io_err);
    assert!(matches!(pilot_err, PilotError::Io(_)));
    assert!(pilot_err.to_string().contains("test error"));
}

#[test]
fn test_error_debug() {
    let error = PilotError::Remote("timeout".to_string());
    let debug_str = format!("{:?}", error);
    assert!(debug_str.contains("Remote"));
}
