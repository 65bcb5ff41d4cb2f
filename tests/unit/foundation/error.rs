use super::*;
use crate::status::parser::StatusPattern;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DisplayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DisplayError::transport("x")
            .to_string()
            .contains("transport error:")
    );
    assert!(
        DisplayError::status_fetch("x")
            .to_string()
            .contains("status fetch error:")
    );
}

#[test]
fn parse_errors_convert_and_name_the_line() {
    let err: DisplayError = StatusParseError::new(2, StatusPattern::Playback, "missing '['").into();
    let msg = err.to_string();
    assert!(msg.contains("status parse error:"));
    assert!(msg.contains("line 2"));
    assert!(err.is_status_error());
}

#[test]
fn only_fetch_and_parse_errors_are_status_errors() {
    assert!(DisplayError::status_fetch("exit 1").is_status_error());
    assert!(!DisplayError::transport("spi").is_status_error());
    assert!(!DisplayError::validation("geometry").is_status_error());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DisplayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
