use stk_core::errors::{ErrorInfo, StkError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("track_id", "7")
        .with_context("reason", "example")
}

#[test]
fn parameter_error_surface() {
    let err = StkError::Parameter(sample_info("non-positive-parameter", "rate must be positive"));
    assert_eq!(err.info().code, "non-positive-parameter");
    assert!(err.info().context.contains_key("track_id"));
}

#[test]
fn track_error_surface() {
    let err = StkError::Track(sample_info("unknown-track", "no such track"));
    assert_eq!(err.info().code, "unknown-track");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn fit_error_surface() {
    let err = StkError::Fit(sample_info("no-convergence", "damping saturated"));
    assert_eq!(err.info().code, "no-convergence");
}

#[test]
fn display_includes_context_and_hint() {
    let err = StkError::Signal(
        ErrorInfo::new("zero-mean", "cannot normalize")
            .with_context("signal_len", "16")
            .with_hint("disable normalization"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("zero-mean"));
    assert!(rendered.contains("signal_len=16"));
    assert!(rendered.contains("disable normalization"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = StkError::Serde(sample_info("canonical-json", "bad payload"));
    let json = serde_json::to_string(&err).unwrap();
    let back: StkError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
}
