use super::error::SendError;
use super::logging;

#[test]
fn logging_init_accepts_repeat_calls() {
    // Should not panic
    logging::init(false);
    logging::init(true);
    logging::init(false);
}

#[test]
fn error_display_carries_context() {
    let err = SendError::InvalidAddress("!zz".to_string());
    assert!(err.to_string().contains("!zz"));

    let err = SendError::ConnectionTimeout(10);
    assert!(err.to_string().contains("10 seconds"));

    let err = SendError::ConnectionRejected("bad username or password".to_string());
    assert!(err.to_string().contains("bad username or password"));
}
