//! Smoke test for minimal installations.
//!
//! Runs only in CI configured with a minimal Ray installation
//! (`RAY_MINIMAL=1`). It checks that touching the serving subsystem fails
//! with a module-not-found error whose message carries the remediation hint,
//! not a bare "no module" message. A build that bundles serve by mistake
//! fails this test too: startup then succeeds where it must not.

use ray::{ErrorKind, MINIMAL_INSTALL_ENV};
use regex::Regex;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn error_msg() {
    if std::env::var(MINIMAL_INSTALL_ENV).as_deref() != Ok("1") {
        eprintln!("skipped: only run in CI with a minimal Ray installation");
        return;
    }

    let error = match ray::serve::start().await {
        Ok(_) => panic!("serve started, but a minimal installation must not bundle it"),
        Err(error) => error,
    };

    assert_eq!(
        error.kind,
        ErrorKind::ModuleNotFound,
        "expected a module-not-found error, got {:?}: {error}",
        error.kind
    );

    let pattern = Regex::new(r#".*install "ray\[serve\]".*"#).unwrap();
    assert!(
        pattern.is_match(&error.message),
        "error message lacks the install hint: {}",
        error.message
    );
}
