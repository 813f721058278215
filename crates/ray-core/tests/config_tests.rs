//! Integration tests for runtime configuration and the environment overlay.

use ray_core::{MINIMAL_INSTALL_ENV, RuntimeConfig};
use serial_test::serial;

#[test]
#[serial]
fn env_overlay_detects_minimal_install() {
    unsafe {
        std::env::set_var(MINIMAL_INSTALL_ENV, "1");
    }
    let config = RuntimeConfig::from_env();
    assert!(config.minimal);

    unsafe {
        std::env::remove_var(MINIMAL_INSTALL_ENV);
    }
}

#[test]
#[serial]
fn env_overlay_requires_exact_flag_value() {
    // Only the literal "1" marks a minimal install.
    for value in ["0", "true", "yes", ""] {
        unsafe {
            std::env::set_var(MINIMAL_INSTALL_ENV, value);
        }
        let config = RuntimeConfig::from_env();
        assert!(!config.minimal, "value {value:?} must not enable minimal mode");
    }

    unsafe {
        std::env::remove_var(MINIMAL_INSTALL_ENV);
    }
    let config = RuntimeConfig::from_env();
    assert!(!config.minimal);
}

#[test]
#[serial]
fn explicit_minimal_survives_without_env() {
    unsafe {
        std::env::remove_var(MINIMAL_INSTALL_ENV);
    }
    let config = RuntimeConfig::builder().minimal(true).build();
    assert!(config.minimal);
}
