//! Facade behavior across installation shapes.
//!
//! The minimal-build assertions run under the default feature set; the
//! serve-build assertions only compile when the `serve` feature is enabled.

use ray::{ErrorKind, RuntimeConfig, modules::SERVE_MODULE};

#[test]
fn init_marks_compiled_modules_as_bundled() {
    let config = RuntimeConfig::builder().num_cpus(1.0).unwrap().build();
    let runtime = ray::init_with(config).unwrap();

    assert_eq!(
        runtime.modules().is_bundled(SERVE_MODULE),
        ray::serve::is_available()
    );
    runtime.shutdown();
}

#[cfg(not(feature = "serve"))]
mod minimal_build {
    use super::*;

    #[tokio::test]
    async fn serve_start_reports_missing_module() {
        assert!(!ray::serve::is_available());

        let error = ray::serve::start().await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::ModuleNotFound);
        assert!(
            error.message.contains("install \"ray[serve]\""),
            "hint missing from: {}",
            error.message
        );
    }

    #[tokio::test]
    async fn module_lookup_matches_stub_behavior() {
        let config = RuntimeConfig::builder().num_cpus(1.0).unwrap().build();
        let runtime = ray::init_with(config).unwrap();

        let lookup_error = runtime.modules().lookup(SERVE_MODULE).unwrap_err();
        let start_error = ray::serve::start().await.unwrap_err();
        assert_eq!(lookup_error.kind, start_error.kind);
        assert_eq!(lookup_error.message, start_error.message);
        runtime.shutdown();
    }
}

#[cfg(feature = "serve")]
mod serve_build {
    use super::*;

    #[tokio::test]
    async fn serve_starts_and_shuts_down() {
        assert!(ray::serve::is_available());

        let config = RuntimeConfig::builder().num_cpus(2.0).unwrap().build();
        let runtime = ray::init_with(config).unwrap();
        assert!(runtime.modules().lookup(SERVE_MODULE).is_ok());

        let serve_config = ray::serve::ServeConfig::builder().http_port(0).build();
        let serve = ray::serve::start_with(serve_config, runtime.clone())
            .await
            .unwrap();
        assert!(runtime.modules().is_running(SERVE_MODULE));

        serve.shutdown().await.unwrap();
        assert!(!runtime.modules().is_running(SERVE_MODULE));
        runtime.shutdown();
    }

    #[tokio::test]
    async fn start_errors_surface_as_core_errors() {
        let config = RuntimeConfig::builder().num_cpus(1.0).unwrap().build();
        let runtime = ray::init_with(config).unwrap();
        runtime.shutdown();

        let error = ray::serve::start_with(ray::serve::ServeConfig::default(), runtime)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Lifecycle);
    }
}
