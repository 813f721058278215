//! Functional tests for installation-shape verification.

use ray_cli::{ExpectedInstall, ProbeStatus, evaluate_install, run_probes};

fn expected_status() -> ProbeStatus {
    if ray::serve::is_available() {
        ProbeStatus::Available
    } else {
        ProbeStatus::MissingWithHint
    }
}

#[tokio::test]
async fn probes_match_build_shape() {
    let reports = run_probes(false, false).await;
    assert_eq!(reports.len(), 1);

    let serve = &reports[0];
    assert_eq!(serve.module, "serve");
    assert_eq!(serve.status, expected_status());
    if serve.status == ProbeStatus::MissingWithHint {
        assert!(serve.detail.contains("install \"ray[serve]\""));
    }
}

#[tokio::test]
async fn parallel_probes_agree_with_sequential() {
    let sequential = run_probes(false, false).await;
    let parallel = run_probes(true, false).await;
    assert_eq!(sequential.len(), parallel.len());
    assert_eq!(sequential[0].status, parallel[0].status);
}

#[tokio::test]
async fn evaluation_accepts_matching_shape() {
    let reports = run_probes(false, false).await;
    let matching = if ray::serve::is_available() {
        ExpectedInstall::Full
    } else {
        ExpectedInstall::Minimal
    };
    let mismatched = if ray::serve::is_available() {
        ExpectedInstall::Minimal
    } else {
        ExpectedInstall::Full
    };

    assert!(evaluate_install(matching, &reports).is_ok());
    let error = evaluate_install(mismatched, &reports).unwrap_err();
    assert!(error.to_string().contains("serve"));
}
