//! Structural tests for the CLI argument surface.

use clap::CommandFactory;
use clap::Parser;
use ray_cli::{Cli, Commands, ExpectedInstall, PARALLEL_CI_ENV};

#[test]
fn cli_structure_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn parses_status() {
    let cli = Cli::parse_from(["ray-cli", "status", "--json"]);
    match cli.command {
        Commands::Status { json } => assert!(json),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_modules() {
    let cli = Cli::parse_from(["ray-cli", "modules"]);
    match cli.command {
        Commands::Modules { json } => assert!(!json),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_verify_install_with_default_expectation() {
    let cli = Cli::parse_from(["ray-cli", "verify-install"]);
    match cli.command {
        Commands::VerifyInstall { expect, json } => {
            assert_eq!(expect, ExpectedInstall::Minimal);
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_verify_install_full() {
    let cli = Cli::parse_from(["ray-cli", "verify-install", "--expect", "full", "--json"]);
    match cli.command {
        Commands::VerifyInstall { expect, json } => {
            assert_eq!(expect, ExpectedInstall::Full);
            assert!(json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_unknown_expectation() {
    assert!(Cli::try_parse_from(["ray-cli", "verify-install", "--expect", "tiny"]).is_err());
}

#[test]
fn parallel_flag_name_is_stable() {
    // CI wiring depends on this exact name.
    assert_eq!(PARALLEL_CI_ENV, "PARALLEL_CI");
}
