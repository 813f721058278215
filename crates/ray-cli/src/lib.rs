//! # Ray CLI
//!
//! Command-line interface for inspecting a Ray installation: runtime status,
//! optional-module availability, and installation-shape verification for CI.
//!
//! ## Features
//!
//! - Show runtime state and the node resource-load report
//! - List optional modules with install hints for missing ones
//! - Verify the installation shape (minimal vs full) with a process exit
//!   status CI can gate on
//! - JSON and human-readable output formats
//!
//! ## Usage
//!
//! ```bash
//! # Runtime status
//! ray-cli status
//!
//! # Which optional modules does this build carry?
//! ray-cli modules --json
//!
//! # CI gate: a minimal build must answer serve with the install hint
//! ray-cli verify-install --expect minimal
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::runtime::Runtime;

use ray::{ModuleStatus, ResourceLoad, RuntimeState};

/// Environment variable selecting parallel probe execution.
///
/// When set to any non-empty value, `verify-install` runs its probes
/// concurrently; otherwise they run sequentially with verbose output.
pub const PARALLEL_CI_ENV: &str = "PARALLEL_CI";

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "ray-cli",
    version,
    about = "Command-line tools for inspecting and verifying Ray installations."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show runtime status and the node resource-load report
    Status {
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// List optional modules with availability and install hints
    Modules {
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Verify that this build matches the expected installation shape
    #[command(name = "verify-install")]
    VerifyInstall {
        /// Expected installation shape
        #[arg(long, value_enum, default_value = "minimal")]
        expect: ExpectedInstall,
        /// Emit the probe reports as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Installation shapes `verify-install` can check for
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedInstall {
    /// Base installation without optional extras
    Minimal,
    /// Installation with every optional extra
    Full,
}

/// Run the CLI application
pub fn run_cli() {
    let cli = Cli::parse();
    let rt = Runtime::new().expect("tokio rt");
    rt.block_on(async move {
        let outcome = match cli.command {
            Commands::Status { json } => cmd_status(json).await,
            Commands::Modules { json } => cmd_modules(json).await,
            Commands::VerifyInstall { expect, json } => cmd_verify_install(expect, json).await,
        };
        if let Err(e) = outcome {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    });
}

/// Status report emitted by `ray-cli status`
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Runtime version
    pub version: &'static str,
    /// Current runtime state
    pub state: RuntimeState,
    /// Whether this runtime belongs to a minimal installation
    pub minimal: bool,
    /// Node resource-load report
    pub resource_load: ResourceLoad,
}

async fn cmd_status(json: bool) -> anyhow::Result<()> {
    let runtime = ray::init()?;
    let report = StatusReport {
        version: ray::RUNTIME_VERSION,
        state: runtime.state(),
        minimal: runtime.is_minimal(),
        resource_load: runtime.resource_load(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("ray {} ({:?})", report.version, report.state);
        println!("minimal install: {}", report.minimal);
        println!("node total:      {}", report.resource_load.total);
        println!("node available:  {}", report.resource_load.available);
        if report.resource_load.shapes.is_empty() {
            println!("queued demand:   none");
        } else {
            println!("queued demand:");
            for shape in &report.resource_load.shapes {
                println!(
                    "  {} ready={} infeasible={} backlog={}",
                    shape.shape,
                    shape.ready_requests_queued,
                    shape.infeasible_requests_queued,
                    shape.backlog_size
                );
            }
        }
    }

    runtime.shutdown();
    Ok(())
}

async fn cmd_modules(json: bool) -> anyhow::Result<()> {
    let runtime = ray::init()?;
    let statuses = runtime.modules().statuses();

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            print_module_status(status);
        }
    }

    runtime.shutdown();
    Ok(())
}

fn print_module_status(status: &ModuleStatus) {
    if status.bundled {
        let state = if status.running { "running" } else { "installed" };
        println!("{:<10} {:<10} {}", status.name, state, status.summary);
    } else {
        println!(
            "{:<10} {:<10} install \"{}\" to enable: {}",
            status.name, "missing", status.install_extra, status.summary
        );
    }
}

/// How one optional-module probe turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The module started and shut down cleanly
    Available,
    /// The module is absent and reported the friendly install hint
    MissingWithHint,
    /// The module misbehaved: wrong error kind, or a hint-less message
    Broken,
}

/// Report for one probed module
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Probed module name
    pub module: String,
    /// Probe outcome
    pub status: ProbeStatus,
    /// Human-readable detail, e.g. the observed error message
    pub detail: String,
}

/// Probe every cataloged optional module.
///
/// With `parallel` set the probes run concurrently; otherwise sequentially,
/// printing one line per probe when `verbose` is set.
pub async fn run_probes(parallel: bool, verbose: bool) -> Vec<ProbeReport> {
    let probes = vec![probe_serve()];

    if parallel {
        futures::future::join_all(probes).await
    } else {
        let mut reports = Vec::with_capacity(probes.len());
        for probe in probes {
            let report = probe.await;
            if verbose {
                println!(
                    "probe {:<10} {:?}: {}",
                    report.module, report.status, report.detail
                );
            }
            reports.push(report);
        }
        reports
    }
}

/// Check probe reports against the expected installation shape
pub fn evaluate_install(expect: ExpectedInstall, reports: &[ProbeReport]) -> anyhow::Result<()> {
    for report in reports {
        let ok = match expect {
            ExpectedInstall::Minimal => report.status == ProbeStatus::MissingWithHint,
            ExpectedInstall::Full => report.status == ProbeStatus::Available,
        };
        if !ok {
            anyhow::bail!(
                "module '{}' does not match the expected {:?} installation: {:?} ({})",
                report.module,
                expect,
                report.status,
                report.detail
            );
        }
    }
    Ok(())
}

async fn cmd_verify_install(expect: ExpectedInstall, json: bool) -> anyhow::Result<()> {
    let parallel = std::env::var(PARALLEL_CI_ENV)
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    let reports = run_probes(parallel, !json).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    evaluate_install(expect, &reports)?;
    println!("installation matches the expected {expect:?} shape");
    Ok(())
}

#[cfg(feature = "serve")]
async fn probe_serve() -> ProbeReport {
    // A real start/shutdown round trip on an ephemeral port.
    let probe = async {
        let config = ray::RuntimeConfig::builder()
            .num_cpus(1.0)
            .map_err(|e| anyhow::anyhow!(e))?
            .build();
        let runtime = ray::init_with(config)?;
        let serve_config = ray::serve::ServeConfig::builder().http_port(0).build();
        let serve = ray::serve::start_with(serve_config, runtime.clone()).await?;
        serve.shutdown().await.map_err(|e| anyhow::anyhow!(e))?;
        runtime.shutdown();
        Ok::<(), anyhow::Error>(())
    };
    match probe.await {
        Ok(()) => ProbeReport {
            module: "serve".to_string(),
            status: ProbeStatus::Available,
            detail: "started and shut down cleanly".to_string(),
        },
        Err(e) => ProbeReport {
            module: "serve".to_string(),
            status: ProbeStatus::Broken,
            detail: format!("startup failed in a serve build: {e}"),
        },
    }
}

#[cfg(not(feature = "serve"))]
async fn probe_serve() -> ProbeReport {
    use ray::ErrorKind;

    // A minimal build must answer with the module-not-found error and the
    // install hint; anything else is a packaging defect.
    let report = |status, detail| ProbeReport {
        module: "serve".to_string(),
        status,
        detail,
    };
    match ray::serve::start().await {
        Ok(_) => report(
            ProbeStatus::Broken,
            "serve started in a build that must not bundle it".to_string(),
        ),
        Err(e) if e.kind == ErrorKind::ModuleNotFound => {
            if e.message.contains("install \"ray[serve]\"") {
                report(ProbeStatus::MissingWithHint, e.message.clone())
            } else {
                report(
                    ProbeStatus::Broken,
                    format!("missing-module error lacks the install hint: {e}"),
                )
            }
        }
        Err(e) => report(
            ProbeStatus::Broken,
            format!("unexpected error kind {:?}: {e}", e.kind),
        ),
    }
}
