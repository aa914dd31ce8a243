//! `case-allocator` command-line entry point.
//!
//! Every subcommand runs one scheduler entry point against the configured
//! store and prints its result as pretty JSON on stdout. Logs go to stderr.
//!
//! Usage:
//!   case-allocator ingest --cases 20
//!   case-allocator allocate --include-revoked
//!   case-allocator reject --case-id case-3 --agency-id user-agency-alpha --reason "Wrong debtor"
//!   case-allocator check-sla
//!   case-allocator watch --interval-secs 60

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use case_allocator::builders::build_from_app_config;
use case_allocator::config::AppConfig;
use case_allocator::core::{synthetic_queue, AppResult, CaseStatus, SchedulerError};
use case_allocator::runtime::{case_status, health, run_sla_watcher};
use case_allocator::util::init_tracing_with_level;

/// Allocate collection cases to servicing agencies.
#[derive(Parser, Debug)]
#[command(name = "case-allocator", version)]
#[command(about = "Capacity- and priority-aware case allocation")]
struct Cli {
    /// Case store file (overrides CASE_STORE_PATH).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Agency registry file (overrides AGENCY_REGISTRY_PATH).
    #[arg(long, global = true)]
    agencies: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset the store and allocate a synthetic queue.
    Ingest {
        /// Number of cases to generate.
        #[arg(long)]
        cases: Option<usize>,
    },
    /// Allocate unassigned backlog cases.
    Allocate {
        /// Let REVOKED cases re-enter allocation.
        #[arg(long)]
        include_revoked: bool,
    },
    /// Reallocate a case after a rejection.
    Reallocate {
        /// Case to move.
        #[arg(long)]
        case_id: String,
        /// Agency that rejected it.
        #[arg(long)]
        rejected_by: String,
    },
    /// Record a rejection by the holding agency and reallocate.
    Reject {
        /// Case being declined.
        #[arg(long)]
        case_id: String,
        /// Declining agency.
        #[arg(long)]
        agency_id: String,
        /// Free-text reason.
        #[arg(long, default_value = "Rejected by agency")]
        reason: String,
    },
    /// Report progress on a held case.
    Progress {
        /// Case being worked.
        #[arg(long)]
        case_id: String,
        /// Holding agency.
        #[arg(long)]
        agency_id: String,
        /// New status.
        #[arg(long, value_enum)]
        status: ProgressArg,
    },
    /// Run one SLA sweep.
    CheckSla,
    /// Run SLA sweeps periodically until Ctrl-C.
    Watch {
        /// Seconds between sweeps (overrides SLA_SWEEP_INTERVAL_SECS).
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Show per-agency load and headroom.
    Report,
    /// Show a case and its audit trail.
    Show {
        /// Case to show.
        #[arg(long)]
        case_id: String,
    },
    /// Check that the registry and store are readable.
    Health,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProgressArg {
    /// Work in progress.
    Wip,
    /// Promise to pay.
    Ptp,
}

impl From<ProgressArg> for CaseStatus {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Wip => Self::Wip,
            ProgressArg::Ptp => Self::Ptp,
        }
    }
}

fn print_json(value: &impl Serialize) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{rendered}");
    Ok(())
}

async fn run(cli: Cli, mut app: AppConfig) -> AppResult<()> {
    if let Some(store) = cli.store {
        app.store_path = store;
    }
    if let Some(agencies) = cli.agencies {
        app.registry_path = agencies;
    }
    let service = build_from_app_config(&app)?;

    match cli.command {
        Command::Ingest { cases } => {
            let count = cases.unwrap_or(service.config().seed.case_count);
            let queue = synthetic_queue(count, chrono::Utc::now());
            print_json(&service.ingest(queue)?)
        }
        Command::Allocate { include_revoked } => {
            print_json(&service.allocate_backlog(include_revoked)?)
        }
        Command::Reallocate {
            case_id,
            rejected_by,
        } => print_json(&service.reallocate(&case_id, &rejected_by)?),
        Command::Reject {
            case_id,
            agency_id,
            reason,
        } => print_json(&service.reject(&case_id, &agency_id, &reason)?),
        Command::Progress {
            case_id,
            agency_id,
            status,
        } => print_json(&service.record_progress(&case_id, &agency_id, status.into())?),
        Command::CheckSla => print_json(&service.check_sla()?),
        Command::Watch { interval_secs } => {
            let every = interval_secs.map_or_else(|| app.sweep_interval(), Duration::from_secs);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("failed to listen for Ctrl-C: {}", e);
                }
            };
            let summary = run_sla_watcher(Arc::new(service), every, shutdown).await;
            print_json(&summary)
        }
        Command::Report => print_json(&service.capacity_report()?),
        Command::Show { case_id } => print_json(&case_status(&service, &case_id)?),
        Command::Health => print_json(&health(&service)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let app = match AppConfig::from_env() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing_with_level(&app.log_level);

    match run(cli, app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<SchedulerError>() {
            Some(SchedulerError::CaseNotFound(id)) => {
                tracing::warn!("case {} not found; nothing changed", id);
                ExitCode::SUCCESS
            }
            _ => {
                tracing::error!("{:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
