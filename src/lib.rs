// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod job;
pub mod jobs;
pub mod logging;
pub mod registry;
pub mod sched;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::registry::JobRegistry;
use crate::sched::{RunMode, RunOutcome, Scheduler};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading (or snapshot restore)
/// - the scheduler engine
/// - Ctrl-C handling (interrupt flag + snapshot on exit)
pub async fn run(args: CliArgs) -> Result<()> {
    let registry = JobRegistry::with_file_jobs();

    let mut scheduler;
    if args.restore {
        scheduler = Scheduler::default();
        scheduler.restore_state(&args.state_file, &registry)?;
    } else {
        let manifest = load_and_validate(&args.manifest)?;
        scheduler = Scheduler::new(manifest.pool_size);
        for record in manifest.roots {
            let job = registry.from_record(record)?;
            scheduler.schedule(job)?;
        }
    }

    if args.dry_run {
        print_dry_run(&scheduler);
        return Ok(());
    }

    let mode = if args.atomic {
        RunMode::Atomic
    } else {
        RunMode::Normal
    };

    // Ctrl-C → interrupt flag, polled by the run loop between steps.
    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            interrupt.store(true, Ordering::SeqCst);
        });
    }

    // The engine is synchronous and single-threaded by design; run it off
    // the async executor so Ctrl-C handling stays responsive.
    let (mut scheduler, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = scheduler.run_until(mode, &interrupt);
        (scheduler, outcome)
    })
    .await?;

    match outcome? {
        RunOutcome::Drained => info!("all jobs finished"),
        RunOutcome::Interrupted => {
            info!(state_file = %args.state_file, "interrupted; saving scheduler state");
            scheduler.save_state(&args.state_file)?;
        }
    }

    Ok(())
}

/// Simple dry-run output: print the scheduled graph without running it.
fn print_dry_run(scheduler: &Scheduler) {
    println!("jobrun dry-run");
    println!("  pool_size = {}", scheduler.pool_size());
    println!();

    let mut tracked = scheduler.tracked_ids();
    tracked.sort();

    println!("jobs ({}):", tracked.len());
    for job_id in &tracked {
        if let Some(job) = scheduler.job(job_id) {
            println!("  - {job_id} ({})", job.kind());
            if let Some(children) = scheduler.pending_children(job_id) {
                println!("      waiting on: {children:?}");
            }
        }
    }

    println!();
    println!("ready (next to run last): {:?}", scheduler.ready_ids());
}
