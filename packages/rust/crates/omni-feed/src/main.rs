//! omni-feed CLI: drive a feed over an in-memory collection.
//!
//! Logging: set `RUST_LOG=omni_feed=debug` (or pass `--verbose`) to see growth
//! pulses and count refreshes on stderr.

mod cli;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use omni_feed::{
    CycleReport, FeedEvent, Simulation, SimulationOptions, WindowConfig, load_window_config,
};

use crate::cli::{Cli, Command};

struct SimulateArgs {
    total: usize,
    initial_size: Option<usize>,
    step_size: Option<usize>,
    append_after: Option<usize>,
    append: usize,
    events: bool,
    max_cycles: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_feed=debug"
        } else {
            "omni_feed=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = load_window_config(&cli.config);

    match cli.command {
        Command::Simulate {
            total,
            initial_size,
            step_size,
            append_after,
            append,
            events,
            max_cycles,
        } => {
            simulate(
                config,
                SimulateArgs {
                    total,
                    initial_size,
                    step_size,
                    append_after,
                    append,
                    events,
                    max_cycles,
                },
            )
            .await
        }
        Command::Config => {
            let yaml = serde_yaml::to_string(&config).context("serialize config")?;
            print!("{yaml}");
            Ok(())
        }
    }
}

async fn simulate(mut config: WindowConfig, args: SimulateArgs) -> anyhow::Result<()> {
    if let Some(initial_size) = args.initial_size {
        config = config.with_initial_size(initial_size);
    }
    if let Some(step_size) = args.step_size {
        config = config.with_step_size(step_size);
    }
    let simulation = Simulation::new(
        config,
        SimulationOptions {
            total: args.total,
            append_after: args.append_after,
            append: args.append,
            max_cycles: args.max_cycles,
        },
    )
    .context("invalid window config")?;

    let printer = args.events.then(|| {
        let mut rx = simulation.feed().subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Ok(line) = serde_json::to_string(&event) {
                            println!("{line}");
                        }
                        if event == FeedEvent::Detached {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event printer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    });

    let result = simulation.run(print_cycle).await;
    if let Some(printer) = printer {
        printer.await.context("event printer")?;
    }
    result.context("simulation")?;
    Ok(())
}

fn print_cycle(report: &CycleReport) {
    let window = &report.window;
    println!(
        "cycle {}: limit={} fetched={} total={} reached={} more={}",
        report.cycle,
        window.limit,
        window.fetched_len,
        window
            .total
            .map_or_else(|| "unknown".to_string(), |total| total.to_string()),
        window.reached_limit,
        window.has_more,
    );
}
