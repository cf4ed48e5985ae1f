//! OAMSim CLI
//!
//! Command-line interface for the OAMSim telemetry and correlation engine.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use oamsim::config::LoggingConfig;
use oamsim::models::{EventQuery, KpiQuery, TimeRange};
use oamsim::{Config, Engine};

/// OAMSim - Simulated 5G core OA&M telemetry
#[derive(Parser)]
#[command(name = "oamsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "OAMSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine until Ctrl+C
    Run {
        /// Write periodic JSON snapshots into this directory
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
    },

    /// Run a load test against every node of one type
    LoadTest {
        /// Node type (gNB, AMF, SMF, UPF, PCF)
        #[arg(long)]
        node_type: String,

        /// Requested duration in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Intensity (low, medium, high)
        #[arg(long, default_value = "medium")]
        intensity: String,
    },

    /// Simulate a failure, failover and recovery on one node of a type
    Failover {
        /// Node type (gNB, AMF, SMF, UPF, PCF)
        #[arg(long)]
        node_type: String,
    },

    /// Collect KPI samples and print the summary
    Kpi {
        /// Collection cycles to run
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: u32,

        /// KPI id filter
        #[arg(long)]
        kpi: Option<String>,

        /// Node id filter
        #[arg(long)]
        node: Option<String>,

        /// Only samples from this trailing window (e.g. "15m")
        #[arg(long)]
        last: Option<humantime::Duration>,

        /// Export the filtered samples to this file instead of printing
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the configured topology
    Nodes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.logging, cli.verbose);

    let result = match cli.command {
        Commands::Run { snapshot_dir } => run_engine(config, snapshot_dir, cli.format).await,
        Commands::LoadTest {
            node_type,
            duration,
            intensity,
        } => run_load_test(config, &node_type, duration, &intensity, cli.format).await,
        Commands::Failover { node_type } => run_failover(config, &node_type, cli.format).await,
        Commands::Kpi {
            cycles,
            kpi,
            node,
            last,
            export,
        } => {
            let query = KpiQuery {
                kpi_id: kpi,
                node_id: node,
                time_range: last.map(|window| TimeRange::Last(*window)),
            };
            run_kpi(config, cycles, &query, export.as_deref(), cli.format)
        }
        Commands::Nodes => run_nodes(&config, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Option<WorkerGuard> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let (writer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "oamsim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(logging.directory.is_none())
        .with_writer(writer);

    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }

    guard
}

fn print_output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

async fn run_engine(
    mut config: Config,
    snapshot_dir: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(directory) = snapshot_dir {
        config.snapshot.enabled = true;
        config.snapshot.directory = directory;
    }

    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(config.metrics.listen_addr)
            .install()?;
        info!(addr = %config.metrics.listen_addr, "Prometheus exporter listening");
    }

    let engine = Engine::new(config)?;
    engine.start();

    println!(
        "OAMSim engine running with {} nodes",
        engine.status().nodes.total
    );
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");
    engine.stop().await;

    print_output(&engine.status(), format, |status| {
        println!(
            "Alarms:  {} total, {} active, {} cleared",
            status.alarms.total_alarms, status.alarms.active_alarms, status.alarms.cleared_alarms
        );
        println!(
            "KPI:     {} data points, {} open issues",
            status.kpi.data_points, status.kpi.open_issues
        );
        println!("Events:  {} generated", status.events.events_generated);
        println!("Nodes:   {}/{} healthy", status.nodes.healthy, status.nodes.total);
    })
}

async fn run_load_test(
    config: Config,
    node_type: &str,
    duration: u64,
    intensity: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let engine = Engine::new(config)?;

    if !engine.run_load_test(node_type, duration, intensity).await {
        anyhow::bail!("load test on {node_type} nodes did not run");
    }

    print_output(&engine.events(&EventQuery::default()), format, |events| {
        for event in events {
            println!(
                "#{:<4} {:<22} {}",
                event.id,
                event.event_type.as_str(),
                event.timestamp
            );
        }
    })
}

async fn run_failover(config: Config, node_type: &str, format: OutputFormat) -> anyhow::Result<()> {
    let engine = Engine::new(config)?;

    let Some(report) = engine.simulate_failover_scenario(node_type).await else {
        anyhow::bail!("no {node_type} nodes to fail over");
    };

    print_output(&report, format, |report| {
        println!("Failover on {} ({})", report.target_node, report.target_type);
        for event in &report.events {
            println!("  #{:<4} {}", event.id, event.event_type);
        }
        let m = &report.metrics;
        println!("Detection:  {:.2}s", m.detection_time_seconds);
        println!("Failover:   {:.0}s", m.failover_time_seconds);
        println!("Recovery:   {:.0}s", m.recovery_time_seconds);
        println!("Downtime:   {:.2}s", m.total_downtime_seconds);
        println!("Recovered:  {}", m.recovery_success);
    })
}

fn run_kpi(
    config: Config,
    cycles: u32,
    query: &KpiQuery,
    export: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let engine = Engine::new(config)?;

    for _ in 0..cycles {
        engine.collect_kpis()?;
    }

    if let Some(path) = export {
        if !engine.export_kpi_data(path, query) {
            anyhow::bail!("failed to export KPI data to {}", path.display());
        }
        println!("Exported KPI data to {}", path.display());
        return Ok(());
    }

    print_output(&engine.kpi_summary(query), format, |summary| {
        println!(
            "{:<26} {:<10} {:>9} {:>9} {:>9} {:>6} {:>9}",
            "KPI", "NODE", "MIN", "MAX", "AVG", "COUNT", "LATEST"
        );
        for (kpi_id, nodes) in summary {
            for (node_id, s) in nodes {
                println!(
                    "{:<26} {:<10} {:>9.2} {:>9.2} {:>9.2} {:>6} {:>9.2}",
                    kpi_id, node_id, s.min, s.max, s.avg, s.count, s.latest
                );
            }
        }
    })?;

    if format == OutputFormat::Text {
        let issues = engine.kpi_issues();
        if !issues.is_empty() {
            println!();
            println!("Issues:");
            for issue in issues {
                println!(
                    "  [{}] {} on {}: {:.2}{}",
                    issue.severity, issue.kpi_name, issue.node_id, issue.value, issue.unit
                );
            }
        }
    }

    Ok(())
}

fn run_nodes(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    print_output(&config.nodes, format, |nodes| {
        println!("{:<10} {:<5} {:<15} {}", "ID", "TYPE", "ADDRESS", "STATUS");
        for node in nodes {
            println!(
                "{:<10} {:<5} {:<15} {}",
                node.id,
                node.node_type.as_str(),
                node.address.to_string(),
                node.status
            );
        }
    })
}
