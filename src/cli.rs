//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_alert_adapter::CsvAlertAdapter;
use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alert::{Action, AlertRecord};
use crate::domain::config_validation::{validate_replay_config, validate_store_config};
use crate::domain::error::AlertsimError;
use crate::domain::grouping::partition_alerts;
use crate::domain::replay::{replay, ReplayConfig};
use crate::ports::alert_port::AlertPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::{execution_price, QuotePort};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "alertsim", about = "Trading-signal replay simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay stored alerts and report per-group performance
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        instrument: Option<String>,
        /// Write the group summaries as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the full per-step trace as CSV
        #[arg(short, long)]
        trace: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Record one alert, resolving its execution price from the quote table
    Ingest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        strategy: String,
        #[arg(long)]
        instrument: String,
        #[arg(long)]
        interval: i64,
        #[arg(long)]
        action: String,
        /// Chart timestamp of the signal (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        chart_time: String,
        #[arg(long)]
        chart_price: f64,
    },
    /// List distinct (strategy, instrument, interval) groups in the store
    ListGroups {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show per-group alert counts and observed time ranges
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        instrument: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Replay {
            config,
            strategy,
            instrument,
            output,
            trace,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_replay(
                    &config,
                    strategy.as_deref(),
                    instrument.as_deref(),
                    output.as_deref(),
                    trace.as_deref(),
                )
            }
        }
        Command::Ingest {
            config,
            strategy,
            instrument,
            interval,
            action,
            chart_time,
            chart_price,
        } => run_ingest(
            &config,
            &strategy,
            &instrument,
            interval,
            &action,
            &chart_time,
            chart_price,
        ),
        Command::ListGroups { config } => run_list_groups(&config),
        Command::Info {
            config,
            strategy,
            instrument,
        } => run_info(&config, strategy.as_deref(), instrument.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AlertsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Build a [`ReplayConfig`] from the `[replay]` section.
pub fn build_replay_config(adapter: &dyn ConfigPort) -> ReplayConfig {
    ReplayConfig {
        leverage: adapter.get_double("replay", "leverage", 1.0),
        risk_fraction: adapter.get_double("replay", "risk_fraction", 1.0),
        starting_balance: adapter.get_double("replay", "starting_balance", 1000.0),
        fee_rate: adapter.get_double("replay", "fee_rate", 0.0),
        strategy_filter: adapter.get_string("replay", "strategy"),
        instrument_filter: adapter.get_string("replay", "instrument"),
    }
}

fn run_replay(
    config_path: &std::path::Path,
    strategy_override: Option<&str>,
    instrument_override: Option<&str>,
    output_path: Option<&std::path::Path>,
    trace_path: Option<&std::path::Path>,
) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_replay_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_store_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: build replay parameters, CLI filters win over config filters
    let mut replay_config = build_replay_config(&adapter);
    if let Some(s) = strategy_override {
        replay_config.strategy_filter = Some(s.to_string());
    }
    if let Some(i) = instrument_override {
        replay_config.instrument_filter = Some(i.to_string());
    }

    // Stage 3: open the store
    let alert_port = match CsvAlertAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let summary_out = output_path
        .map(PathBuf::from)
        .or_else(|| adapter.get_string("report", "summary_path").map(PathBuf::from));
    let trace_out = trace_path
        .map(PathBuf::from)
        .or_else(|| adapter.get_string("report", "trace_path").map(PathBuf::from));

    run_replay_pipeline(
        &alert_port,
        &replay_config,
        summary_out.as_deref(),
        trace_out.as_deref(),
    )
}

/// Stages 4-7: fetch, replay, print, write reports.
pub fn run_replay_pipeline(
    alert_port: &dyn AlertPort,
    replay_config: &ReplayConfig,
    summary_path: Option<&std::path::Path>,
    trace_path: Option<&std::path::Path>,
) -> ExitCode {
    // Stage 4: fetch alerts in store order
    let alerts = match alert_port.fetch_alerts(
        replay_config.strategy_filter.as_deref(),
        replay_config.instrument_filter.as_deref(),
    ) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Replaying {} alerts", alerts.len());

    // Stage 5: run the simulation
    let report = match replay(&alerts, replay_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 6: console summary to stderr
    eprintln!("\n=== Replay Results ===");
    if report.summaries.is_empty() {
        eprintln!("  no groups matched");
    }
    for s in &report.summaries {
        eprintln!(
            "  {} {} {}m: balance {:.2}, return {:+.2}%, {} trades, {:.1}% win rate, {} h",
            s.instrument,
            s.strategy,
            s.interval_minutes,
            s.final_balance,
            s.total_return_percent,
            s.trade_count,
            s.win_rate * 100.0,
            s.elapsed_hours,
        );
    }

    for fault in &report.faults {
        eprintln!("warning: group {} failed: {}", fault.key, fault.reason);
    }

    // Stage 7: optional report files
    let report_port = CsvReportAdapter::new();
    if let Some(path) = summary_path {
        if let Err(e) = report_port.write_summaries(&report.summaries, path) {
            eprintln!("error: failed to write summaries: {e}");
            return (&e).into();
        }
        eprintln!("\nSummaries written to: {}", path.display());
    }
    if let Some(path) = trace_path {
        if let Err(e) = report_port.write_trace(&report.steps, path) {
            eprintln!("error: failed to write trace: {e}");
            return (&e).into();
        }
        eprintln!("Trace written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(config_path: &std::path::Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_replay_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_store_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = build_replay_config(&adapter);
    eprintln!("Config validated successfully");
    eprintln!("\nReplay parameters:");
    eprintln!("  leverage:         {}", config.leverage);
    eprintln!("  risk_fraction:    {}", config.risk_fraction);
    eprintln!("  starting_balance: {}", config.starting_balance);
    eprintln!("  fee_rate:         {}", config.fee_rate);
    if let Some(s) = &config.strategy_filter {
        eprintln!("  strategy filter:  {s}");
    }
    if let Some(i) = &config.instrument_filter {
        eprintln!("  instrument filter: {i}");
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn run_ingest(
    config_path: &std::path::Path,
    strategy: &str,
    instrument: &str,
    interval: i64,
    action: &str,
    chart_time: &str,
    chart_price: f64,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let alert_port = match CsvAlertAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let quote_port = match CsvQuoteAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let chart_time = match NaiveDateTime::parse_from_str(chart_time, "%Y-%m-%d %H:%M:%S") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: invalid --chart-time (expected YYYY-MM-DD HH:MM:SS): {e}");
            return ExitCode::from(2);
        }
    };

    let action = Action::parse(action);

    // Fill price comes from the live side of the book for the direction
    let quote = match quote_port.latest_quote(instrument) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let price = execution_price(action, &quote);

    let alert = AlertRecord {
        strategy: strategy.to_string(),
        instrument: instrument.to_string(),
        interval_minutes: interval,
        action,
        chart_time,
        observed_time: chrono::Local::now().naive_local(),
        chart_price,
        execution_price: price,
    };

    if let Err(e) = alert_port.append_alert(&alert) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!(
        "Recorded {} {} on {} at {:.4} (bid {:.4} / ask {:.4})",
        action, instrument, strategy, price, quote.bid, quote.ask
    );
    ExitCode::SUCCESS
}

fn run_list_groups(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let alert_port = match CsvAlertAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let groups = match alert_port.list_groups() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if groups.is_empty() {
        eprintln!("No groups found");
    } else {
        for (key, count) in &groups {
            println!("{}: {} alerts", key, count);
        }
        eprintln!("{} groups found", groups.len());
    }
    ExitCode::SUCCESS
}

fn run_info(
    config_path: &std::path::Path,
    strategy: Option<&str>,
    instrument: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let alert_port = match CsvAlertAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let alerts = match alert_port.fetch_alerts(strategy, instrument) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let groups = partition_alerts(&alerts, None, None);
    if groups.is_empty() {
        eprintln!("No alerts found");
        return ExitCode::SUCCESS;
    }

    for group in &groups {
        // the partitioner never produces an empty group
        if let (Some(first), Some(last)) = (group.alerts.first(), group.alerts.last()) {
            println!(
                "{}: {} alerts, {} to {}",
                group.key,
                group.alerts.len(),
                first.observed_time,
                last.observed_time
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_replay_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_store_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}
