//! CLI definition and dispatch.
//!
//! Every command reads an optional INI config, applies command-line
//! overrides on top of it, validates the relevant section and runs one
//! pipeline. Results go to stdout; progress and diagnostics go through
//! `tracing` to stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::build_data_port;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::{
    batch_json, reversal_report_json, snapshot_json, swing_outcome_json, volume_summary_json,
};
use crate::domain::analysis::{
    BacktestRequest, ReversalRequest, SnapshotRequest, VolumeTrendRequest, analyze_reversals,
    backtest_symbols, snapshot_symbols, volume_trend_symbols,
};
use crate::domain::batch::{SymbolResult, display_symbol};
use crate::domain::config_validation::{
    get_date, validate_backtest_config, validate_data_config, validate_reversal_config,
    validate_snapshot_config, validate_volume_trend_config,
};
use crate::domain::error::SwingscanError;
use crate::domain::numeric::format2;
use crate::domain::reversal::{DEFAULT_NUM_REVERSALS, DEFAULT_TOLERANCE_PCT};
use crate::domain::snapshot::Snapshot;
use crate::domain::swing::SwingOutcome;
use crate::domain::volume_trend::TrendVolumeSummary;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "swingscan", version, about = "Swing-trade backtests and support-level scans")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the swing backtest for one or more symbols
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated symbols, e.g. TCS.NS,MGL.NS
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        stop_loss: Option<f64>,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Find support levels for a single ticker
    Reversal {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long)]
        num_reversals: Option<usize>,
        #[arg(long)]
        range_width: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Latest or dated price snapshot, optionally sized by an investment
    Snapshot {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        investment: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Compare uptrend and downtrend volume
    VolumeTrend {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        /// Keep only symbols whose uptrend volume is higher
        #[arg(long)]
        only_higher: bool,
        #[arg(long)]
        json: bool,
    },
    /// List symbols known to the configured data source
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        listen: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbols,
            start_date,
            end_date,
            stop_loss,
            target,
            json,
        } => load_config(config.as_deref()).and_then(|mut cfg| {
            apply_overrides(
                &mut cfg,
                "backtest",
                &[
                    ("symbols", symbols),
                    ("start_date", start_date),
                    ("end_date", end_date),
                    ("stop_loss_percent", stop_loss.map(|v| v.to_string())),
                    ("target_percent", target.map(|v| v.to_string())),
                ],
            );
            run_backtest(&cfg, json)
        }),
        Command::Reversal {
            config,
            ticker,
            start_date,
            end_date,
            tolerance,
            num_reversals,
            range_width,
            json,
        } => load_config(config.as_deref()).and_then(|mut cfg| {
            apply_overrides(
                &mut cfg,
                "reversal",
                &[
                    ("ticker", ticker),
                    ("start_date", start_date),
                    ("end_date", end_date),
                    ("tolerance_percentage", tolerance.map(|v| v.to_string())),
                    ("num_reversals", num_reversals.map(|v| v.to_string())),
                    ("range_width", range_width.map(|v| v.to_string())),
                ],
            );
            run_reversal(&cfg, json)
        }),
        Command::Snapshot {
            config,
            symbols,
            date,
            investment,
            json,
        } => load_config(config.as_deref()).and_then(|mut cfg| {
            apply_overrides(
                &mut cfg,
                "snapshot",
                &[
                    ("symbols", symbols),
                    ("date", date),
                    ("investment", investment.map(|v| v.to_string())),
                ],
            );
            run_snapshot(&cfg, json)
        }),
        Command::VolumeTrend {
            config,
            symbols,
            start_date,
            end_date,
            only_higher,
            json,
        } => load_config(config.as_deref()).and_then(|mut cfg| {
            apply_overrides(
                &mut cfg,
                "volume_trend",
                &[
                    ("symbols", symbols),
                    ("start_date", start_date),
                    ("end_date", end_date),
                    ("only_higher", only_higher.then(|| "true".to_string())),
                ],
            );
            run_volume_trend(&cfg, json)
        }),
        Command::ListSymbols { config } => {
            load_config(config.as_deref()).and_then(|cfg| run_list_symbols(&cfg))
        }
        Command::Serve { config, listen } => load_config(config.as_deref()).and_then(|mut cfg| {
            apply_overrides(&mut cfg, "web", &[("listen", listen)]);
            run_serve(cfg)
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load the config file (or start empty) and install the log subscriber.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SwingscanError> {
    let config = match path {
        Some(p) => FileConfigAdapter::from_file(p)?,
        None => FileConfigAdapter::new(),
    };
    init_tracing(&config);
    if let Some(p) = path {
        tracing::debug!(path = %p.display(), "loaded config");
    }
    validate_data_config(&config)?;
    Ok(config)
}

/// `RUST_LOG` wins, then `[logging] filter`, then `info`. Logs go to stderr.
pub fn init_tracing(config: &dyn ConfigPort) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = config
            .get_string("logging", "filter")
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        tracing_subscriber::EnvFilter::try_new(directive)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    });
    // A second init (tests, repeated runs) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn apply_overrides(
    config: &mut FileConfigAdapter,
    section: &str,
    overrides: &[(&str, Option<String>)],
) {
    for (key, value) in overrides {
        if let Some(v) = value {
            config.set(section, key, v.clone());
        }
    }
}

/// Comma-separated symbols from `[section] symbols`, trimmed and upper-cased.
pub fn resolve_symbols(config: &dyn ConfigPort, section: &str) -> Result<Vec<String>, SwingscanError> {
    let symbols: Vec<String> = config
        .get_string(section, "symbols")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(SwingscanError::ConfigMissing {
            section: section.to_string(),
            key: "symbols".to_string(),
        });
    }
    Ok(symbols)
}

fn require_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, SwingscanError> {
    get_date(config, section, key)?.ok_or_else(|| SwingscanError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn require_double(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, SwingscanError> {
    if config.get_string(section, key).is_none() {
        return Err(SwingscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        });
    }
    Ok(config.get_double(section, key, f64::NAN))
}

pub fn build_backtest_request(config: &dyn ConfigPort) -> Result<BacktestRequest, SwingscanError> {
    validate_backtest_config(config)?;
    Ok(BacktestRequest {
        symbols: resolve_symbols(config, "backtest")?,
        start_date: require_date(config, "backtest", "start_date")?,
        end_date: get_date(config, "backtest", "end_date")?,
        stop_loss_pct: require_double(config, "backtest", "stop_loss_percent")?,
        target_pct: require_double(config, "backtest", "target_percent")?,
    })
}

pub fn build_reversal_request(config: &dyn ConfigPort) -> Result<ReversalRequest, SwingscanError> {
    validate_reversal_config(config)?;
    let ticker = config
        .get_string("reversal", "ticker")
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SwingscanError::ConfigMissing {
            section: "reversal".to_string(),
            key: "ticker".to_string(),
        })?;
    let range_width = config
        .get_string("reversal", "range_width")
        .map(|_| config.get_double("reversal", "range_width", f64::NAN));

    Ok(ReversalRequest {
        ticker,
        start_date: require_date(config, "reversal", "start_date")?,
        end_date: get_date(config, "reversal", "end_date")?,
        tolerance_pct: config.get_double("reversal", "tolerance_percentage", DEFAULT_TOLERANCE_PCT),
        num_reversals: config
            .get_int("reversal", "num_reversals", DEFAULT_NUM_REVERSALS as i64)
            .max(0) as usize,
        range_width,
    })
}

pub fn build_snapshot_request(config: &dyn ConfigPort) -> Result<SnapshotRequest, SwingscanError> {
    validate_snapshot_config(config)?;
    let investment = config
        .get_string("snapshot", "investment")
        .map(|_| config.get_double("snapshot", "investment", f64::NAN));
    Ok(SnapshotRequest {
        symbols: resolve_symbols(config, "snapshot")?,
        date: get_date(config, "snapshot", "date")?,
        investment,
    })
}

pub fn build_volume_trend_request(
    config: &dyn ConfigPort,
) -> Result<VolumeTrendRequest, SwingscanError> {
    validate_volume_trend_config(config)?;
    Ok(VolumeTrendRequest {
        symbols: resolve_symbols(config, "volume_trend")?,
        start_date: require_date(config, "volume_trend", "start_date")?,
        end_date: get_date(config, "volume_trend", "end_date")?,
        only_higher: config.get_bool("volume_trend", "only_higher", false),
    })
}

fn run_backtest(config: &FileConfigAdapter, json: bool) -> Result<(), SwingscanError> {
    let req = build_backtest_request(config)?;
    let port = build_data_port(config)?;
    tracing::info!(
        symbols = req.symbols.len(),
        start = %req.start_date,
        stop_loss_pct = req.stop_loss_pct,
        target_pct = req.target_pct,
        "running backtest"
    );

    let results = backtest_symbols(port.as_ref(), &req)?;
    if json {
        println!("{:#}", batch_json(&results, swing_outcome_json));
    } else {
        print_batch(&results, format_outcome);
    }
    Ok(())
}

fn run_reversal(config: &FileConfigAdapter, json: bool) -> Result<(), SwingscanError> {
    let req = build_reversal_request(config)?;
    let port = build_data_port(config)?;
    tracing::info!(ticker = %req.ticker, start = %req.start_date, "scanning reversals");

    let report = analyze_reversals(port.as_ref(), &req)?;
    if json {
        println!("{:#}", reversal_report_json(&report));
        return Ok(());
    }

    println!("{}", display_symbol(&report.ticker));
    if report.levels.is_empty() {
        println!("  no reversal points");
    }
    for level in &report.levels {
        println!("  {:>12}  x{}", format2(level.price), level.count);
    }
    if let Some(ranges) = &report.ranges {
        for range in ranges {
            println!("  range {:>15}  x{}", range.label(), range.count);
        }
    }
    for (period, value) in &report.sma {
        println!("  SMA{:<4} {:>12}", period, format2(*value));
    }
    println!("  volume  {}", format_volume(&report.volume));
    Ok(())
}

fn run_snapshot(config: &FileConfigAdapter, json: bool) -> Result<(), SwingscanError> {
    let req = build_snapshot_request(config)?;
    let port = build_data_port(config)?;
    tracing::info!(symbols = req.symbols.len(), date = ?req.date, "taking snapshots");

    let results = snapshot_symbols(port.as_ref(), &req)?;
    if json {
        println!("{:#}", batch_json(&results, snapshot_json));
    } else {
        print_batch(&results, format_snapshot);
    }
    Ok(())
}

fn run_volume_trend(config: &FileConfigAdapter, json: bool) -> Result<(), SwingscanError> {
    let req = build_volume_trend_request(config)?;
    let port = build_data_port(config)?;
    tracing::info!(symbols = req.symbols.len(), only_higher = req.only_higher, "classifying volume");

    let results = volume_trend_symbols(port.as_ref(), &req);
    if json {
        println!("{:#}", batch_json(&results, volume_summary_json));
    } else {
        print_batch(&results, format_volume);
    }
    Ok(())
}

fn run_list_symbols(config: &FileConfigAdapter) -> Result<(), SwingscanError> {
    let port = build_data_port(config)?;
    let symbols = port.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn print_batch<T>(results: &[SymbolResult<T>], format: impl Fn(&T) -> String) {
    for entry in results {
        match &entry.result {
            Ok(v) => println!("{:<12} {}", entry.display_symbol(), format(v)),
            Err(e) => println!("{:<12} error: {}", entry.display_symbol(), e),
        }
    }
}

fn format_outcome(o: &SwingOutcome) -> String {
    let exit = match (o.exit_date, o.exit_price) {
        (Some(d), Some(p)) => format!("exit {} @ {}", d, format2(p)),
        _ => format!("latest {}", format2(o.latest_close)),
    };
    format!(
        "{:?}  entry {} @ {}  {}  stop {}  target {}  profit {}  ratchets {}",
        o.status,
        o.entry_date,
        format2(o.entry_price),
        exit,
        format2(o.stop_loss),
        format2(o.target),
        format2(o.profit),
        o.ratchets
    )
}

fn format_snapshot(s: &Snapshot) -> String {
    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), format2);
    match s {
        Snapshot::Latest(l) => format!(
            "{}  open {}  close {}  change {}%",
            l.date,
            format2(l.open),
            format2(l.close),
            format2(l.day_change_pct)
        ),
        Snapshot::Dated(d) => {
            let mut line = format!(
                "{}  close {}  latest {} ({}%)  next {}  3rd {}  6th {}",
                d.date,
                format2(d.date_price),
                format2(d.latest_price),
                format2(d.change_pct()),
                opt(d.next_day),
                opt(d.third_trading_day),
                opt(d.sixth_trading_day)
            );
            if let Some(p) = &d.position {
                line.push_str(&format!(
                    "  qty {}  invested {}  value {}  profit {} ({}%)",
                    p.quantity,
                    format2(p.invested_amount),
                    format2(p.market_value(d.latest_price)),
                    format2(p.unrealized_pnl(d.latest_price)),
                    format2(p.unrealized_pnl_pct(d.latest_price))
                ));
            }
            line
        }
    }
}

fn format_volume(v: &TrendVolumeSummary) -> String {
    let avg = |a: Option<f64>| a.map_or_else(|| "-".to_string(), format2);
    let ratio = match v.percentage_higher.value() {
        Some(r) if r.is_infinite() => "inf".to_string(),
        Some(r) => format!("{}%", format2(r)),
        None => "no data".to_string(),
    };
    format!(
        "up avg {} ({} days)  down avg {} ({} days)  higher {}  ratio {}",
        avg(v.avg_volume_uptrend),
        v.uptrend_volumes.len(),
        avg(v.avg_volume_downtrend),
        v.downtrend_volumes.len(),
        v.higher_volume_uptrend,
        ratio
    )
}

fn run_serve(config: FileConfigAdapter) -> Result<(), SwingscanError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::net::SocketAddr;
        use std::sync::Arc;

        let listen = config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let addr: SocketAddr = listen.trim().parse().map_err(|_| SwingscanError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: format!("'{listen}' is not a socket address"),
        })?;

        // Built outside the runtime; blocking HTTP clients refuse to start inside one.
        let data_port = build_data_port(&config)?;
        let state = AppState {
            data_port: Arc::clone(&data_port),
            config: Arc::new(config),
        };
        let router = build_router(state);

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "listening");
            axum::serve(listener, router).await?;
            Ok::<(), SwingscanError>(())
        })?;
        drop(runtime);
        drop(data_port);
        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config;
        Err(SwingscanError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: "built without the `web` feature".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn cli_parses_backtest_overrides() {
        let cli = Cli::try_parse_from([
            "swingscan",
            "backtest",
            "--symbols",
            "TCS.NS,MGL.NS",
            "--start-date",
            "2023-10-30",
            "--stop-loss",
            "15",
            "--target",
            "10",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                symbols,
                stop_loss,
                json,
                config,
                ..
            } => {
                assert_eq!(symbols.as_deref(), Some("TCS.NS,MGL.NS"));
                assert_eq!(stop_loss, Some(15.0));
                assert!(json);
                assert!(config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn resolve_symbols_trims_and_uppercases() {
        let cfg = config("[backtest]\nsymbols = tcs.ns, MGL.NS ,,\n");
        assert_eq!(
            resolve_symbols(&cfg, "backtest").unwrap(),
            vec!["TCS.NS", "MGL.NS"]
        );
    }

    #[test]
    fn resolve_symbols_requires_at_least_one() {
        let cfg = config("[backtest]\nsymbols = ,\n");
        assert!(matches!(
            resolve_symbols(&cfg, "backtest"),
            Err(SwingscanError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = config("[backtest]\nsymbols = TCS.NS\nstart_date = 2023-10-30\nstop_loss_percent = 15\ntarget_percent = 10\n");
        apply_overrides(
            &mut cfg,
            "backtest",
            &[("target_percent", Some("20".to_string())), ("end_date", None)],
        );
        let req = build_backtest_request(&cfg).unwrap();
        assert_eq!(req.target_pct, 20.0);
        assert_eq!(req.stop_loss_pct, 15.0);
        assert!(req.end_date.is_none());
    }

    #[test]
    fn backtest_request_requires_percentages() {
        let cfg = config("[backtest]\nsymbols = TCS.NS\nstart_date = 2023-10-30\ntarget_percent = 10\n");
        match build_backtest_request(&cfg) {
            Err(SwingscanError::ConfigMissing { key, .. }) => assert_eq!(key, "stop_loss_percent"),
            other => panic!("expected missing stop loss, got {other:?}"),
        }
    }

    #[test]
    fn reversal_request_defaults() {
        let cfg = config("[reversal]\nticker = tcs.ns\nstart_date = 2024-01-01\n");
        let req = build_reversal_request(&cfg).unwrap();
        assert_eq!(req.ticker, "TCS.NS");
        assert_eq!(req.tolerance_pct, DEFAULT_TOLERANCE_PCT);
        assert_eq!(req.num_reversals, DEFAULT_NUM_REVERSALS);
        assert!(req.range_width.is_none());
    }

    #[test]
    fn snapshot_request_reads_investment() {
        let cfg = config("[snapshot]\nsymbols = TRENT.NS\ndate = 2024-05-31\ninvestment = 10000\n");
        let req = build_snapshot_request(&cfg).unwrap();
        assert_eq!(req.investment, Some(10000.0));
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 5, 31));
    }

    #[test]
    fn volume_trend_request_reads_flag() {
        let cfg = config("[volume_trend]\nsymbols = TCS.NS\nstart_date = 2024-01-01\nonly_higher = yes\n");
        let req = build_volume_trend_request(&cfg).unwrap();
        assert!(req.only_higher);
    }
}
