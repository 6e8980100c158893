//! CLI definition and dispatch.

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::alpha_vantage_adapter::{AlphaVantageAdapter, DEFAULT_BASE_URL};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::AnalysisState;
use crate::domain::error::TickercastError;
use crate::domain::forecast::DEFAULT_HORIZON_DAYS;
use crate::domain::service::AnalysisService;
use crate::ports::config_port::ConfigPort;

/// Environment variable that overrides `[source] api_key`.
pub const API_KEY_ENV: &str = "TICKERCAST_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "tickercast", about = "Daily price trend analysis and forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fetch the latest bars, rewrite the store, and refit
    Refresh {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print forecast closes for the days after the last bar
    Forecast {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_HORIZON_DAYS,
            value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
        )]
        days: usize,
    },
    /// Show what the store holds and the fitted model
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Settings resolved from the INI file and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub symbol: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub output_size: String,
    pub timeout: Duration,
    pub listen: SocketAddr,
}

impl AppConfig {
    pub fn require_api_key(&self) -> Result<&str, TickercastError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| TickercastError::ConfigMissing {
                section: "source".into(),
                key: "api_key".into(),
            })
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Refresh { config } => run_refresh(&config),
        Command::Forecast { config, days } => run_forecast(&config, days),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<AppConfig, ExitCode> {
    let result = FileConfigAdapter::from_file(path)
        .and_then(|adapter| build_app_config(&adapter, std::env::var(API_KEY_ENV).ok()));
    result.map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_app_config(
    adapter: &dyn ConfigPort,
    env_api_key: Option<String>,
) -> Result<AppConfig, TickercastError> {
    let timeout_secs = adapter.get_int("source", "timeout_secs", 10);
    if timeout_secs <= 0 {
        return Err(TickercastError::ConfigInvalid {
            section: "source".into(),
            key: "timeout_secs".into(),
            reason: "must be a positive number of seconds".into(),
        });
    }

    let output_size = adapter
        .get_string("source", "output_size")
        .unwrap_or_else(|| "compact".to_string());
    if output_size != "compact" && output_size != "full" {
        return Err(TickercastError::ConfigInvalid {
            section: "source".into(),
            key: "output_size".into(),
            reason: "expected compact or full".into(),
        });
    }

    let listen_str = adapter
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:5000".to_string());
    let listen = listen_str
        .parse()
        .map_err(|_| TickercastError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: format!("invalid socket address {listen_str:?}"),
        })?;

    let symbol = adapter
        .get_string("source", "symbol")
        .unwrap_or_else(|| "SHOP".to_string())
        .trim()
        .to_uppercase();

    Ok(AppConfig {
        data_path: adapter
            .get_string("data", "path")
            .unwrap_or_else(|| "stock_data.csv".to_string())
            .into(),
        symbol,
        api_key: env_api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| adapter.get_string("source", "api_key")),
        base_url: adapter
            .get_string("source", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        output_size,
        timeout: Duration::from_secs(timeout_secs as u64),
        listen,
    })
}

/// Wire the CSV store and the quote client into a started service.
pub fn build_service(config: &AppConfig) -> Result<AnalysisService, TickercastError> {
    if config.api_key.is_none() {
        tracing::warn!("no API key configured, refresh will fail");
    }
    let quotes = AlphaVantageAdapter::new(
        config.base_url.clone(),
        config.api_key.clone().unwrap_or_default(),
        config.output_size.clone(),
        config.timeout,
    )?;
    let service = AnalysisService::new(
        Arc::new(CsvAdapter::new(config.data_path.clone())),
        Arc::new(quotes),
        config.symbol.clone(),
    );
    service.start()?;
    Ok(service)
}

fn start(config_path: &PathBuf) -> Result<(AppConfig, AnalysisService), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let service = build_service(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok((config, service))
}

fn run_refresh(config_path: &PathBuf) -> ExitCode {
    let (config, service) = match start(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Err(e) = config.require_api_key() {
        eprintln!("error: {e} (or set {API_KEY_ENV})");
        return (&e).into();
    }

    match service.refresh() {
        Ok(report) => {
            println!(
                "{}: fetched {} bars, {} prepared, model {}",
                config.symbol,
                report.fetched,
                report.prepared,
                if report.model_fitted { "fitted" } else { "not fitted" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_forecast(config_path: &PathBuf, days: usize) -> ExitCode {
    let (config, service) = match start(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let points = service.snapshot().forecast(days);
    if points.is_empty() {
        eprintln!("{}: no data to forecast from", config.symbol);
        return ExitCode::from(1);
    }
    for p in points {
        println!("{}  {:.4}", p.date, p.predicted_close);
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let (config, service) = match start(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    print!("{}", format_info(&config.symbol, &service.snapshot()));
    ExitCode::SUCCESS
}

/// Human-readable summary of a state, one fact per line.
pub fn format_info(symbol: &str, state: &AnalysisState) -> String {
    let Some(series) = state.series().filter(|s| !s.is_empty()) else {
        return format!("{symbol}: no data found\n");
    };

    let mut out = String::new();
    if let (Some(first), Some(last)) = (series.min_date(), series.last()) {
        out.push_str(&format!(
            "{}: {} bars, {} to {}\n",
            symbol,
            series.len(),
            first,
            last.bar.date
        ));
        out.push_str(&format!("last close: {:.4}\n", last.bar.close));
    }
    if let Some(model) = state.model() {
        out.push_str(&format!(
            "trend: slope {:.6}/day, intercept {:.4}, r^2 {:.4}\n",
            model.slope, model.intercept, model.r_squared
        ));
    }
    out
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};

        let (config, service) = match start(config_path) {
            Ok(s) => s,
            Err(code) => return code,
        };
        let service = Arc::new(service);
        let router = build_router(AppState {
            service: Arc::clone(&service),
        });

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(1);
            }
        };

        tracing::info!(
            "tickercast v{} serving {} on {}",
            env!("CARGO_PKG_VERSION"),
            config.symbol,
            config.listen
        );
        let result = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(config.listen).await?;
            axum::serve(listener, router).await
        });

        // the blocking HTTP client must be dropped outside the runtime
        drop(runtime);
        drop(service);

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
