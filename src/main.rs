use analog_forecast::config::FileConfig;
use analog_forecast::data::{self, CandleStore, CsvCandleStore};
use analog_forecast::domain::{ensure_chronological, ensure_positive_closes, Candle};
use analog_forecast::engine::AnalogEngine;
use analog_forecast::evaluation::DiagnosticAuditor;
use analog_forecast::Focus;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "analog-forecast", about = "Historical analog retrieval and path forecasting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Source {
    /// Read closes from this CSV file (date,close) instead of the symbol cache
    #[arg(long)]
    csv: Option<String>,
    #[arg(short, long, default_value = "BTCUSDT")]
    symbol: String,
    #[arg(long, default_value = "data")]
    data_dir: String,
    /// Refresh the symbol cache from Binance when missing or stale
    #[arg(long)]
    fetch: bool,
    /// History to request when fetching
    #[arg(long, default_value = "3000")]
    days: i64,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build the analog ensemble forecast for the latest window
    Forecast {
        #[command(flatten)]
        source: Source,
        /// JSON file with "forecast"/"audit" parameter sections
        #[arg(long)]
        config: Option<PathBuf>,
        /// Horizon: 7d, 30d, 90d, 180d or 365d
        #[arg(short, long)]
        focus: Option<String>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(short, long)]
        rank: Option<usize>,
        #[arg(short, long)]
        window_len: Option<usize>,
    },
    /// Run the retrieval health audit over the full candidate pool
    Audit {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        focus: Option<String>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(short, long)]
        window_size: Option<usize>,
    },
    /// Fetch and cache daily candles
    Fetch {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        #[arg(long, default_value = "data")]
        data_dir: String,
        #[arg(short, long, default_value = "3000")]
        days: i64,
    },
    /// Write a seeded random-walk series to CSV
    Simulate {
        #[arg(short, long)]
        out: String,
        #[arg(short, long, default_value = "5000")]
        days: usize,
        #[arg(long, default_value = "42")]
        seed: u64,
        #[arg(long, default_value = "1990-01-01")]
        start: NaiveDate,
        #[arg(long, default_value = "100")]
        price: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Forecast {
            source,
            config,
            focus,
            top_k,
            rank,
            window_len,
        } => {
            let mut cfg = load_file_config(config.as_ref())?.forecast;
            if let Some(f) = focus {
                cfg.focus = f.parse::<Focus>()?;
            }
            if let Some(k) = top_k {
                cfg.top_k = k;
            }
            if let Some(r) = rank {
                cfg.rank = r;
            }
            if let Some(w) = window_len {
                cfg.window_len = w;
            }
            let engine = AnalogEngine::new(cfg)?;
            let candles = load_candles(&source).await?;
            let pack = engine.build_synthetic_forecast(&candles)?;
            let cfg = engine.config();
            tracing::info!(
                focus = %cfg.focus,
                window_len = cfg.window_len,
                top_k = cfg.top_k,
                min_gap = pack.meta.min_gap,
                candidates = pack.meta.scan_candidates,
                band_repairs = pack.meta.band_repairs,
                "built analog forecast"
            );
            println!("{}", serde_json::to_string_pretty(&pack)?);
        }
        Commands::Audit {
            source,
            config,
            focus,
            top_k,
            window_size,
        } => {
            let mut cfg = load_file_config(config.as_ref())?.audit;
            if let Some(f) = focus {
                cfg.focus = f.parse::<Focus>()?;
            }
            if let Some(k) = top_k {
                cfg.top_k = k;
            }
            if let Some(w) = window_size {
                cfg.window_size = w;
            }
            let auditor = DiagnosticAuditor::new(cfg)?;
            let candles = load_candles(&source).await?;
            let report = auditor.run_diagnostic_audit(&candles)?;
            let cfg = auditor.config();
            tracing::info!(
                focus = %cfg.focus,
                window_size = cfg.window_size,
                top_k = cfg.top_k,
                candidates = report.scan_candidates,
                "ran diagnostic audit"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Fetch {
            symbol,
            data_dir,
            days,
        } => {
            let candles = data::fetch_last_n_days(&symbol, days).await?;
            std::fs::create_dir_all(&data_dir)?;
            let path = data::cache_path(&symbol, &data_dir);
            data::save_to_csv(&candles, &path)?;
            println!("Fetched and cached {} candles for {} at {}", candles.len(), symbol, path);
        }
        Commands::Simulate {
            out,
            days,
            seed,
            start,
            price,
        } => {
            let candles = data::random_walk(days, start, price, seed)?;
            data::save_to_csv(&candles, &out)?;
            println!("Wrote {} synthetic candles to {}", candles.len(), out);
        }
    }

    Ok(())
}

fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(FileConfig::load(p)?),
        None => Ok(FileConfig::default()),
    }
}

async fn load_candles(source: &Source) -> Result<Vec<Candle>, Box<dyn std::error::Error>> {
    let candles = if let Some(path) = &source.csv {
        data::load_from_csv(path)?
    } else if source.fetch {
        data::load_or_fetch(&source.symbol, source.days, &source.data_dir).await?
    } else {
        CsvCandleStore::new(source.data_dir.clone()).load(&source.symbol)?
    };
    ensure_chronological(&candles)?;
    ensure_positive_closes(&candles)?;
    tracing::info!(candles = candles.len(), "loaded candle series");
    Ok(candles)
}
