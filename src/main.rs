use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use regime_optimizer::config::{self, AppConfig, DEFAULT_CONFIG_PATH};
use regime_optimizer::core::types::{Bar, RegimeKey, TradeOutcome};
use regime_optimizer::decision::fusion::DecisionContext;
use regime_optimizer::decision::types::PredictionFeatures;
use regime_optimizer::engines::RegimeOptimizer;
use regime_optimizer::regime::classifier::MarketSnapshot;
use regime_optimizer::utils::logging::init_tracing;

/// Rank market regimes from a trade ledger and size the next trade.
#[derive(Parser, Debug)]
#[command(name = "regime-optimizer", version, about)]
struct Cli {
    /// TOML configuration; defaults to config/base.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session JSON with bars, trades, snapshot/regime, context and features
    #[arg(short, long)]
    session: PathBuf,

    /// Override selector.min_trades
    #[arg(long)]
    min_trades: Option<usize>,

    /// Override selector.sort_by (avg_pnl | win_rate | count)
    #[arg(long)]
    sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Session {
    #[serde(default)]
    bars: Vec<Bar>,
    trades: Vec<TradeOutcome>,
    #[serde(default)]
    regime: Option<RegimeKey>,
    #[serde(default)]
    snapshot: Option<MarketSnapshot>,
    #[serde(default)]
    context: DecisionContext,
    #[serde(default)]
    features: PredictionFeatures,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => config::load_from(p).with_context(|| format!("loading config {}", p.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::load_base().context("loading config/base.toml")
        }
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(n) = cli.min_trades {
        cfg.selector.min_trades = n;
    }
    if let Some(key) = cli.sort_by {
        cfg.selector.sort_by = key;
    }
    init_tracing(&cfg.logging);

    let raw = tokio::fs::read_to_string(&cli.session)
        .await
        .with_context(|| format!("reading session {}", cli.session.display()))?;
    let session: Session = serde_json::from_str(&raw).context("parsing session JSON")?;
    info!(bars = session.bars.len(), trades = session.trades.len(), "session loaded");

    let optimizer = RegimeOptimizer::new(cfg)?;

    let illiquidity = optimizer.liquidity(&session.bars);
    let last_illiq = illiquidity.last().copied();

    let regime = match (session.regime, session.snapshot) {
        (Some(regime), _) => regime,
        (None, Some(mut snap)) => {
            if snap.illiquidity.is_none() {
                snap.illiquidity = last_illiq;
            }
            optimizer.classify(&snap)
        }
        (None, None) => return Err(anyhow!("session needs either a regime or a snapshot")),
    };
    info!(%regime, "current regime");

    let report = optimizer.analyze(&session.trades);
    if report.ranked.is_empty() {
        warn!(min_trades = report.min_trades, "no regime meets the minimum trade count");
    }

    let recommendation = optimizer
        .recommend(&report, &regime, &session.context, &session.features)
        .await?;

    let ranked: Vec<_> = report
        .ranked
        .iter()
        .map(|(k, s)| json!({ "regime": k.to_string(), "stats": s }))
        .collect();
    let out = json!({
        "illiquidity_last": last_illiq,
        "sort_by": report.sort_by.as_str(),
        "min_trades": report.min_trades,
        "ranked": ranked,
        "recommendation": recommendation,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
