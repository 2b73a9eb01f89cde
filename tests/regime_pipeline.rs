use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use regime_optimizer::config::{parse, AppConfig};
use regime_optimizer::core::liquidity::amihud_illiquidity;
use regime_optimizer::core::sizing::SizingSource;
use regime_optimizer::decision::fusion::{fuse_prediction, ML_PROB_UP};
use regime_optimizer::decision::model::PredictionModel;
use regime_optimizer::decision::types::{PredictionFeatures, PredictionResult};
use regime_optimizer::engines::RegimeOptimizer;
use regime_optimizer::regime::{compute_regime_stats, pick_best_regimes, SortKey};
use regime_optimizer::{Bar, RegimeKey, TradeOutcome};

fn regime_a() -> RegimeKey {
    RegimeKey::new("high", "up", "short_gamma", "thin")
}

fn regime_b() -> RegimeKey {
    RegimeKey::new("low", "down", "long_gamma", "deep")
}

fn ledger() -> Vec<TradeOutcome> {
    let mut trades = Vec::new();
    for _ in 0..7 {
        trades.push(TradeOutcome::new(regime_a(), 100.0, true).with_drawdown(0.02));
    }
    for _ in 0..3 {
        trades.push(TradeOutcome::new(regime_a(), -50.0, false).with_drawdown(0.04));
    }
    for _ in 0..2 {
        trades.push(TradeOutcome::new(regime_b(), 50.0, true));
    }
    for _ in 0..3 {
        trades.push(TradeOutcome::new(regime_b(), -30.0, false));
    }
    trades
}

struct SpyModel;

#[async_trait]
impl PredictionModel for SpyModel {
    async fn predict(&self, _features: &PredictionFeatures) -> anyhow::Result<PredictionResult> {
        Ok(PredictionResult::new(0.65, 0.35, 0.03, 0.15).with_meta("model", "spy-test"))
    }
}

#[test]
fn two_regime_statistics_and_ranking() {
    let trades = ledger();
    let stats = compute_regime_stats(&trades);

    assert_eq!(stats.len(), 2);
    assert!((stats[&regime_a()].win_rate - 0.7).abs() < 1e-12);
    assert!((stats[&regime_a()].avg_pnl - 55.0).abs() < 1e-9);
    assert!((stats[&regime_a()].avg_drawdown - 0.026).abs() < 1e-12);
    assert!((stats[&regime_b()].win_rate - 0.4).abs() < 1e-12);

    let ranked = pick_best_regimes(&stats, 5, SortKey::Count);
    let keys: Vec<_> = ranked.into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![regime_a(), regime_b()]);

    // B sits exactly one below the threshold
    let ranked = pick_best_regimes(&stats, 6, SortKey::Count);
    assert_eq!(ranked.len(), 1);
}

#[test]
fn fusion_leaves_caller_context_alone() {
    let mut ctx = Map::new();
    ctx.insert("asset".into(), json!("SPY"));
    ctx.insert("confidence".into(), json!(0.7));
    let original = ctx.clone();

    let pred = PredictionResult::new(0.65, 0.35, 0.03, 0.15);
    let fused = fuse_prediction(&ctx, &pred);

    assert_eq!(fused["confidence"], json!(0.7));
    assert_eq!(fused[ML_PROB_UP], json!(0.65));
    assert_eq!(ctx, original);
}

#[test]
fn liquidity_estimator_survives_dead_tape() {
    let bars: Vec<Bar> = (0..50).map(|i| Bar::new(i, 100.0 + (i % 3) as f64, 0.0)).collect();
    let out = amihud_illiquidity(&bars, 20);
    assert_eq!(out.len(), bars.len());
    assert!(out.iter().all(|v| *v > 0.0));
}

#[tokio::test]
async fn end_to_end_recommendation() {
    let cfg = parse(
        r#"
[selector]
min_trades = 5
sort_by = "win_rate"

[sizing]
max_fraction = 0.3
"#,
    )
    .unwrap();
    let optimizer = RegimeOptimizer::new(cfg).unwrap().with_model(Arc::new(SpyModel));
    let report = optimizer.analyze(&ledger());
    assert_eq!(report.ranked[0].0, regime_a());

    let mut ctx = Map::new();
    ctx.insert("asset".into(), json!("SPY"));
    let rec = optimizer
        .recommend(&report, &regime_b(), &ctx, &PredictionFeatures::new().with("momentum", 1.0))
        .await
        .unwrap();

    // B: 0.4 - 0.6 / (50 / 30) = 0.04
    assert_eq!(rec.sizing.source, SizingSource::Regime);
    assert!((rec.sizing.fraction - 0.04).abs() < 1e-12);
    assert_eq!(rec.regime_rank, Some(1));
    assert_eq!(rec.context["ml_meta"], json!({ "model": "spy-test" }));
    assert_eq!(ctx.len(), 1);
}

#[test]
fn default_config_builds_an_optimizer() {
    let optimizer = RegimeOptimizer::new(AppConfig::default()).unwrap();
    assert!((optimizer.max_fraction() - 0.25).abs() < 1e-12);
}

#[test]
fn bundled_base_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/base.toml");
    let cfg = regime_optimizer::config::load_from(path).unwrap();
    assert_eq!(cfg.selector.sort_key().unwrap(), SortKey::AvgPnl);
}
