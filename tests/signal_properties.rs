//! Behavior tests for the breakout rule on realistic price paths.

use twscan_core::{SignalConfig, SignalEngine, Trigger};
use twscan_tests::*;

fn engine() -> SignalEngine {
    SignalEngine::new(SignalConfig::default())
}

// A dip-and-recover path: yesterday closed just under its 5-average,
// today closed above every average. Only the 5-average cross fires;
// yesterday already sat above its 10-average.
fn dip_and_recover_closes() -> Vec<f64> {
    vec![
        110.0, 110.0, 110.0, 110.0, 110.0, 105.0, 105.0, 105.0, 105.0, 70.0, 103.0, 104.0,
        104.0, 104.0, 100.0, 101.0, 100.0, 100.0, 99.0, 105.0,
    ]
}

#[test]
fn dip_and_recover_reports_the_five_average_cross() {
    let series = series_from("2330", session(), &dip_and_recover_closes(), 1_500_000);

    let m = engine()
        .evaluate(&series, "台積電")
        .expect("breakout must match");

    assert_eq!(m.triggers, vec![Trigger::CrossedMa5]);
    assert_eq!(m.close, 105.0);
    assert_eq!(m.ma5, 101.0);
    assert_eq!(m.ma10, 102.0);
    assert_eq!(m.ma20, 103.0);
    assert_eq!(m.bias_pct, 1.94);
    assert_eq!(m.volume_lots, 1_500);
    assert_eq!(m.day, session());
    assert_eq!(m.name, "台積電");
}

#[test]
fn thin_volume_suppresses_an_otherwise_valid_breakout() {
    // Same price path, but only 500k shares traded today.
    let series = series_from("2330", session(), &dip_and_recover_closes(), 500_000);

    assert!(engine().evaluate(&series, "台積電").is_none());
}

#[test]
fn volume_exactly_at_the_floor_is_not_enough() {
    let series = series_from("2330", session(), &dip_and_recover_closes(), 1_000_000);

    assert!(engine().evaluate(&series, "台積電").is_none());
}

#[test]
fn a_lower_volume_floor_admits_the_same_breakout() {
    let series = series_from("2330", session(), &dip_and_recover_closes(), 500_000);
    let engine = SignalEngine::new(SignalConfig {
        volume_floor: 400_000,
        ..SignalConfig::default()
    });

    assert!(engine.evaluate(&series, "台積電").is_some());
}

#[test]
fn a_simultaneous_double_cross_lists_both_triggers_in_order() {
    // Flat history with a single-day dip puts yesterday under both the
    // 5- and 10-averages at once.
    let mut closes = vec![100.0; 18];
    closes.push(99.0);
    closes.push(105.0);
    let series = series_from("2330", session(), &closes, 1_500_000);

    let m = engine().evaluate(&series, "台積電").expect("must match");
    assert_eq!(m.triggers, vec![Trigger::CrossedMa5, Trigger::CrossedMa10]);
}

#[test]
fn nineteen_bars_is_never_enough_history() {
    let series = series_from("2330", session(), &[100.0; 19], 99_000_000);

    assert!(engine().evaluate(&series, "台積電").is_none());
}

#[test]
fn a_downtrend_never_matches_regardless_of_volume() {
    let closes: Vec<f64> = (0..20).map(|i| 120.0 - i as f64).collect();
    let series = series_from("2330", session(), &closes, 99_000_000);

    assert!(engine().evaluate(&series, "台積電").is_none());
}
