mod common;

use chrono::Duration;
use common::*;
use proptest::prelude::*;
use swingscan::domain::reversal::{find_reversals, local_minima};
use swingscan::domain::series::PriceSeries;
use swingscan::domain::swing::{SwingStatus, run_backtest};

/// Random-walk bars: each step is `(move_pct, range_pct)`.
fn walk(steps: &[(f64, f64)]) -> Vec<OhlcvBar> {
    let start = date("2024-01-01");
    let mut price = 100.0_f64;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(move_pct, range_pct))| {
            let open = price;
            price = (price * (1.0 + move_pct / 100.0)).max(1.0);
            let close = price;
            let spread = close.max(open) * range_pct / 100.0;
            OhlcvBar {
                date: start + Duration::days(i as i64),
                open,
                high: close.max(open) + spread,
                low: (close.min(open) - spread).max(0.01),
                close,
                volume: 1000 + i as i64,
            }
        })
        .collect()
}

fn steps() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-6.0f64..6.0, 0.0f64..4.0), 2..60)
}

proptest! {
    #[test]
    fn clusters_are_bounded_and_conserve_points(
        lows in prop::collection::vec(1.0f64..500.0, 2..80),
        tolerance in 0.0f64..10.0,
    ) {
        let bars = bars_from_lows("2024-01-01", &lows);
        let clusters = find_reversals(&bars, tolerance, usize::MAX).unwrap();

        prop_assert!(clusters.len() <= bars.len());
        prop_assert!(clusters.iter().all(|c| c.count >= 1));

        let minima: usize = local_minima(&bars).iter().map(|c| c.count).sum();
        let clustered: usize = clusters.iter().map(|c| c.count).sum();
        prop_assert_eq!(minima, clustered);

        prop_assert!(clusters.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn truncation_keeps_the_top_clusters(
        lows in prop::collection::vec(1.0f64..500.0, 3..80),
        max in 0usize..5,
    ) {
        let bars = bars_from_lows("2024-01-01", &lows);
        let all = find_reversals(&bars, 3.0, usize::MAX).unwrap();
        let top = find_reversals(&bars, 3.0, max).unwrap();
        prop_assert_eq!(top.len(), all.len().min(max));
        prop_assert_eq!(&all[..top.len()], &top[..]);
    }

    #[test]
    fn backtest_is_pure(
        steps in steps(),
        stop_loss in 0.5f64..20.0,
        target in 0.5f64..20.0,
    ) {
        let series = PriceSeries::new("P.NS", walk(&steps)).unwrap();
        let first = run_backtest(&series, stop_loss, target).unwrap();
        let second = run_backtest(&series, stop_loss, target).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn stop_and_target_on_one_bar_is_a_hit(
        entry in 10.0f64..1000.0,
        stop_loss in 0.5f64..20.0,
        target in 0.5f64..20.0,
    ) {
        let stop = entry * (1.0 - stop_loss / 100.0);
        let tgt = entry * (1.0 + target / 100.0);
        let bars = vec![
            make_bar("2024-01-01", entry, entry, entry, entry, 100),
            make_bar("2024-01-02", entry, tgt + 1.0, stop - 0.5, entry, 100),
        ];
        let series = PriceSeries::new("P.NS", bars).unwrap();
        let outcome = run_backtest(&series, stop_loss, target).unwrap();

        prop_assert_eq!(outcome.status, SwingStatus::Hit);
        prop_assert_eq!(outcome.ratchets, 0);
        prop_assert_eq!(outcome.exit_date, Some(date("2024-01-02")));
    }

    #[test]
    fn ratchets_only_tighten(
        steps in steps(),
        stop_loss in 0.5f64..20.0,
        target in 0.5f64..20.0,
    ) {
        let series = PriceSeries::new("P.NS", walk(&steps)).unwrap();
        let outcome = run_backtest(&series, stop_loss, target).unwrap();

        let entry = outcome.entry_price;
        let initial_stop = entry * (1.0 - stop_loss / 100.0);
        let growth = 1.0 + target / 100.0;
        let expected_target = entry * growth.powi(outcome.ratchets as i32 + 1);

        prop_assert!((outcome.target - expected_target).abs() <= 1e-9 * expected_target);
        prop_assert!(outcome.stop_loss < outcome.target);
        match outcome.ratchets {
            0 => prop_assert!((outcome.stop_loss - initial_stop).abs() <= 1e-9 * entry),
            1 => prop_assert!((outcome.stop_loss - entry).abs() <= 1e-9 * entry),
            n => {
                // Stop sits on the target touched by the last ratchet.
                let touched = entry * growth.powi(n as i32);
                prop_assert!((outcome.stop_loss - touched).abs() <= 1e-9 * touched);
            }
        }

        match outcome.status {
            SwingStatus::Hit => {
                prop_assert_eq!(outcome.exit_price, Some(outcome.stop_loss));
                prop_assert!((outcome.profit - (outcome.stop_loss - entry)).abs() <= 1e-9 * entry);
            }
            SwingStatus::Open => {
                prop_assert!(outcome.exit_date.is_none());
                prop_assert!((outcome.profit - (outcome.latest_close - entry)).abs() <= 1e-9 * entry);
            }
        }
    }
}
