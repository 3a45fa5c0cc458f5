use proptest::prelude::*;

use goal2goal::TeamMatchStats;
use goal2goal::rate::{LAMBDA_MAX, LAMBDA_MIN, estimate_rates, expected_goals};
use goal2goal::simulate;

fn team_stats() -> impl Strategy<Value = TeamMatchStats> {
    (0.0..6.0f64, 0.0..6.0f64, 0.0..100.0f64, 0.0..60.0f64)
        .prop_map(|(gs, gc, pos, sot)| TeamMatchStats::new(gs, gc, pos, sot))
}

proptest! {
    #[test]
    fn rates_stay_in_range(a in team_stats(), b in team_stats(), avg in 0.2..4.0f64) {
        let (ra, rb) = estimate_rates(&a, &b, avg).unwrap();
        prop_assert!((LAMBDA_MIN..=LAMBDA_MAX).contains(&ra.lambda));
        prop_assert!((LAMBDA_MIN..=LAMBDA_MAX).contains(&rb.lambda));
        prop_assert_eq!(ra.lambda, expected_goals(&a, &b, avg));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn reports_are_internally_consistent(
        lambda_a in 0.5..4.0f64,
        lambda_b in 0.5..4.0f64,
        n in 1u64..3_000,
        seed in any::<u64>(),
    ) {
        let r = simulate(lambda_a, lambda_b, n, seed).unwrap();

        let ci = r.btts.confidence_interval;
        prop_assert!(0.0 <= ci.lower && ci.lower <= r.btts.probability);
        prop_assert!(r.btts.probability <= ci.upper && ci.upper <= 100.0);

        let total: u64 = r.total_goals_distribution.iter().map(|b| b.count).sum();
        prop_assert_eq!(total, n);

        let split = r.results.team_a_win + r.results.draw + r.results.team_b_win;
        prop_assert!((split - 100.0).abs() < 0.02);

        prop_assert!(r.top_scorelines.len() <= 10);
        prop_assert!(r.volatility.coefficient >= 0.0);
    }
}
