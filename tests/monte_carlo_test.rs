// tests/monte_carlo_test.rs
use fast_pricer::analytics::bs_analytic;
use fast_pricer::market::MarketModel;
use fast_pricer::mc::engine::simulate_path;
use fast_pricer::pricing::{price_monte_carlo, EngineSpec};
use fast_pricer::PricingError;

fn standard_market() -> MarketModel {
    MarketModel::new(100.0, 105.0, 0.05, 0.2, 1.0).unwrap()
}

#[test]
fn test_mc_call_price_agrees_with_black_scholes() {
    let market = standard_market();
    let report =
        price_monte_carlo(&market, 50, 200_000, "max(s - strike, 0)", Some(42)).unwrap();
    let analytic = bs_analytic::bs_call_price(100.0, 105.0, 0.05, 0.0, 0.2, 1.0);
    let standard_error = report.standard_error.unwrap();

    println!(
        "MC={:.4} ± {:.4}, analytic={:.4}",
        report.price, standard_error, analytic
    );
    // Four standard errors is a ~1-in-16000 false-failure bound.
    assert!(
        (report.price - analytic).abs() < 4.0 * standard_error,
        "MC price {} outside 4σ of analytic {} (σ = {})",
        report.price,
        analytic,
        standard_error
    );
}

#[test]
fn test_mc_put_price_agrees_with_black_scholes() {
    let market = standard_market();
    let report =
        price_monte_carlo(&market, 50, 200_000, "max(strike - s, 0)", Some(43)).unwrap();
    let analytic = bs_analytic::bs_put_price(100.0, 105.0, 0.05, 0.0, 0.2, 1.0);
    assert!(
        (report.price - analytic).abs() < 4.0 * report.standard_error.unwrap(),
        "MC put {} vs analytic {}",
        report.price,
        analytic
    );
}

#[test]
fn test_fixed_seed_reproduces_price_and_paths() {
    let market = standard_market();
    let first = price_monte_carlo(&market, 25, 10_000, "max(s - strike, 0)", Some(7)).unwrap();
    let second = price_monte_carlo(&market, 25, 10_000, "max(s - strike, 0)", Some(7)).unwrap();

    assert_eq!(first.price.to_bits(), second.price.to_bits());
    assert_eq!(
        first.standard_error.unwrap().to_bits(),
        second.standard_error.unwrap().to_bits()
    );

    // The underlying per-path price sequences are bit-identical too.
    for path_index in [0u64, 1, 9_999] {
        let a = simulate_path(&market, 25, 7, path_index);
        let b = simulate_path(&market, 25, 7, path_index);
        assert_eq!(a.len(), 26);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}

#[test]
fn test_thread_count_only_perturbs_summation_order() {
    let market = standard_market();
    let expr = "max(s - strike, 0)";
    let single_threaded = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| price_monte_carlo(&market, 25, 50_000, expr, Some(7)))
        .unwrap();
    let pooled = price_monte_carlo(&market, 25, 50_000, expr, Some(7)).unwrap();

    // The per-path price sequences are independent of the pool, so the
    // two estimates may differ only by reduction order: a few ulps, not
    // a statistical gap.
    assert!(
        (single_threaded.price - pooled.price).abs() < 1e-9,
        "pool size changed the estimate: {} vs {}",
        single_threaded.price,
        pooled.price
    );
}

#[test]
fn test_different_seeds_differ() {
    let market = standard_market();
    let a = price_monte_carlo(&market, 25, 5_000, "max(s - strike, 0)", Some(1)).unwrap();
    let b = price_monte_carlo(&market, 25, 5_000, "max(s - strike, 0)", Some(2)).unwrap();
    assert_ne!(a.price, b.price);
}

#[test]
fn test_standard_error_shrinks_as_inverse_sqrt_paths() {
    let market = standard_market();
    let small = price_monte_carlo(&market, 10, 10_000, "max(s - strike, 0)", Some(11)).unwrap();
    let large = price_monte_carlo(&market, 10, 100_000, "max(s - strike, 0)", Some(11)).unwrap();

    let ratio = small.standard_error.unwrap() / large.standard_error.unwrap();
    let expected = (10.0f64).sqrt();
    println!("SE ratio for 10x paths: {:.3} (expected ~{:.3})", ratio, expected);
    assert!(
        (ratio - expected).abs() < 0.5,
        "SE ratio {} should be near {}",
        ratio,
        expected
    );
}

#[test]
fn test_zero_volatility_degenerate_case() {
    // S=strike=100, r=0, sigma=0: every path is flat at 100, the payoff
    // max(s - strike, 0) is exactly 0 on every path.
    let market = MarketModel::new(100.0, 100.0, 0.0, 0.0, 1.0).unwrap();
    for paths in [1, 100, 10_000] {
        let report =
            price_monte_carlo(&market, 10, paths, "max(s - strike, 0)", Some(5)).unwrap();
        assert_eq!(report.price, 0.0);
        assert_eq!(report.standard_error.unwrap(), 0.0);
    }
}

#[test]
fn test_zero_volatility_forward_drift() {
    // With sigma=0 and r=3%, the terminal price is deterministic at
    // 100*e^0.03; a payoff of plain `s` prices to the discounted forward.
    let market = MarketModel::new(100.0, 100.0, 0.03, 0.0, 1.0).unwrap();
    let report = price_monte_carlo(&market, 10, 100, "s", Some(5)).unwrap();
    assert!(
        (report.price - 100.0).abs() < 1e-9,
        "discounted forward should equal spot, got {}",
        report.price
    );
}

#[test]
fn test_terminal_alias_matches_path_end() {
    // path[-1] and s bind to the same value, so their difference prices
    // to exactly zero with zero standard error.
    let market = standard_market();
    let report = price_monte_carlo(&market, 25, 2_000, "path[-1] - s", Some(3)).unwrap();
    assert_eq!(report.price, 0.0);
    assert_eq!(report.standard_error.unwrap(), 0.0);
}

#[test]
fn test_path_dependent_expressions() {
    let market = standard_market();
    // Lookback-style payoff on the running maximum dominates the
    // terminal-price call on every path.
    let lookback =
        price_monte_carlo(&market, 50, 20_000, "max(max(path) - strike, 0)", Some(21)).unwrap();
    let vanilla =
        price_monte_carlo(&market, 50, 20_000, "max(s - strike, 0)", Some(21)).unwrap();
    assert!(
        lookback.price >= vanilla.price,
        "lookback {} < vanilla {}",
        lookback.price,
        vanilla.price
    );
}

#[test]
fn test_parse_errors_surface_before_simulation() {
    let market = standard_market();
    for bad in [
        "max(s - strik, 0)",     // unknown variable
        "import(1)",             // unknown function
        "s = 5",                 // assignment
        "__builtins__",          // unknown name
        "path.append(0)",        // attribute access
        "strike[0]",             // subscript on non-path
        "",                      // empty
    ] {
        let result = price_monte_carlo(&market, 10, 100_000_000, bad, Some(1));
        // A huge path count proves no simulation ran: the parse error
        // must surface immediately.
        assert!(
            matches!(result, Err(PricingError::ParseError { .. })),
            "expression {:?} should be a ParseError, got {:?}",
            bad,
            result
        );
    }
}

#[test]
fn test_evaluation_error_aborts_whole_run() {
    let market = standard_market();
    let result = price_monte_carlo(&market, 10, 1_000, "ln(strike - strike)", Some(1));
    match result {
        Err(PricingError::EvaluationError { reason, path }) => {
            assert!(reason.contains("ln"), "reason: {}", reason);
            assert!(path.is_some());
        }
        other => panic!("expected EvaluationError, got {:?}", other),
    }
}

#[test]
fn test_invalid_counts_fail_with_invalid_parameter() {
    let market = standard_market();
    assert!(matches!(
        price_monte_carlo(&market, 0, 100, "max(s - strike, 0)", Some(1)),
        Err(PricingError::InvalidParameter { .. })
    ));
    assert!(matches!(
        price_monte_carlo(&market, 10, 0, "max(s - strike, 0)", Some(1)),
        Err(PricingError::InvalidParameter { .. })
    ));
}

#[test]
fn test_report_spec_replays_exactly() {
    let market = standard_market();
    let original = price_monte_carlo(&market, 25, 5_000, "max(s - strike, 0)", None).unwrap();
    let seed = match &original.spec {
        EngineSpec::MonteCarlo(spec) => spec.seed.expect("entropy seed recorded"),
        other => panic!("expected MonteCarlo spec, got {:?}", other),
    };
    let replay = price_monte_carlo(&market, 25, 5_000, "max(s - strike, 0)", Some(seed)).unwrap();
    assert_eq!(original.price.to_bits(), replay.price.to_bits());
}
