// src/mc/engine.rs
//! Monte Carlo pricing under risk-neutral geometric Brownian motion
//!
//! # Math Framework
//!
//! Simulates the risk-neutral GBM SDE with continuous dividend yield q:
//! ```text
//! dS_t = (r − q) S_t dt + σ S_t dW_t
//! ```
//!
//! using the exact log-space step over Δt = T/M:
//! ```text
//! S_{t+Δt} = S_t * exp((r − q − σ²/2)Δt + σ√Δt * Z),  Z ~ N(0,1)
//! ```
//!
//! Each path's undiscounted payoff comes from the compiled user
//! expression; discounting by e^(−rT) happens once per path at maturity,
//! since the expression operates on already-simulated prices. The
//! estimate is the mean of discounted payoffs and the standard error is
//! the sample standard deviation over √P.
//!
//! # Parallelism & Reproducibility
//!
//! Paths are independent and run under rayon. Every path seeds its own
//! generator from [`derive_path_seed`](crate::rng::derive_path_seed), so
//! a fixed (seed, steps, paths) triple reproduces bit-identical per-path
//! price sequences regardless of thread count. Aggregation goes through
//! rayon's tree-shaped `try_reduce`, which both keeps the summation
//! pairwise for large path counts and aborts the whole run on the first
//! per-path evaluation failure: a failed path never contributes a
//! substitute value to the aggregate. The reduction tree's shape follows
//! the thread pool, so the aggregate price is deterministic within one
//! pool configuration but can differ in the last floating-point bits
//! across pool sizes; only the summation order varies, never the
//! per-path values.

use crate::error::{validation::*, PricerResult, PricingError};
use crate::market::MarketModel;
use crate::payoff::{PayoffBindings, PayoffExpr};
use crate::rng;
use rayon::prelude::*;

/// Monte Carlo simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSpec {
    /// Time steps per path, M ≥ 1.
    pub steps: usize,
    /// Number of simulated paths, P ≥ 1.
    pub paths: usize,
    /// Payoff expression over `path`, `s`/`st`, `spot`, `strike`, `step`.
    pub payoff_expression: String,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl SimulationSpec {
    pub fn validate(&self) -> PricerResult<()> {
        validate_steps(self.steps)?;
        validate_paths(self.paths)?;
        Ok(())
    }
}

/// Raw engine output, before the facade tags it with model and spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McEstimate {
    pub price: f64,
    pub standard_error: f64,
    pub paths_used: usize,
    /// The master seed actually used (explicit, or drawn from entropy).
    pub master_seed: u64,
}

/// Simulate one GBM path of `steps + 1` prices starting at the spot.
///
/// Exposed so callers and tests can reproduce the exact per-path price
/// sequences of a pricing run from (master seed, path index).
pub fn simulate_path(
    model: &MarketModel,
    steps: usize,
    master_seed: u64,
    path_index: u64,
) -> Vec<f64> {
    let dt = model.maturity() / steps as f64;
    let vol = model.volatility();
    let drift = (model.rate() - model.dividend_yield() - 0.5 * vol * vol) * dt;
    let diffusion = vol * dt.sqrt();

    let mut path_rng = rng::seed_rng_from_u64(rng::derive_path_seed(master_seed, path_index));
    let mut prices = Vec::with_capacity(steps + 1);
    let mut current = model.spot();
    prices.push(current);
    for _ in 0..steps {
        let z = rng::get_normal_draw(&mut path_rng);
        current *= (drift + diffusion * z).exp();
        prices.push(current);
    }
    prices
}

/// Price an option by Monte Carlo simulation.
///
/// # Errors
///
/// - `InvalidParameter` for steps or paths below 1 (before any work)
/// - `ParseError` from compiling the payoff (before any simulation)
/// - `EvaluationError` from any path, carrying the path index; the run
///   aborts and no partial estimate is returned
/// - `NumericalInstability` if the aggregate is non-finite or the sample
///   variance is significantly negative
pub fn price(model: &MarketModel, spec: &SimulationSpec) -> PricerResult<McEstimate> {
    spec.validate()?;

    // Compile once; the tree is shared read-only across workers.
    let compiled = PayoffExpr::compile(&spec.payoff_expression)?;

    let n = spec.paths;
    let discount = model.discount_factor();
    let strike = model.strike();
    let master_seed = spec.seed.unwrap_or_else(rng::entropy_seed);

    let (sum, sum_sq) = (0..n)
        .into_par_iter()
        .map(|i| -> PricerResult<(f64, f64)> {
            let path_prices = simulate_path(model, spec.steps, master_seed, i as u64);
            let payoff = compiled
                .evaluate(&PayoffBindings::new(&path_prices, strike))
                .map_err(|e| attach_path_index(e, i))?;
            let discounted = discount * payoff;
            Ok((discounted, discounted * discounted))
        })
        .try_reduce(|| (0.0, 0.0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))?;

    let mean = sum / n as f64;
    let standard_error = if n > 1 {
        let mut sample_var = (sum_sq - sum * sum / n as f64) / (n as f64 - 1.0);
        if sample_var < 0.0 {
            if sample_var > -1e-10 {
                // Floating point cancellation on near-constant payoffs.
                sample_var = 0.0;
            } else {
                return Err(PricingError::NumericalInstability {
                    method: "Monte Carlo".to_string(),
                    reason: format!(
                        "sample variance became significantly negative: {}",
                        sample_var
                    ),
                });
            }
        }
        (sample_var / n as f64).sqrt()
    } else {
        0.0
    };

    if !mean.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "Monte Carlo".to_string(),
            reason: format!("price estimate is not finite: {}", mean),
        });
    }
    if !standard_error.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "Monte Carlo".to_string(),
            reason: format!("standard error is not finite: {}", standard_error),
        });
    }

    Ok(McEstimate {
        price: mean,
        standard_error,
        paths_used: n,
        master_seed,
    })
}

fn attach_path_index(error: PricingError, path_index: usize) -> PricingError {
    match error {
        PricingError::EvaluationError { reason, path: None } => PricingError::EvaluationError {
            reason,
            path: Some(path_index),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(expr: &str, paths: usize, seed: u64) -> SimulationSpec {
        SimulationSpec {
            steps: 10,
            paths,
            payoff_expression: expr.to_string(),
            seed: Some(seed),
        }
    }

    #[test]
    fn test_fixed_seed_reproduces_paths() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        let a = simulate_path(&model, 50, 42, 7);
        let b = simulate_path(&model, 50, 42, 7);
        assert_eq!(a.len(), 51);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_ne!(simulate_path(&model, 50, 42, 8), a);
    }

    #[test]
    fn test_parse_error_surfaces_before_simulation() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        let result = price(&model, &spec("max(s - strik, 0)", 100, 1));
        assert!(matches!(result, Err(PricingError::ParseError { .. })));
    }

    #[test]
    fn test_evaluation_error_aborts_run_with_path_index() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        // Fails on every path; the reported index must come from some path.
        let result = price(&model, &spec("s / (strike - 100)", 64, 9));
        match result {
            Err(PricingError::EvaluationError { reason, path }) => {
                assert!(reason.contains("division by zero"));
                assert!(path.is_some());
            }
            other => panic!("expected EvaluationError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_counts_rejected() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        let mut bad = spec("max(s - strike, 0)", 0, 1);
        assert!(matches!(
            price(&model, &bad),
            Err(PricingError::InvalidParameter { .. })
        ));
        bad.paths = 100;
        bad.steps = 0;
        assert!(matches!(
            price(&model, &bad),
            Err(PricingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_single_path_has_zero_standard_error() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        let estimate = price(&model, &spec("max(s - strike, 0)", 1, 3)).unwrap();
        assert_eq!(estimate.standard_error, 0.0);
        assert_eq!(estimate.paths_used, 1);
    }

    #[test]
    fn test_entropy_seed_is_recorded() {
        let model = MarketModel::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
        let unseeded = SimulationSpec {
            steps: 5,
            paths: 10,
            payoff_expression: "max(s - strike, 0)".to_string(),
            seed: None,
        };
        let estimate = price(&model, &unseeded).unwrap();
        // Re-running with the recorded seed reproduces the estimate.
        let reseeded = SimulationSpec {
            seed: Some(estimate.master_seed),
            ..unseeded
        };
        let repeat = price(&model, &reseeded).unwrap();
        assert_eq!(estimate.price.to_bits(), repeat.price.to_bits());
    }
}
