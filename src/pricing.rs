// src/pricing.rs
//! Pricing facade
//!
//! Thin dispatcher over the two engines: validates spec ranges once,
//! routes to the lattice or the Monte Carlo engine, and wraps the
//! numeric output in a [`PriceReport`] tagged with the model and spec
//! that produced it. No retries, no fallback engine: every failure is
//! deterministic given the inputs and surfaces to the caller unchanged.

use crate::error::PricerResult;
use crate::lattice::{self, ExerciseStyle, LatticeSpec, OptionKind};
use crate::market::MarketModel;
use crate::mc::{self, SimulationSpec};

/// The spec an estimate was produced under.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSpec {
    Lattice(LatticeSpec),
    MonteCarlo(SimulationSpec),
}

/// A priced contract, tagged with everything needed to reproduce it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceReport {
    pub price: f64,
    /// Monte Carlo only: sample standard deviation / √P.
    pub standard_error: Option<f64>,
    /// Monte Carlo only: number of simulated paths.
    pub paths_used: Option<usize>,
    pub market: MarketModel,
    pub spec: EngineSpec,
}

/// Price an option on the CRR binomial lattice.
///
/// # Example
///
/// ```rust
/// use fast_pricer::lattice::{ExerciseStyle, OptionKind};
/// use fast_pricer::market::MarketModel;
/// use fast_pricer::pricing::price_lattice;
///
/// let market = MarketModel::new(100.0, 105.0, 0.05, 0.2, 1.0).unwrap();
/// let report =
///     price_lattice(&market, 100, OptionKind::Call, ExerciseStyle::European).unwrap();
/// assert!((report.price - 8.026).abs() < 5e-3);
/// ```
pub fn price_lattice(
    market: &MarketModel,
    steps: usize,
    kind: OptionKind,
    exercise: ExerciseStyle,
) -> PricerResult<PriceReport> {
    let spec = LatticeSpec {
        steps,
        kind,
        exercise,
    };
    spec.validate()?;
    let price = lattice::price(market, &spec)?;
    Ok(PriceReport {
        price,
        standard_error: None,
        paths_used: None,
        market: *market,
        spec: EngineSpec::Lattice(spec),
    })
}

/// Price an option by Monte Carlo simulation with a user-supplied payoff
/// expression.
///
/// The returned report carries the master seed inside its spec snapshot
/// (an entropy-drawn seed is recorded there), so any run can be replayed
/// exactly.
///
/// # Example
///
/// ```rust
/// use fast_pricer::market::MarketModel;
/// use fast_pricer::pricing::price_monte_carlo;
///
/// let market = MarketModel::new(100.0, 105.0, 0.05, 0.2, 1.0).unwrap();
/// let report =
///     price_monte_carlo(&market, 50, 20_000, "max(s - strike, 0)", Some(42)).unwrap();
/// assert!(report.standard_error.unwrap() > 0.0);
/// ```
pub fn price_monte_carlo(
    market: &MarketModel,
    steps: usize,
    paths: usize,
    payoff_expression: &str,
    seed: Option<u64>,
) -> PricerResult<PriceReport> {
    let spec = SimulationSpec {
        steps,
        paths,
        payoff_expression: payoff_expression.to_string(),
        seed,
    };
    spec.validate()?;
    let estimate = mc::engine::price(market, &spec)?;
    Ok(PriceReport {
        price: estimate.price,
        standard_error: Some(estimate.standard_error),
        paths_used: Some(estimate.paths_used),
        market: *market,
        spec: EngineSpec::MonteCarlo(SimulationSpec {
            seed: Some(estimate.master_seed),
            ..spec
        }),
    })
}
