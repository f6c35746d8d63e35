// src/lattice.rs
//! Cox-Ross-Rubinstein binomial lattice pricing
//!
//! # Mathematical Framework
//!
//! The CRR tree discretizes geometric Brownian motion into `N` steps of
//! size Δt = T/N with multiplicative moves:
//! ```text
//! u = exp(σ√Δt),  d = 1/u
//! p = (exp((r − q)Δt) − d) / (u − d)
//! ```
//! Node (i, j), meaning step i with j up-moves, carries the asset price
//! S₀·u^j·d^(i−j). Layer i has i + 1 nodes and the tree recombines, so
//! backward induction needs only one flat value array overwritten in
//! place; no node graph is ever materialized.
//!
//! The option value at a node is the discounted risk-neutral expectation
//! of its two children; american-style nodes additionally floor the
//! continuation value at the intrinsic payoff.
//!
//! # Convergence
//!
//! For european exercise the lattice price converges to the closed-form
//! Black-Scholes price as N → ∞ (weak order 1 in Δt).

use crate::error::{validation::*, PricerResult, PricingError};
use crate::market::MarketModel;

/// Option payoff type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Map the wire strings `"call"` / `"put"` used by callers.
    pub fn parse(s: &str) -> PricerResult<Self> {
        match s {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            other => Err(PricingError::UnsupportedOptionKind(other.to_string())),
        }
    }

    /// Intrinsic (immediate exercise) value at an asset price.
    pub fn intrinsic(&self, asset_price: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (asset_price - strike).max(0.0),
            OptionKind::Put => (strike - asset_price).max(0.0),
        }
    }
}

/// Exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseStyle {
    European,
    American,
}

impl ExerciseStyle {
    /// Map the wire strings `"european"` / `"american"` used by callers.
    pub fn parse(s: &str) -> PricerResult<Self> {
        match s {
            "european" => Ok(ExerciseStyle::European),
            "american" => Ok(ExerciseStyle::American),
            other => Err(PricingError::UnsupportedExercise(other.to_string())),
        }
    }
}

/// Lattice discretization and contract terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeSpec {
    pub steps: usize,
    pub kind: OptionKind,
    pub exercise: ExerciseStyle,
}

impl LatticeSpec {
    pub fn validate(&self) -> PricerResult<()> {
        validate_steps(self.steps)
    }
}

/// Price an option on the CRR lattice.
///
/// # Algorithm
///
/// 1. Derive Δt, u, d and the risk-neutral probability p; fail with
///    `DegenerateLattice` unless 0 < p < 1 strictly.
/// 2. Fill the terminal layer with intrinsic payoffs at
///    S₀·u^j·d^(N−j), j = 0..=N.
/// 3. Walk layers N−1 down to 0, overwriting `values[j]` with
///    e^(−rΔt)·(p·values[j+1] + (1−p)·values[j]); american nodes take
///    the max of continuation and intrinsic.
/// 4. Return `values[0]`.
///
/// The dividend yield enters only through p's growth term; every layer
/// discounts at the risk-free rate r.
pub fn price(model: &MarketModel, spec: &LatticeSpec) -> PricerResult<f64> {
    spec.validate()?;

    let n = spec.steps;
    let dt = model.maturity() / n as f64;
    let up = (model.volatility() * dt.sqrt()).exp();
    let down = 1.0 / up;

    let growth = ((model.rate() - model.dividend_yield()) * dt).exp();
    let prob_up = (growth - down) / (up - down);
    if !(prob_up > 0.0 && prob_up < 1.0) {
        // Covers σ = 0 (u == d makes the quotient NaN) as well as
        // arbitrage-inconsistent (r, σ, Δt) combinations.
        return Err(PricingError::DegenerateLattice { prob_up });
    }

    let discount = (-model.rate() * dt).exp();
    let spot = model.spot();
    let strike = model.strike();

    // Terminal layer: intrinsic payoff at each of the N+1 leaves.
    let mut values: Vec<f64> = (0..=n)
        .map(|j| {
            let asset_price = spot * up.powi(j as i32) * down.powi((n - j) as i32);
            spec.kind.intrinsic(asset_price, strike)
        })
        .collect();

    let american = spec.exercise == ExerciseStyle::American;
    for step in (0..n).rev() {
        for j in 0..=step {
            let continuation = discount * (prob_up * values[j + 1] + (1.0 - prob_up) * values[j]);
            values[j] = if american {
                let asset_price = spot * up.powi(j as i32) * down.powi((step - j) as i32);
                continuation.max(spec.kind.intrinsic(asset_price, strike))
            } else {
                continuation
            };
        }
    }

    Ok(values[0])
}
