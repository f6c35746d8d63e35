// src/market.rs
//! Validated market parameter bundle shared by both pricing engines.

use crate::error::{validation::*, PricerResult};

/// Immutable market parameters for a single underlying.
///
/// Constructed only through [`MarketModel::new`], which validates every
/// field, so a partially valid model cannot reach an engine. Rate and
/// dividend yield are continuously compounded annual figures; maturity is
/// in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketModel {
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    maturity: f64,
    dividend_yield: f64,
}

impl MarketModel {
    /// Build a model with no dividend yield.
    pub fn new(
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricerResult<Self> {
        Self::with_dividend_yield(spot, strike, rate, volatility, maturity, 0.0)
    }

    /// Build a model with a continuous dividend yield.
    ///
    /// Fails with `InvalidParameter` when spot ≤ 0, strike ≤ 0,
    /// volatility < 0, maturity ≤ 0, dividend yield < 0, or any field is
    /// non-finite. The rate carries no sign restriction.
    pub fn with_dividend_yield(
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        dividend_yield: f64,
    ) -> PricerResult<Self> {
        validate_positive("spot", spot)?;
        validate_positive("strike", strike)?;
        validate_finite("rate", rate)?;
        validate_non_negative("volatility", volatility)?;
        validate_positive("maturity", maturity)?;
        validate_non_negative("dividend_yield", dividend_yield)?;

        Ok(MarketModel {
            spot,
            strike,
            rate,
            volatility,
            maturity,
            dividend_yield,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Discount factor over the full maturity, e^(−rT).
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }
}
