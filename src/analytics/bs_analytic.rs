// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes formulas for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model with continuous dividend yield q, the
//! underlying follows the risk-neutral dynamics:
//! ```text
//! dS_t = (r − q) S_t dt + σ S_t dW_t
//! ```
//!
//! The risk-neutral pricing formula gives:
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//!
//! with closed-form solutions for European calls and puts involving the
//! cumulative normal distribution Φ(x). These serve as the convergence
//! reference for the lattice engine.

use crate::math_utils::norm_cdf;

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C = S*e^(-qT)*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// ```
///
/// Where:
/// ```text
/// d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    s * (-q * t).exp() * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P = K*e^(-rT)*Φ(-d₂) - S*e^(-qT)*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    k * (-r * t).exp() * norm_cdf(-d2) - s * (-q * t).exp() * norm_cdf(-d1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_call_parity() {
        let (s, k, r, q, sigma, t) = (100.0, 105.0, 0.05, 0.02, 0.2, 1.0);
        let c = bs_call_price(s, k, r, q, sigma, t);
        let p = bs_put_price(s, k, r, q, sigma, t);
        let forward = s * (-q * t).exp() - k * (-r * t).exp();
        assert!((c - p - forward).abs() < 1e-10);
    }

    #[test]
    fn test_reference_call_value() {
        // Standard textbook parameters: S=100, K=105, r=5%, sigma=20%, T=1.
        let c = bs_call_price(100.0, 105.0, 0.05, 0.0, 0.2, 1.0);
        assert!((c - 8.0214).abs() < 1e-3, "got {}", c);
    }

    #[test]
    fn test_deep_moneyness_limits() {
        // Far in-the-money call approaches the discounted forward.
        let c = bs_call_price(1000.0, 1.0, 0.05, 0.0, 0.2, 1.0);
        assert!((c - (1000.0 - 1.0 * (-0.05f64).exp())).abs() < 1e-6);
        // Far out-of-the-money call is nearly worthless.
        assert!(bs_call_price(1.0, 1000.0, 0.05, 0.0, 0.2, 1.0) < 1e-10);
    }
}
