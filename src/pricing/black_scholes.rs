//! Closed-form Black-Scholes call pricing on a non-dividend-paying share.
//!
//! Inputs are not validated: a non-positive spot or strike, or a zero
//! volatility or maturity, propagates NaN or infinity through the result.
//! See [`crate::core::params::PricingParams::validate`].

use crate::core::params::PricingParams;
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Black-Scholes `d1` term.
pub fn d1(params: &PricingParams) -> f64 {
    let PricingParams {
        spot,
        strike,
        maturity,
        risk_free_rate,
        volatility,
        ..
    } = *params;
    ((spot / strike).ln() + (risk_free_rate + 0.5 * volatility * volatility) * maturity)
        / (volatility * maturity.sqrt())
}

/// Black-Scholes `d2` term, `d1 - σ√T`.
pub fn d2(params: &PricingParams) -> f64 {
    d1(params) - params.volatility * params.maturity.sqrt()
}

/// European call value for one share.
pub fn call_price(params: &PricingParams) -> f64 {
    let discount = (-params.risk_free_rate * params.maturity).exp();
    params.spot * norm_cdf(d1(params)) - params.strike * discount * norm_cdf(d2(params))
}
