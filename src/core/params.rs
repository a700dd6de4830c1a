use crate::core::currency::CurrencyPair;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating instrument parameters.
///
/// The pricing functions themselves never check their inputs; validation is
/// a separate step the caller may run to flag economically meaningless runs.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("hedge ratio must lie in [0, 1], got {0}")]
    HedgeRatioOutOfRange(Decimal),
    #[error("{field} must be positive, got {value}")]
    NonPositiveRate { field: &'static str, value: Decimal },
    #[error("bond schedule must have at least one period")]
    EmptySchedule,
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ParamsError> {
    if !value.is_finite() {
        return Err(ParamsError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ParamsError::NonPositive { field, value });
    }
    Ok(())
}

/// Inputs to the embedded-option valuation.
///
/// # Examples
///
/// ```
/// use equity_research::core::params::PricingParams;
///
/// let params = PricingParams::default();
/// assert_eq!(params.spot, 60.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingParams {
    /// Current share price.
    pub spot: f64,
    /// Conversion price (option strike).
    pub strike: f64,
    /// Time to maturity in years.
    pub maturity: f64,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: f64,
    /// Annualised volatility of the underlying.
    pub volatility: f64,
    /// Shares received per converted bond.
    pub conversion_ratio: f64,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            spot: 60.0,
            strike: 50.0,
            maturity: 3.0,
            risk_free_rate: 0.02,
            volatility: 0.30,
            conversion_ratio: 20.0,
        }
    }
}

impl PricingParams {
    /// Check that the inputs lie in the domain of the closed-form formula.
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_positive("spot", self.spot)?;
        check_positive("strike", self.strike)?;
        check_positive("maturity", self.maturity)?;
        check_positive("volatility", self.volatility)?;
        if !self.risk_free_rate.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        check_positive("conversion_ratio", self.conversion_ratio)
    }
}

/// Fixed cash-flow terms of the bond host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondTerms {
    pub face_value: f64,
    /// Annual coupon as a fraction of face value.
    pub coupon_rate: f64,
    /// Yield used to discount every cash flow.
    pub discount_rate: f64,
    /// Number of annual coupon periods; principal is repaid at the last one.
    pub periods: u16,
}

impl Default for BondTerms {
    fn default() -> Self {
        Self {
            face_value: 1000.0,
            coupon_rate: 0.02,
            discount_rate: 0.05,
            periods: 3,
        }
    }
}

impl BondTerms {
    /// Coupon paid each period.
    pub fn coupon(&self) -> f64 {
        self.face_value * self.coupon_rate
    }

    /// Same terms with the schedule length taken from a maturity in years.
    ///
    /// Fractional maturities are rounded up to the next whole period; the
    /// result is clamped to `0..=u16::MAX` and NaN gives an empty schedule.
    pub fn with_periods_from_maturity(mut self, maturity: f64) -> Self {
        self.periods = if maturity.is_nan() {
            0
        } else {
            maturity.ceil().clamp(0.0, f64::from(u16::MAX)) as u16
        };
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        check_positive("face_value", self.face_value)?;
        if self.periods == 0 {
            return Err(ParamsError::EmptySchedule);
        }
        if self.discount_rate <= -1.0 || !self.discount_rate.is_finite() {
            return Err(ParamsError::NonPositive {
                field: "1 + discount_rate",
                value: 1.0 + self.discount_rate,
            });
        }
        Ok(())
    }
}

/// A named terminal exchange-rate scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxScenario {
    pub name: String,
    /// Spot rate at the horizon, quoted as the overlay pair.
    pub final_fx: Decimal,
}

impl FxScenario {
    pub fn new(name: impl Into<String>, final_fx: Decimal) -> Self {
        Self {
            name: name.into(),
            final_fx,
        }
    }

    /// The three six-month EUR/USD scenarios: appreciation, flat, depreciation.
    pub fn default_set() -> Vec<FxScenario> {
        vec![
            FxScenario::new("EUR/USD appreciates to 1.15", dec!(1.15)),
            FxScenario::new("EUR/USD stable at 1.10", dec!(1.10)),
            FxScenario::new("EUR/USD depreciates to 1.05", dec!(1.05)),
        ]
    }
}

/// Position and hedge inputs for the FX overlay simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    pub pair: CurrencyPair,
    /// Portfolio notional in the base currency.
    pub notional: Decimal,
    /// Rate at inception, also the forward rate locked by the hedge.
    pub initial_fx: Decimal,
    /// Fraction of the notional covered by the forward.
    pub hedge_ratio: Decimal,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::eur_usd(),
            notional: dec!(10_000_000),
            initial_fx: dec!(1.10),
            hedge_ratio: dec!(0.75),
        }
    }
}

impl OverlayParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.hedge_ratio < Decimal::ZERO || self.hedge_ratio > Decimal::ONE {
            return Err(ParamsError::HedgeRatioOutOfRange(self.hedge_ratio));
        }
        if self.initial_fx <= Decimal::ZERO {
            return Err(ParamsError::NonPositiveRate {
                field: "initial_fx",
                value: self.initial_fx,
            });
        }
        if self.notional <= Decimal::ZERO {
            return Err(ParamsError::NonPositiveRate {
                field: "notional",
                value: self.notional,
            });
        }
        Ok(())
    }
}
