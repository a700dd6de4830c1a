use crate::core::params::{BondTerms, PricingParams};
use crate::pricing::black_scholes;
use serde::{Deserialize, Serialize};

/// Value of the conversion right: the per-share call scaled by the
/// conversion ratio.
pub fn embedded_option_value(params: &PricingParams) -> f64 {
    params.conversion_ratio * black_scholes::call_price(params)
}

/// Present value of the bond's fixed cash flows, ignoring conversion.
///
/// Coupons are paid at the end of periods `1..=periods` and the face value
/// at the last period, all discounted at `discount_rate`.
///
/// # Examples
///
/// ```
/// use equity_research::core::params::BondTerms;
/// use equity_research::pricing::convertible::bond_floor;
///
/// let floor = bond_floor(&BondTerms::default());
/// assert!((floor - 918.3025591188856).abs() < 1e-9);
/// ```
pub fn bond_floor(terms: &BondTerms) -> f64 {
    let coupon = terms.coupon();
    let growth = 1.0 + terms.discount_rate;
    let last = i32::from(terms.periods);
    let coupons: f64 = (1..=last).map(|t| coupon / growth.powi(t)).sum();
    coupons + terms.face_value / growth.powi(last)
}

/// Headline numbers for one convertible, plus the intermediate terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertibleValuation {
    pub embedded_option_value: f64,
    pub bond_floor: f64,
    pub fair_value: f64,
    pub d1: f64,
    pub d2: f64,
    /// Call value per share before scaling by the conversion ratio.
    pub call_per_share: f64,
    /// Immediate conversion value, `spot × conversion_ratio`.
    pub parity: f64,
}

impl ConvertibleValuation {
    /// Share of fair value contributed by the conversion right.
    pub fn option_share(&self) -> f64 {
        if self.fair_value == 0.0 {
            return 0.0;
        }
        self.embedded_option_value / self.fair_value
    }

    /// Option value, bond floor and fair value, one per line.
    pub fn write_headline(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Embedded Option Value: {}", self.embedded_option_value)?;
        writeln!(f, "Bond Floor:            {}", self.bond_floor)?;
        writeln!(f, "Fair Value:            {}", self.fair_value)
    }

    /// The intermediate pricing terms under their own heading.
    pub fn write_terms(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n--- Terms ---")?;
        writeln!(f, "  d1:             {:.6}", self.d1)?;
        writeln!(f, "  d2:             {:.6}", self.d2)?;
        writeln!(f, "  Call per share: {:.6}", self.call_per_share)?;
        writeln!(f, "  Parity:         {:.2}", self.parity)?;
        writeln!(f, "  Option share:   {:.1}%", self.option_share() * 100.0)
    }
}

/// Price the bond host and the conversion right and add them together.
pub fn value_convertible(params: &PricingParams, terms: &BondTerms) -> ConvertibleValuation {
    let call_per_share = black_scholes::call_price(params);
    let embedded_option_value = params.conversion_ratio * call_per_share;
    let bond_floor = bond_floor(terms);
    let fair_value = bond_floor + embedded_option_value;

    log::debug!(
        "convertible: option={:.6} floor={:.6} fair={:.6}",
        embedded_option_value,
        bond_floor,
        fair_value
    );

    ConvertibleValuation {
        embedded_option_value,
        bond_floor,
        fair_value,
        d1: black_scholes::d1(params),
        d2: black_scholes::d2(params),
        call_per_share,
        parity: params.spot * params.conversion_ratio,
    }
}

impl std::fmt::Display for ConvertibleValuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Convertible Valuation ===")?;
        self.write_headline(f)?;
        self.write_terms(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_embedded_option_reference() {
        let value = embedded_option_value(&PricingParams::default());
        assert_relative_eq!(value, 371.4206908543212, epsilon = 1e-8);
    }

    #[test]
    fn test_bond_floor_matches_explicit_sum() {
        let explicit = 20.0 / 1.05 + 20.0 / 1.05f64.powi(2) + 20.0 / 1.05f64.powi(3)
            + 1000.0 / 1.05f64.powi(3);
        assert_relative_eq!(bond_floor(&BondTerms::default()), explicit, epsilon = 1e-10);
    }

    #[test]
    fn test_bond_floor_at_par() {
        // Coupon equal to yield prices at par for any schedule length
        for periods in 1..10 {
            let terms = BondTerms {
                coupon_rate: 0.05,
                periods,
                ..Default::default()
            };
            assert_relative_eq!(bond_floor(&terms), 1000.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_longest_schedule_converges_to_perpetuity() {
        let terms = BondTerms {
            periods: u16::MAX,
            ..Default::default()
        };
        // Principal discounts to nothing; coupons sum to coupon / yield
        assert_relative_eq!(bond_floor(&terms), 20.0 / 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_coupon_floor() {
        let terms = BondTerms {
            coupon_rate: 0.0,
            ..Default::default()
        };
        assert_relative_eq!(bond_floor(&terms), 1000.0 / 1.157625, epsilon = 1e-10);
    }

    #[test]
    fn test_fair_value_is_sum() {
        let valuation = value_convertible(&PricingParams::default(), &BondTerms::default());
        assert_eq!(
            valuation.fair_value,
            valuation.bond_floor + valuation.embedded_option_value
        );
        assert_relative_eq!(valuation.fair_value, 1289.7232499732067, epsilon = 1e-8);
        assert_eq!(valuation.parity, 1200.0);
    }

    #[test]
    fn test_option_share_bounds() {
        let valuation = value_convertible(&PricingParams::default(), &BondTerms::default());
        let share = valuation.option_share();
        assert!(share > 0.0 && share < 1.0);
    }
}
