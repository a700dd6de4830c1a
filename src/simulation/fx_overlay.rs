//! Currency overlay scenario engine.
//!
//! A base-currency portfolio is partially hedged with a forward locked at
//! the initial rate. For each terminal-rate scenario the engine compares
//! the quote-currency value of the hedged strategy against leaving the
//! whole notional unhedged.

use crate::core::currency::CurrencyPair;
use crate::core::params::{FxScenario, OverlayParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money columns are reported to this many decimal places.
pub const REPORT_DECIMALS: u32 = 2;

/// Outcome of one scenario, all values in the quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRow {
    pub scenario: String,
    pub final_fx: Decimal,
    pub unhedged_usd: Decimal,
    pub hedged_usd: Decimal,
    /// Hedged plus unhedged leg.
    pub total_with_overlay: Decimal,
    /// Whole notional converted at the terminal rate.
    pub total_no_overlay: Decimal,
    /// Gain (positive) or cost (negative) of running the hedge.
    pub profit_from_overlay: Decimal,
}

/// Ordered results of an overlay simulation, one row per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayTable {
    pub pair: CurrencyPair,
    pub hedge_ratio: Decimal,
    rows: Vec<OverlayRow>,
}

impl OverlayTable {
    pub fn rows(&self) -> &[OverlayRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by scenario name.
    pub fn row(&self, scenario: &str) -> Option<&OverlayRow> {
        self.rows.iter().find(|r| r.scenario == scenario)
    }

    /// Sum of overlay profit across all scenarios.
    pub fn total_profit(&self) -> Decimal {
        self.rows.iter().map(|r| r.profit_from_overlay).sum()
    }
}

/// Run every scenario against the same position and hedge.
///
/// Rows keep the order of `scenarios`. Inputs are not guarded: a hedge ratio
/// outside `[0, 1]` or a negative rate produces arithmetically valid output.
///
/// # Examples
///
/// ```
/// use equity_research::core::params::{FxScenario, OverlayParams};
/// use equity_research::simulation::fx_overlay::simulate_currency_overlay;
/// use rust_decimal_macros::dec;
///
/// let table = simulate_currency_overlay(
///     &OverlayParams::default(),
///     &[FxScenario::new("up", dec!(1.15))],
/// );
/// assert_eq!(table.rows()[0].profit_from_overlay, dec!(-375000.00));
/// ```
pub fn simulate_currency_overlay(params: &OverlayParams, scenarios: &[FxScenario]) -> OverlayTable {
    let hedged_usd = params.notional * params.initial_fx * params.hedge_ratio;
    let unhedged_fraction = Decimal::ONE - params.hedge_ratio;

    let rows = scenarios
        .iter()
        .map(|scenario| {
            let final_fx = scenario.final_fx;
            let unhedged_usd = params.notional * unhedged_fraction * final_fx;
            let total_with_overlay = unhedged_usd + hedged_usd;
            let total_no_overlay = params.notional * final_fx;
            let profit = total_with_overlay - total_no_overlay;

            log::debug!(
                "scenario '{}': final_fx={} profit={}",
                scenario.name,
                final_fx,
                profit
            );

            OverlayRow {
                scenario: scenario.name.clone(),
                final_fx: round(final_fx),
                unhedged_usd: round(unhedged_usd),
                hedged_usd: round(hedged_usd),
                total_with_overlay: round(total_with_overlay),
                total_no_overlay: round(total_no_overlay),
                profit_from_overlay: round(profit),
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "overlay simulated for {} scenarios at hedge ratio {}",
        rows.len(),
        params.hedge_ratio
    );

    OverlayTable {
        pair: params.pair.clone(),
        hedge_ratio: params.hedge_ratio,
        rows,
    }
}

/// Half-to-even rounding to [`REPORT_DECIMALS`] places.
fn round(value: Decimal) -> Decimal {
    value.round_dp(REPORT_DECIMALS)
}

impl std::fmt::Display for OverlayTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "=== Currency Overlay ({}, hedge ratio {}) ===",
            self.pair, self.hedge_ratio
        )?;
        let name_width = self
            .rows
            .iter()
            .map(|r| r.scenario.chars().count())
            .max()
            .unwrap_or(0)
            .max("Scenario".len());
        writeln!(
            f,
            "{:<name_width$} {:>8} {:>15} {:>15} {:>15} {:>15} {:>15}",
            "Scenario", "Final FX", "Unhedged", "Hedged", "With overlay", "No overlay", "Profit",
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<name_width$} {:>8} {:>15} {:>15} {:>15} {:>15} {:>15}",
                row.scenario,
                row.final_fx,
                row.unhedged_usd,
                row.hedged_usd,
                row.total_with_overlay,
                row.total_no_overlay,
                row.profit_from_overlay,
            )?;
        }
        Ok(())
    }
}
