//! Currency overlay example.
//!
//! Runs the three reference EUR/USD scenarios at several hedge ratios to
//! show how the forward trades upside for protection.

use equity_research::core::params::{FxScenario, OverlayParams};
use equity_research::simulation::fx_overlay::simulate_currency_overlay;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  equity-research: FX Overlay Scenarios    ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let scenarios = FxScenario::default_set();

    // --- Reference run ---
    let table = simulate_currency_overlay(&OverlayParams::default(), &scenarios);
    println!("{}", table);

    // --- Hedge ratio sweep ---
    println!("━━━ Profit from Overlay by Hedge Ratio ━━━\n");
    for hedge_ratio in [dec!(0), dec!(0.25), dec!(0.5), dec!(0.75), dec!(1)] {
        let params = OverlayParams {
            hedge_ratio,
            ..Default::default()
        };
        let table = simulate_currency_overlay(&params, &scenarios);
        let profits: Vec<String> = table
            .rows()
            .iter()
            .map(|r| format!("{:>14}", r.profit_from_overlay))
            .collect();
        println!("  h = {:<5} {}", hedge_ratio, profits.join(" "));
    }
}
