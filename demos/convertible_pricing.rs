//! Convertible bond valuation example.
//!
//! Prices the reference convertible, then shows how fair value and the
//! option share move as the share price changes.

use equity_research::core::params::{BondTerms, PricingParams};
use equity_research::pricing::convertible::value_convertible;
use equity_research::simulation::returns::{simulate_returns, ReturnSimulationConfig};

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  equity-research: Convertible Valuation Demo  ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let params = PricingParams::default();
    let terms = BondTerms::default();

    // --- Reference valuation ---
    let valuation = value_convertible(&params, &terms);
    println!("{}", valuation);

    // --- Spot ladder ---
    println!("━━━ Fair Value by Share Price ━━━\n");
    println!("  {:>8} {:>12} {:>12} {:>8}", "Spot", "Option", "Fair Value", "Option%");
    for spot in [30.0, 40.0, 50.0, 60.0, 70.0, 80.0] {
        let shifted = PricingParams { spot, ..params };
        let v = value_convertible(&shifted, &terms);
        println!(
            "  {:>8.2} {:>12.2} {:>12.2} {:>7.1}%",
            spot,
            v.embedded_option_value,
            v.fair_value,
            v.option_share() * 100.0
        );
    }
    println!();

    // --- Dynamic alpha ---
    println!("━━━ Dynamic Alpha (50/50 convertible/benchmark) ━━━\n");
    match simulate_returns(&ReturnSimulationConfig::default()) {
        Ok(series) => println!("  Alpha over {} draws: {:.6}", series.len(), series.dynamic_alpha()),
        Err(e) => eprintln!("  Simulation failed: {}", e),
    }
}
