//! # equity-research
//!
//! Two one-shot research tools for convertible bond and currency work.
//!
//! - A convertible bond valuator: embedded conversion option priced with
//!   Black-Scholes, bond floor from discounted cash flows, fair value as their
//!   sum, plus a seeded return simulation measuring dynamic alpha and charting
//!   the return distributions.
//! - An FX overlay simulator: compares a partially forward-hedged position
//!   against an unhedged one across terminal exchange-rate scenarios and
//!   exports the results to a spreadsheet.
//!
//! ## Architecture
//!
//! - **core** — Parameter records and currency types
//! - **pricing** — Black-Scholes call, bond floor, convertible fair value
//! - **simulation** — Return simulation and FX overlay scenarios
//! - **report** — PNG/APNG charts and XLSX export
//! - **config** — JSON run configuration
//! - **pipeline** — End-to-end runs used by the CLI

pub mod config;
pub mod core;
pub mod pipeline;
pub mod pricing;
pub mod report;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::core::currency::{CurrencyCode, CurrencyPair};
    pub use crate::core::params::{BondTerms, FxScenario, OverlayParams, PricingParams};
    pub use crate::pricing::convertible::{value_convertible, ConvertibleValuation};
    pub use crate::report::chart::AnimationOutcome;
    pub use crate::simulation::fx_overlay::{simulate_currency_overlay, OverlayRow, OverlayTable};
    pub use crate::simulation::returns::{simulate_returns, ReturnSeries, ReturnSimulationConfig};
}
