//! End-to-end runs of the two tools, driven by a [`Config`].

use crate::config::Config;
use crate::pricing::convertible::{value_convertible, ConvertibleValuation};
use crate::report::chart::{save_animation, save_chart, AnimationOutcome};
use crate::report::export::write_overlay_xlsx;
use crate::report::ReportError;
use crate::simulation::fx_overlay::{simulate_currency_overlay, OverlayTable};
use crate::simulation::returns::{simulate_returns, SimulationError};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Everything the convertible tool produces.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertibleReport {
    pub valuation: ConvertibleValuation,
    pub dynamic_alpha: f64,
    pub chart: Option<PathBuf>,
    pub animation: Option<AnimationOutcome>,
}

impl ConvertibleReport {
    /// The four headline numbers, in print order.
    pub fn headline(&self) -> [f64; 4] {
        [
            self.valuation.embedded_option_value,
            self.valuation.bond_floor,
            self.valuation.fair_value,
            self.dynamic_alpha,
        ]
    }
}

impl std::fmt::Display for ConvertibleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Convertible Valuation ===")?;
        self.valuation.write_headline(f)?;
        writeln!(f, "Dynamic Alpha:         {}", self.dynamic_alpha)?;
        self.valuation.write_terms(f)?;
        if let Some(chart) = &self.chart {
            writeln!(f, "Chart:                 {}", chart.display())?;
        }
        match &self.animation {
            Some(AnimationOutcome::Saved { path, frames }) => {
                writeln!(f, "Animation:             {} ({} frames)", path.display(), frames)?
            }
            Some(AnimationOutcome::BackendUnavailable { format, .. }) => {
                writeln!(f, "Animation:             not saved ({} unavailable)", format)?
            }
            None => {}
        }
        Ok(())
    }
}

fn ensure_output_dir(config: &Config) -> Result<(), ReportError> {
    let dir = &config.output.output_dir;
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.clone(),
        source,
    })
}

/// Value the convertible, simulate returns and, if `charts` is set, write
/// the static chart and the animation.
pub fn run_convertible(config: &Config, charts: bool) -> Result<ConvertibleReport, RunError> {
    let cb = &config.convertible;
    if let Err(e) = cb.pricing.validate() {
        log::warn!("pricing parameters out of domain: {}", e);
    }
    let bond = cb.bond_terms();
    if let Err(e) = bond.validate() {
        log::warn!("bond terms out of domain: {}", e);
    }
    if f64::from(bond.periods) != cb.pricing.maturity {
        log::warn!(
            "bond schedule has {} periods but option maturity is {} years",
            bond.periods,
            cb.pricing.maturity
        );
    }

    let valuation = value_convertible(&cb.pricing, &bond);
    let series = simulate_returns(&cb.returns)?;
    let dynamic_alpha = series.dynamic_alpha();
    log::info!("dynamic alpha {:.6}", dynamic_alpha);

    let (chart, animation) = if charts {
        ensure_output_dir(config)?;
        let chart_path = config.output.chart_path();
        save_chart(&series, &config.output.chart, &chart_path)?;
        let outcome = save_animation(
            &series,
            &config.output.chart,
            &config.output.animation,
            &config.output.animation_path(),
        )?;
        (Some(chart_path), Some(outcome))
    } else {
        (None, None)
    };

    Ok(ConvertibleReport {
        valuation,
        dynamic_alpha,
        chart,
        animation,
    })
}

/// Run the configured scenarios and, if `export` is set, write the workbook.
pub fn run_overlay(config: &Config, export: bool) -> Result<(OverlayTable, Option<PathBuf>), RunError> {
    let overlay = &config.overlay;
    if let Err(e) = overlay.params.validate() {
        log::warn!("overlay parameters out of range: {}", e);
    }
    let table = simulate_currency_overlay(&overlay.params, &overlay.scenarios);

    if !export {
        return Ok((table, None));
    }
    ensure_output_dir(config)?;
    let path = config.output.export_path();
    write_overlay_xlsx(&table, &path)?;
    Ok((table, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::BondTerms;
    use crate::pricing::convertible::bond_floor;
    use approx::assert_relative_eq;

    #[test]
    fn test_convertible_without_charts() {
        let report = run_convertible(&Config::default(), false).unwrap();
        let [option, floor, fair, _alpha] = report.headline();
        assert_relative_eq!(option, 371.4206908543212, epsilon = 1e-8);
        assert_relative_eq!(floor, 918.3025591188856, epsilon = 1e-9);
        assert_relative_eq!(fair, 1289.7232499732067, epsilon = 1e-8);
        assert!(report.chart.is_none());
        assert!(report.animation.is_none());
    }

    #[test]
    fn test_report_prints_headline_before_terms() {
        let report = run_convertible(&Config::default(), false).unwrap();
        let text = report.to_string();
        let position = |needle: &str| {
            text.find(needle)
                .unwrap_or_else(|| panic!("{:?} missing from report", needle))
        };
        let lines: Vec<&str> = text.lines().collect();
        let fair = lines.iter().position(|l| l.starts_with("Fair Value:")).unwrap();
        assert!(lines[fair + 1].starts_with("Dynamic Alpha:"));
        assert!(position("Embedded Option Value:") < position("Bond Floor:"));
        assert!(position("Bond Floor:") < position("Fair Value:"));
        assert!(position("Dynamic Alpha:") < position("--- Terms ---"));
    }

    #[test]
    fn test_schedule_from_maturity_reprices_floor() {
        let mut config = Config::default();
        config.convertible.pricing.maturity = 5.0;
        config.convertible.schedule_from_maturity = true;
        let report = run_convertible(&config, false).unwrap();
        let expected = bond_floor(&BondTerms {
            periods: 5,
            ..Default::default()
        });
        assert_relative_eq!(report.valuation.bond_floor, expected, epsilon = 1e-12);
        assert!(report.valuation.bond_floor < 918.3025591188856);
    }

    #[test]
    fn test_overlay_without_export() {
        let (table, path) = run_overlay(&Config::default(), false).unwrap();
        assert_eq!(table.len(), 3);
        assert!(path.is_none());
    }

    #[test]
    fn test_invalid_simulation_surfaces_error() {
        let mut config = Config::default();
        config.convertible.returns.component_std = f64::NAN;
        assert!(matches!(
            run_convertible(&config, false),
            Err(RunError::Simulation(_))
        ));
    }
}
