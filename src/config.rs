//! Run configuration: instrument parameters and output locations.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! reproduces the reference run of both tools.
//!
//! ```json
//! {
//!   "output": { "output_dir": "out", "animation_format": "apng" },
//!   "convertible": { "pricing": { "spot": 62.5 }, "bond": { "periods": 5 } },
//!   "overlay": {
//!     "params": { "hedge_ratio": "0.5" },
//!     "scenarios": [ { "name": "EUR/USD to 1.20", "final_fx": "1.20" } ]
//!   }
//! }
//! ```

use crate::core::params::{BondTerms, FxScenario, OverlayParams, PricingParams};
use crate::report::chart::{AnimationSettings, ChartStyle};
use crate::simulation::returns::ReturnSimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where and how artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub chart_file: String,
    pub animation_file: String,
    pub export_file: String,
    pub chart: ChartStyle,
    pub animation: AnimationSettings,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_file: "dynamic_alpha_chart.png".to_string(),
            animation_file: "dynamic_alpha_animation.png".to_string(),
            export_file: "currency_overlay_scenarios.xlsx".to_string(),
            chart: ChartStyle::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl OutputConfig {
    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }

    pub fn animation_path(&self) -> PathBuf {
        self.output_dir.join(&self.animation_file)
    }

    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join(&self.export_file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertibleConfig {
    pub pricing: PricingParams,
    pub bond: BondTerms,
    pub returns: ReturnSimulationConfig,
    /// Derive the bond schedule from the option maturity instead of
    /// `bond.periods`.
    pub schedule_from_maturity: bool,
}

impl ConvertibleConfig {
    /// Bond terms actually priced, after applying `schedule_from_maturity`.
    pub fn bond_terms(&self) -> BondTerms {
        if self.schedule_from_maturity {
            self.bond.with_periods_from_maturity(self.pricing.maturity)
        } else {
            self.bond
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub params: OverlayParams,
    /// Evaluated and reported in this order.
    pub scenarios: Vec<FxScenario>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            params: OverlayParams::default(),
            scenarios: FxScenario::default_set(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub convertible: ConvertibleConfig,
    pub overlay: OverlayConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::AnimationFormat;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json_str("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json_str(
            r#"{
                "output": { "output_dir": "out", "animation": { "format": "gif" } },
                "convertible": { "pricing": { "spot": 62.5 }, "bond": { "periods": 5 } },
                "overlay": {
                    "params": { "hedge_ratio": 0.5 },
                    "scenarios": [ { "name": "up", "final_fx": "1.20" } ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.output.chart_path(), PathBuf::from("out/dynamic_alpha_chart.png"));
        assert_eq!(config.output.animation.format, AnimationFormat::Gif);
        assert_eq!(config.output.animation.fps, 10);
        assert_eq!(config.convertible.pricing.spot, 62.5);
        assert_eq!(config.convertible.pricing.strike, 50.0);
        assert_eq!(config.convertible.bond.periods, 5);
        assert_eq!(config.overlay.params.hedge_ratio, dec!(0.5));
        assert_eq!(config.overlay.scenarios.len(), 1);
        assert_eq!(config.overlay.scenarios[0].final_fx, dec!(1.20));
    }

    #[test]
    fn test_schedule_follows_maturity_when_enabled() {
        let config = Config::from_json_str(
            r#"{ "convertible": { "pricing": { "maturity": 5.5 }, "schedule_from_maturity": true } }"#,
        )
        .unwrap();
        assert_eq!(config.convertible.bond.periods, 3);
        assert_eq!(config.convertible.bond_terms().periods, 6);

        let fixed = Config::from_json_str(r#"{ "convertible": { "pricing": { "maturity": 5.5 } } }"#).unwrap();
        assert_eq!(fixed.convertible.bond_terms().periods, 3);
    }

    #[test]
    fn test_default_paths() {
        let output = OutputConfig::default();
        assert_eq!(
            output.export_path(),
            PathBuf::from("./currency_overlay_scenarios.xlsx")
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Config::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_json_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
