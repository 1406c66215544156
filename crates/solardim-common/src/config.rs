//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the SolarDim binaries."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use solardim_calc_engine::{
    params::{
        SizingParameters, DEFAULT_PANEL_POWER_WC, DEFAULT_SYSTEM_VOLTAGE_V, DEFAULT_TARIFF_PER_KWH,
    },
    project::ProjectOptions,
};
use tracing::debug;

use crate::logging::LogFormat;

fn default_panel_power_wc() -> f64 {
    DEFAULT_PANEL_POWER_WC
}

fn default_system_voltage_v() -> f64 {
    DEFAULT_SYSTEM_VOLTAGE_V
}

fn default_tariff_per_kwh() -> f64 {
    DEFAULT_TARIFF_PER_KWH
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_reports_directory() -> PathBuf {
    PathBuf::from("target/reports")
}

/// Primary configuration object for the SolarDim tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sizing: SizingParameters,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and built-in defaults apply.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "SOLARDIM_CONFIG";

    /// Load configuration from disk together with the effective source path.
    ///
    /// Fails when neither the environment override nor any candidate exists.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        match Self::locate(candidates)? {
            Some(loaded) => Ok(loaded),
            None => Err(anyhow!(
                "no configuration files found. inspected: {}",
                candidates
                    .iter()
                    .map(|p| p.as_ref().display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    /// Like [`AppConfig::load_with_source`], but falls back to defaults when nothing exists.
    pub fn load_or_default<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        Ok(Self::locate(candidates)?.unwrap_or_else(|| {
            debug!("no configuration file found; using built-in defaults");
            LoadedAppConfig {
                config: AppConfig::default(),
                source: None,
            }
        }))
    }

    fn locate<P: AsRef<Path>>(candidates: &[P]) -> Result<Option<LoadedAppConfig>> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: Some(path),
                }));
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                }));
            }
        }
        Ok(None)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.sizing
            .validate()
            .map_err(|err| anyhow!("[sizing] {err}"))?;
        if self.sizing.comparison_wattages.is_empty() {
            return Err(anyhow!("[sizing] comparison_wattages must not be empty"));
        }
        self.defaults.validate()?;
        self.finance.validate()?;
        Ok(())
    }

    /// Project options derived from the `[defaults]` and `[finance]` sections.
    pub fn project_options(&self) -> ProjectOptions {
        ProjectOptions {
            panel_power_wc: self.defaults.panel_power_wc,
            system_voltage_v: self.defaults.system_voltage_v,
            default_tariff_per_kwh: self.finance.tariff_per_kwh,
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Fallback equipment figures used when a project leaves them unspecified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_panel_power_wc")]
    pub panel_power_wc: f64,
    #[serde(default = "default_system_voltage_v")]
    pub system_voltage_v: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            panel_power_wc: default_panel_power_wc(),
            system_voltage_v: default_system_voltage_v(),
        }
    }
}

impl DefaultsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.panel_power_wc.is_finite() && self.panel_power_wc > 0.0) {
            return Err(anyhow!(
                "[defaults] panel_power_wc must be positive (got {})",
                self.panel_power_wc
            ));
        }
        if !(self.system_voltage_v.is_finite() && self.system_voltage_v > 0.0) {
            return Err(anyhow!(
                "[defaults] system_voltage_v must be positive (got {})",
                self.system_voltage_v
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Electricity price per kWh used when neither bills nor the project give one.
    #[serde(default = "default_tariff_per_kwh")]
    pub tariff_per_kwh: f64,
    /// Applied to projects that carry no installation cost of their own.
    #[serde(default)]
    pub installation_cost: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            tariff_per_kwh: default_tariff_per_kwh(),
            installation_cost: 0.0,
        }
    }
}

impl FinanceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.tariff_per_kwh.is_finite() && self.tariff_per_kwh > 0.0) {
            return Err(anyhow!(
                "[finance] tariff_per_kwh must be positive (got {})",
                self.tariff_per_kwh
            ));
        }
        if !(self.installation_cost.is_finite() && self.installation_cost >= 0.0) {
            return Err(anyhow!(
                "[finance] installation_cost must be zero or positive (got {})",
                self.installation_cost
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_reports_directory")]
    pub directory: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_reports_directory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const SAMPLE: &str = r#"
[sizing]
performance_ratio = 0.75
comparison_wattages = [400.0, 550.0]

[defaults]
panel_power_wc = 450.0

[finance]
tariff_per_kwh = 110.0
installation_cost = 2500000.0

[logging]
directory = "logs"
format = "structured-json"

[reports]
directory = "out"
"#;

    #[test]
    fn parses_sections_and_keeps_defaults() {
        let config = AppConfig::from_str(SAMPLE).unwrap();
        assert_eq!(config.sizing.performance_ratio, 0.75);
        assert_eq!(config.sizing.depth_of_discharge, 0.95);
        assert_eq!(config.sizing.comparison_wattages, vec![400.0, 550.0]);
        assert_eq!(config.defaults.panel_power_wc, 450.0);
        assert_eq!(config.defaults.system_voltage_v, 48.0);
        assert_eq!(config.finance.installation_cost, 2_500_000.0);
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert_eq!(config.reports.directory, PathBuf::from("out"));

        let options = config.project_options();
        assert_eq!(options.panel_power_wc, 450.0);
        assert_eq!(options.default_tariff_per_kwh, 110.0);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_str("").unwrap();
        assert_eq!(config.sizing, SizingParameters::default());
        assert_eq!(config.finance.tariff_per_kwh, 150.0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = AppConfig::from_str("[sizing]\nperformance_ratio = 1.4\n").unwrap_err();
        assert!(err.to_string().contains("[sizing]"));

        let err = AppConfig::from_str("[defaults]\npanel_power_wc = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("panel_power_wc"));

        let err = AppConfig::from_str("[finance]\ntariff_per_kwh = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("tariff_per_kwh"));

        let err = AppConfig::from_str("[finance]\ntariff_per_kwh = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("tariff_per_kwh"));

        let err =
            AppConfig::from_str("[sizing]\ncomparison_wattages = [400.0, -5.0]\n").unwrap_err();
        assert!(err.to_string().contains("comparison wattage"));
    }

    #[test]
    fn loads_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("solardim.toml");
        fs::write(&present, SAMPLE).unwrap();
        let missing = dir.path().join("missing.toml");

        let loaded = AppConfig::from_path(&present).unwrap();
        assert_eq!(loaded.defaults.panel_power_wc, 450.0);

        if std::env::var(AppConfig::ENV_CONFIG_PATH).is_err() {
            let loaded = AppConfig::load_with_source(&[&missing, &present]).unwrap();
            assert_eq!(loaded.source.as_deref(), Some(present.as_path()));

            let fallback = AppConfig::load_or_default(&[&missing]).unwrap();
            assert!(fallback.source.is_none());
            assert!(AppConfig::load_with_source(&[&missing]).is_err());
        }
    }
}
