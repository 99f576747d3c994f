//! Engine configuration
//!
//! One TOML document describes where archives live, how their names are
//! resolved, where the code dictionaries come from and how queries execute.
//!
//! ```toml
//! reference_curve = "data/refpc.csv"
//!
//! [store]
//! type = "fs"
//! root = "data"
//!
//! [archives]
//! strategy = "scan"
//! series_namespace = "10Min"
//! stats_namespace = "Statistics"
//!
//! [registry]
//! parameters = "data/parameters.csv"
//!
//! [registry.turbines]
//! T01 = "DB91012"
//!
//! [engine]
//! workers = 8
//! query_timeout_secs = 120
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use windscope_core::{
    CodeRegistries, ParameterCode, ParameterRegistry, RegistryError, StoreError, TurbineRegistry,
};
pub use windscope_store::{FsConfig, HttpConfig, StoreConfig};

/// Errors raised while loading configuration or building the engine
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Two-column wind/power reference table merged into responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_curve: Option<PathBuf>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub archives: ArchiveLayout,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub engine: ExecutionConfig,
    #[serde(default)]
    pub power_curve: PowerCurveConfig,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.workers == 0 {
            return Err(ConfigError::Invalid("engine.workers must be at least 1".into()));
        }
        if self.engine.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "engine.query_timeout_secs must be at least 1".into(),
            ));
        }
        if self.power_curve.min_power >= self.power_curve.max_power {
            return Err(ConfigError::Invalid(format!(
                "power_curve band is empty: ({}, {})",
                self.power_curve.min_power, self.power_curve.max_power
            )));
        }
        if self.archives.strategy == ResolveStrategy::Exact {
            for pattern in [&self.archives.series_pattern, &self.archives.stats_pattern] {
                if !pattern.contains("{device}") || !pattern.contains("{day}") {
                    return Err(ConfigError::Invalid(format!(
                        "archive pattern '{}' needs both {{device}} and {{day}}",
                        pattern
                    )));
                }
            }
        }
        Ok(())
    }
}

/// How an archive name is found for a device and day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveStrategy {
    /// List the family namespace and accept any `.zip` whose name contains
    /// both the device code and the day
    #[default]
    Scan,
    /// Build the name from the family pattern
    Exact,
}

/// Where the two archive families live and how their names look
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveLayout {
    #[serde(default)]
    pub strategy: ResolveStrategy,
    /// Namespace of the time-series (10-minute) archives
    #[serde(default = "default_series_namespace")]
    pub series_namespace: String,
    /// Namespace of the daily statistics archives
    #[serde(default = "default_stats_namespace")]
    pub stats_namespace: String,
    /// File name pattern for exact resolution (`{device}`, `{day}`)
    #[serde(default = "default_pattern")]
    pub series_pattern: String,
    #[serde(default = "default_pattern")]
    pub stats_pattern: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            strategy: ResolveStrategy::default(),
            series_namespace: default_series_namespace(),
            stats_namespace: default_stats_namespace(),
            series_pattern: default_pattern(),
            stats_pattern: default_pattern(),
        }
    }
}

fn default_series_namespace() -> String {
    "10Min".to_string()
}

fn default_stats_namespace() -> String {
    "Statistics".to_string()
}

fn default_pattern() -> String {
    "{device}_{day}.zip".to_string()
}

/// Sources of the code dictionaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Parameter code/name CSV
    #[serde(default = "default_parameters_path")]
    pub parameters: PathBuf,
    /// Optional turbine id/device code CSV; replaces the inline table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbines_file: Option<PathBuf>,
    /// Inline turbine id → device code table
    #[serde(default = "default_fleet")]
    pub turbines: BTreeMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            parameters: default_parameters_path(),
            turbines_file: None,
            turbines: default_fleet(),
        }
    }
}

impl RegistryConfig {
    /// Build both registries; a parameter source without two columns is fatal
    pub fn load(&self) -> Result<CodeRegistries, ConfigError> {
        let turbines = match self.turbines_file {
            Some(ref path) => TurbineRegistry::from_csv_path(path)?,
            None => TurbineRegistry::from_pairs(
                self.turbines.iter().map(|(id, code)| (id.as_str(), code.as_str())),
            )?,
        };
        let parameters = ParameterRegistry::from_csv_path(&self.parameters)?;
        tracing::info!(
            turbines = turbines.len(),
            parameters = parameters.len(),
            "Code registries loaded"
        );
        Ok(CodeRegistries::new(turbines, parameters))
    }
}

fn default_parameters_path() -> PathBuf {
    PathBuf::from("data/parameters.csv")
}

/// The ten-turbine fleet the archives were first collected from
fn default_fleet() -> BTreeMap<String, String> {
    [
        ("T01", "DB91012"),
        ("T02", "DB91010"),
        ("T03", "DB91004"),
        ("T04", "DB91009"),
        ("T05", "DB91003"),
        ("T06", "DB91006"),
        ("T07", "DB91005"),
        ("T08", "DB91008"),
        ("T09", "DB91007"),
        ("T10", "DB91011"),
    ]
    .into_iter()
    .map(|(id, code)| (id.to_string(), code.to_string()))
    .collect()
}

/// Query execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Archives fetched and parsed concurrently per query
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Wall-clock budget of one query
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl ExecutionConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn default_workers() -> usize {
    8
}

fn default_query_timeout() -> u64 {
    120
}

/// Fixed parameters and plausibility band of the power curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerCurveConfig {
    /// `(Met) Wind speed`
    #[serde(default = "default_wind_code")]
    pub wind_code: ParameterCode,
    /// `(Gri) Active power`
    #[serde(default = "default_power_code")]
    pub power_code: ParameterCode,
    /// Exclusive lower bound on active power (kW)
    #[serde(default = "default_min_power")]
    pub min_power: f64,
    /// Exclusive upper bound on active power (kW)
    #[serde(default = "default_max_power")]
    pub max_power: f64,
}

impl Default for PowerCurveConfig {
    fn default() -> Self {
        Self {
            wind_code: default_wind_code(),
            power_code: default_power_code(),
            min_power: default_min_power(),
            max_power: default_max_power(),
        }
    }
}

impl PowerCurveConfig {
    pub fn accepts_power(&self, power: f64) -> bool {
        power > self.min_power && power < self.max_power
    }
}

fn default_wind_code() -> ParameterCode {
    ParameterCode::from("1431")
}

fn default_power_code() -> ParameterCode {
    ParameterCode::from("634")
}

fn default_min_power() -> f64 {
    10.0
}

fn default_max_power() -> f64 {
    2100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use windscope_core::TurbineId;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.archives.strategy, ResolveStrategy::Scan);
        assert_eq!(config.archives.series_namespace, "10Min");
        assert_eq!(config.archives.stats_namespace, "Statistics");
        assert_eq!(config.engine.workers, 8);
        assert_eq!(config.registry.turbines.len(), 10);
        assert_eq!(config.registry.turbines["T01"], "DB91012");
        assert_eq!(config.power_curve.wind_code, ParameterCode::from("1431"));
        assert!(config.reference_curve.is_none());
    }

    #[test]
    fn test_full_document() {
        let toml = r#"
reference_curve = "/srv/refpc.csv"

[store]
type = "http"
base_url = "https://farm.example.com/bucket"
prefix = "logs/"

[archives]
strategy = "exact"
series_pattern = "{device}_10min_{day}.zip"
stats_pattern = "{device}_stat_{day}.zip"

[registry]
parameters = "/srv/parameters.csv"

[registry.turbines]
T01 = "DB1"

[engine]
workers = 2
query_timeout_secs = 5

[power_curve]
min_power = 0.0
max_power = 3000.0
"#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.archives.strategy, ResolveStrategy::Exact);
        assert_eq!(config.registry.turbines.len(), 1);
        assert_eq!(config.engine.query_timeout(), Duration::from_secs(5));
        assert!(config.power_curve.accepts_power(2500.0));
        assert!(matches!(config.store, StoreConfig::Http(_)));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            EngineConfig::from_toml_str("[engine]\nworkers = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[archives]\nstrategy = \"exact\"\nseries_pattern = \"x.zip\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[power_curve]\nmin_power = 50.0\nmax_power = 50.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[engine\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_power_band_is_open() {
        let band = PowerCurveConfig::default();
        assert!(!band.accepts_power(10.0));
        assert!(band.accepts_power(10.5));
        assert!(band.accepts_power(2099.9));
        assert!(!band.accepts_power(2100.0));
    }

    #[test]
    fn test_registry_load() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("parameters.csv");
        std::fs::write(&params, "VAR_PK,Parameter\n634,Active Power\n1431,Wind Speed\n").unwrap();

        let config = RegistryConfig {
            parameters: params,
            ..RegistryConfig::default()
        };
        let registries = config.load().unwrap();
        assert_eq!(registries.parameters.len(), 2);
        assert_eq!(
            registries.turbines.turbine_of(&"DB91011".into()),
            Some(&TurbineId::from("T10"))
        );
    }

    #[test]
    fn test_registry_load_fails_without_columns() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("parameters.csv");
        std::fs::write(&params, "code\n634\n").unwrap();

        let config = RegistryConfig {
            parameters: params,
            ..RegistryConfig::default()
        };
        assert!(matches!(
            config.load(),
            Err(ConfigError::Registry(RegistryError::MissingColumns { .. }))
        ));
    }
}
