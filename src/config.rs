use eyre::{Context, Result};
use promptlab::tools::{TemperatureRange, ToolDescriptor, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub backend: BackendConfig,
    /// Extra tool descriptors appended to the built-ins
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Temperatures the backend accepts
    pub temperature_range: TemperatureRange,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 120_000,
            temperature_range: TemperatureRange::default(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            backend: BackendConfig::default(),
            tools: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .promptlab.yml in current directory
    /// 3. ~/.config/promptlab/promptlab.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(format!(".{}.yml", PROJECT_NAME));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load {}: {}", project_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(PROJECT_NAME).join(format!("{}.yml", PROJECT_NAME));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            eyre::bail!("backend.base_url must not be empty");
        }
        if self.backend.timeout_ms == 0 {
            eyre::bail!("backend.timeout_ms must be > 0");
        }
        let range = &self.backend.temperature_range;
        if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
            eyre::bail!(
                "backend.temperature_range must be finite with min <= max (got min {}, max {})",
                range.min,
                range.max
            );
        }
        Ok(())
    }

    /// Built-in tools plus configured extras, checked against the temperature range
    pub fn registry(&self) -> Result<ToolRegistry> {
        ToolRegistry::with_extra(self.tools.clone(), &self.backend.temperature_range)
            .context("Invalid tool configuration")
    }
}
