use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub aws: AwsConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Overall scan deadline; unfinished kinds are reported as warnings
    /// and the partial report is still produced.
    pub timeout_secs: u64,
    /// Path to a TOML price table replacing the built-in one.
    pub price_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub report_path: PathBuf,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            aws: AwsConfig {
                region: "us-east-1".to_string(),
                profile: None,
            },
            scan: ScanConfig {
                timeout_secs: 300,
                price_table: None,
            },
            output: OutputConfig {
                report_path: PathBuf::from("cloudsweep-report.json"),
            },
        }
    }
}

impl SweepConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .cloudsweep.toml in current dir, then ~/.config/cloudsweep/config.toml
            let local = PathBuf::from(".cloudsweep.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("cloudsweep").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".cloudsweep.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: SweepConfig = toml::from_str(&content).with_context(|| {
                let mut err = format!("Failed to parse config: {}", config_path.display());
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Incorrect value types");
                err.push_str("\n  Tip: Run 'cloudsweep init' to create a new config file");
                err
            })?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!(
                    "   Using default configuration. Run 'cloudsweep init' to create a config file."
                );
            }
            Ok(SweepConfig::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = SweepConfig::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = SweepConfig::default();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.scan.timeout_secs, 300);
        assert!(config.scan.price_table.is_none());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config = SweepConfig::default();
        assert!(config.save(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = SweepConfig::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.aws.region, config.aws.region);
        assert_eq!(loaded.scan.timeout_secs, config.scan.timeout_secs);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let fake_path = temp_dir.path().join("nonexistent.toml");

        // Should return default config
        let config = SweepConfig::load(Some(&fake_path)).unwrap();
        assert_eq!(config.scan.timeout_secs, 300);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid toml content {").unwrap();

        let result = SweepConfig::load(Some(&config_path));
        assert!(result.is_err());
    }
}
