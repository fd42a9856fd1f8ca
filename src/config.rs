use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid playback period {value:?}: {message}")]
    Period { value: String, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("deploy/choreo")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Control tick, as a humantime duration such as `20ms`.
    #[serde(default = "default_period")]
    pub period: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
        }
    }
}

fn default_period() -> String {
    "20ms".to_string()
}

impl PlaybackConfig {
    pub fn period(&self) -> Result<Duration, ConfigError> {
        parse_period(&self.period)
    }
}

pub fn parse_period(value: &str) -> Result<Duration, ConfigError> {
    let period = humantime::parse_duration(value.trim()).map_err(|e| ConfigError::Period {
        value: value.to_string(),
        message: e.to_string(),
    })?;
    if period.is_zero() {
        return Err(ConfigError::Period {
            value: value.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(period)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.playback.period()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.deploy.dir, PathBuf::from("deploy/choreo"));
        assert_eq!(config.playback.period().unwrap(), Duration::from_millis(20));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_str(
            "deploy:\n  dir: /home/lvuser/deploy/choreo\nplayback:\n  period: 10ms\n",
        )
        .unwrap();
        assert_eq!(config.deploy.dir, PathBuf::from("/home/lvuser/deploy/choreo"));
        assert_eq!(config.playback.period().unwrap(), Duration::from_millis(10));
    }

    #[test]
    fn test_rejects_bad_period() {
        assert!(matches!(
            Config::from_str("playback:\n  period: soon\n"),
            Err(ConfigError::Period { .. })
        ));
        assert!(matches!(parse_period("0s"), Err(ConfigError::Period { .. })));
    }
}
