use anyhow::{Context, Result};
use mien_core::{Matcher, ScoringStrategy};
use serde::Deserialize;
use std::path::Path;

/// Matching configuration, layered in increasing precedence: built-in
/// defaults, optional TOML file, `MIEN_*` environment variables. Explicit
/// CLI flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Accept/reject distance threshold.
    pub threshold: f32,
    /// Confidence scoring strategy.
    pub strategy: ScoringStrategy,
}

/// On-disk shape; every field optional so a partial file overrides only
/// what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    threshold: Option<f32>,
    strategy: Option<ScoringStrategy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: Matcher::DEFAULT_THRESHOLD,
            strategy: ScoringStrategy::default(),
        }
    }
}

impl Config {
    /// Load configuration, starting from defaults. Malformed files or
    /// environment values fail here, not mid-run.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config at {}", path.display()))?;
            let file: FileConfig = toml::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?;
            config.apply_file(file);
        }

        config.apply_env()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(threshold) = file.threshold {
            self.threshold = threshold;
        }
        if let Some(strategy) = file.strategy {
            self.strategy = strategy;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var("MIEN_THRESHOLD") {
            self.threshold = raw
                .parse()
                .with_context(|| format!("parsing MIEN_THRESHOLD={raw}"))?;
        }
        if let Ok(raw) = std::env::var("MIEN_STRATEGY") {
            self.strategy = raw
                .parse()
                .with_context(|| format!("parsing MIEN_STRATEGY={raw}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.strategy, ScoringStrategy::Asymmetric);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file: FileConfig =
            toml::from_str("threshold = 0.45\nstrategy = \"linear-threshold\"").unwrap();
        let mut config = Config::default();
        config.apply_file(file);
        assert_eq!(config.threshold, 0.45);
        assert_eq!(config.strategy, ScoringStrategy::LinearThreshold);
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let file: FileConfig = toml::from_str("threshold = 0.3").unwrap();
        let mut config = Config::default();
        config.apply_file(file);
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.strategy, ScoringStrategy::Asymmetric);
    }

    #[test]
    fn test_unknown_strategy_in_file_is_rejected() {
        let parsed: Result<FileConfig, _> = toml::from_str("strategy = \"cosine\"");
        assert!(parsed.is_err());
    }
}
