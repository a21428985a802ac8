//! Calibration constants for the heuristic parts of the engine.
//!
//! The defaults are the fixed values the report and investigation
//! outputs were calibrated against. Changing them changes output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Period delta percentage is divided by this to get the anomaly score.
    pub zscore_divisor: f64,
    /// A score with magnitude at or above this is flagged.
    pub flag_threshold: f64,
    /// Cells at or below `low_cut_ratio × median` revenue are low candidates.
    pub low_cut_ratio: f64,
    /// Cells at or above `high_cut_ratio × median` revenue are high candidates.
    pub high_cut_ratio: f64,
    pub max_hits_per_side: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            zscore_divisor: 12.0,
            flag_threshold: 1.0,
            low_cut_ratio: 0.62,
            high_cut_ratio: 1.65,
            max_hits_per_side: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_limit: usize,
    pub min_limit: usize,
    pub max_limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            min_limit: 1,
            max_limit: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootCauseConfig {
    /// Drivers reported on each side (top and bottom).
    pub driver_count: usize,
}

impl Default for RootCauseConfig {
    fn default() -> Self {
        Self { driver_count: 2 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly: AnomalyConfig,
    pub ranking: RankingConfig,
    pub root_cause: RootCauseConfig,
}

impl EngineConfig {
    /// Load from a JSON file. Omitted fields keep their defaults.
    /// In tests, use EngineConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.anomaly.zscore_divisor == 0.0 {
            anyhow::bail!("anomaly.zscore_divisor must be non-zero");
        }
        if self.ranking.min_limit == 0 || self.ranking.min_limit > self.ranking.max_limit {
            anyhow::bail!(
                "ranking limits must satisfy 1 <= min_limit <= max_limit (got {}..{})",
                self.ranking.min_limit,
                self.ranking.max_limit
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "ranking": { "max_limit": 10 } }"#).unwrap();
        assert_eq!(config.ranking.max_limit, 10);
        assert_eq!(config.ranking.default_limit, 5);
        assert_eq!(config.anomaly, AnomalyConfig::default());
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let mut config = EngineConfig::default();
        config.ranking.min_limit = 30;
        assert!(config.validate().is_err());
    }
}
