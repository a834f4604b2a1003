//! Audit configuration
//!
//! Tolerances, layer filters and symbol patterns, loaded from JSON. Every
//! section is optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::graph::BuildTolerances;
use crate::symbols::{PatternError, PatternResolver, SymbolPatterns};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tolerance {name}: {value} (must be finite and non-negative)")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Endpoint clustering radius
    pub tau_endpoint_snap: f64,
    /// Ground symbol to junction attach radius
    pub tau_junction_snap: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            tau_endpoint_snap: 2.0,
            tau_junction_snap: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl LayerConfig {
    pub fn accepts(&self, layer: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|l| l == layer) {
            return false;
        }
        !self.exclude.iter().any(|l| l == layer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub attach_distance: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            attach_distance: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Layers whose segments count as wires; empty means all
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub tolerance: ToleranceConfig,
    pub layers: LayerConfig,
    /// Resolver groups in priority order
    pub symbols: Vec<SymbolPatterns>,
    pub text: TextConfig,
    pub wires: WireConfig,
}

impl AuditConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: AuditConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("tolerance.tau_endpoint_snap", self.tolerance.tau_endpoint_snap),
            ("tolerance.tau_junction_snap", self.tolerance.tau_junction_snap),
            ("text.attach_distance", self.text.attach_distance),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }

    /// Validated tolerances for graph construction.
    pub fn build_tolerances(&self) -> Result<BuildTolerances, ConfigError> {
        self.validate()?;
        Ok(BuildTolerances {
            endpoint_snap: self.tolerance.tau_endpoint_snap,
            junction_snap: self.tolerance.tau_junction_snap,
            text_attach: self.text.attach_distance,
        })
    }

    pub fn symbol_resolver(&self) -> Result<PatternResolver, ConfigError> {
        Ok(PatternResolver::new(&self.symbols)?)
    }
}
