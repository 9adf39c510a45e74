//! Binding configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the binding engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// When false, arrows never bind automatically and selected arrows are
    /// unbound instead.
    #[serde(default = "default_binding_enabled")]
    pub binding_enabled: bool,
    /// Lower bound of the binding border width, in scene units.
    #[serde(default = "default_min_binding_gap")]
    pub min_binding_gap: f64,
    /// Upper bound of the binding border width, in scene units.
    #[serde(default = "default_max_binding_gap")]
    pub max_binding_gap: f64,
    /// Fraction of the smaller side used as binding border width.
    #[serde(default = "default_binding_gap_ratio")]
    pub binding_gap_ratio: f64,
}

fn default_binding_enabled() -> bool {
    true
}

fn default_min_binding_gap() -> f64 {
    16.0
}

fn default_max_binding_gap() -> f64 {
    32.0
}

fn default_binding_gap_ratio() -> f64 {
    0.25
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            binding_enabled: default_binding_enabled(),
            min_binding_gap: default_min_binding_gap(),
            max_binding_gap: default_max_binding_gap(),
            binding_gap_ratio: default_binding_gap_ratio(),
        }
    }
}

impl BindingConfig {
    /// Config with automatic binding switched off.
    pub fn disabled() -> Self {
        Self {
            binding_enabled: false,
            ..Self::default()
        }
    }
}
