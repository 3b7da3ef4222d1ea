//! Configuration of the generation flow
//!
//! Every field has a default, so a configuration file only needs the values it changes:
//! ```
//! # use gatemap::config::GenerateConfig;
//! let cfg = GenerateConfig::from_json_str(r#"{ "gates": ["NAND"], "layout": { "min_gap": 80 } }"#).unwrap();
//! assert_eq!(cfg.gates.len(), 1);
//! assert_eq!(cfg.layout.min_gap, 80.0);
//! assert_eq!(cfg.layout.level_width, 200.0);
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::GateSet;
use crate::synth::MAX_DEPTH;

/// Placement constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal position of the input column
    pub margin: f64,
    /// Horizontal distance between consecutive levels
    pub level_width: f64,
    /// Vertical position of the first input
    pub input_top: f64,
    /// Vertical distance between consecutive inputs
    pub input_spacing: f64,
    /// Minimum vertical distance between nodes of the same level
    pub min_gap: f64,
    /// Ideal positions closer than this are ordered by equation instead
    pub tie_threshold: f64,
    /// Position of nodes without any input
    pub default_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            margin: 50.0,
            level_width: 200.0,
            input_top: 100.0,
            input_spacing: 90.0,
            min_gap: 120.0,
            tie_threshold: 20.0,
            default_y: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal position of a level
    pub fn column_x(&self, level: usize) -> f64 {
        self.margin + level as f64 * self.level_width
    }
}

/// Wire routing constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Horizontal distance between consecutive levels
    pub level_width: f64,
    /// Spans longer than this fraction of a level bend in the first gutter
    pub long_span_ratio: f64,
    /// Position of the first gutter, as a fraction of a level from the leftmost end
    pub gutter_ratio: f64,
    /// Number of distinct lanes
    pub lane_count: usize,
    /// Horizontal distance between lanes
    pub lane_spacing: f64,
    /// Minimum horizontal distance between the bend and either end
    pub clearance: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            level_width: 200.0,
            long_span_ratio: 0.8,
            gutter_ratio: 0.55,
            lane_count: 10,
            lane_spacing: 8.0,
            clearance: 25.0,
        }
    }
}

/// Full configuration of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Gates allowed in the synthesized circuit
    pub gates: GateSet,
    /// Reject unbalanced parentheses, trailing tokens and misplaced keywords
    pub strict: bool,
    /// Maximum nesting of rewrites during synthesis
    pub max_depth: usize,
    /// Placement constants
    pub layout: LayoutConfig,
    /// Routing constants
    pub route: RouteConfig,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            gates: GateSet::default(),
            strict: false,
            max_depth: MAX_DEPTH,
            layout: LayoutConfig::default(),
            route: RouteConfig::default(),
        }
    }
}

impl GenerateConfig {
    /// Create the default configuration with a given gate set
    pub fn with_gates(gates: GateSet) -> Self {
        GenerateConfig {
            gates,
            ..Default::default()
        }
    }

    /// Read a configuration from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(Error::Config)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path)?;
        serde_json::from_reader(BufReader::new(f)).map_err(Error::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::GenerateConfig;
    use crate::network::GateKind;

    #[test]
    fn test_defaults() {
        let cfg = GenerateConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, GenerateConfig::default());
        assert!(cfg.gates.contains(GateKind::And));
        assert!(!cfg.gates.contains(GateKind::Nand4));
        assert!(!cfg.strict);
        assert_eq!(cfg.max_depth, 30);
        assert_eq!(cfg.layout.column_x(2), 450.0);
        assert_eq!(cfg.route.lane_count, 10);
    }

    #[test]
    fn test_partial() {
        let cfg = GenerateConfig::from_json_str(
            r#"{ "strict": true, "gates": ["NOR", "NOT"], "route": { "clearance": 10 } }"#,
        )
        .unwrap();
        assert!(cfg.strict);
        assert_eq!(cfg.gates, "NOR,NOT".parse().unwrap());
        assert_eq!(cfg.route.clearance, 10.0);
        assert_eq!(cfg.route.lane_spacing, 8.0);
    }

    #[test]
    fn test_invalid() {
        assert!(GenerateConfig::from_json_str(r#"{ "gates": ["MUX"] }"#).is_err());
        assert!(GenerateConfig::from_json_str(r#"{ "strict": 3 }"#).is_err());
    }
}
