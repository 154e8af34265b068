//! Clustering configuration
//!
//! Serializable tuning knobs for the quadtree and the grid engine. Every field
//! has a default, so partial JSON or TOML documents load cleanly.

use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};

/// Configuration shared by the index, the cluster engine and the orchestrator.
///
/// # Example
///
/// ```rust
/// use quadcluster::ClusterConfig;
///
/// // Create default config
/// let config = ClusterConfig::default();
/// assert_eq!(config.node_capacity, 25);
///
/// // Load from JSON
/// let json = r#"{
///     "node_capacity": 32,
///     "zoom_clamp_threshold": 12.0
/// }"#;
/// let config = ClusterConfig::from_json_str(json).unwrap();
/// assert_eq!(config.node_capacity, 32);
/// assert_eq!(config.clamped_cell_size, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Markers a quadtree node holds before it subdivides
    #[serde(default = "ClusterConfig::default_node_capacity")]
    pub node_capacity: usize,

    /// Zoom levels strictly above this use `clamped_cell_size`
    #[serde(default = "ClusterConfig::default_zoom_clamp_threshold")]
    pub zoom_clamp_threshold: f64,

    /// Cell size in degrees used past the clamp threshold
    #[serde(default = "ClusterConfig::default_clamped_cell_size")]
    pub clamped_cell_size: f64,

    /// Numerator of the cell size formula (2^15)
    #[serde(default = "ClusterConfig::default_world_size")]
    pub world_size: f64,

    /// Tile edge in pixels; cell size is `world_size / (tile_size * 2^zoom)`
    #[serde(default = "ClusterConfig::default_tile_size")]
    pub tile_size: f64,

    /// Upper bound on the number of grid cells scanned in one pass
    #[serde(default = "ClusterConfig::default_max_grid_cells")]
    pub max_grid_cells: u64,

    /// Cluster titles read `"{prefix}{count}"`
    #[serde(default = "ClusterConfig::default_cluster_title_prefix")]
    pub cluster_title_prefix: String,
}

impl ClusterConfig {
    const fn default_node_capacity() -> usize {
        25
    }

    const fn default_zoom_clamp_threshold() -> f64 {
        10.0
    }

    const fn default_clamped_cell_size() -> f64 {
        1.0
    }

    const fn default_world_size() -> f64 {
        32768.0
    }

    const fn default_tile_size() -> f64 {
        256.0
    }

    const fn default_max_grid_cells() -> u64 {
        1 << 24
    }

    fn default_cluster_title_prefix() -> String {
        "Marker Count: ".to_string()
    }

    /// Set the node capacity. Zero is rejected by [`ClusterConfig::validate`].
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    pub fn with_zoom_clamp(mut self, threshold: f64, cell_size: f64) -> Self {
        self.zoom_clamp_threshold = threshold;
        self.clamped_cell_size = cell_size;
        self
    }

    pub fn with_max_grid_cells(mut self, max_cells: u64) -> Self {
        self.max_grid_cells = max_cells;
        self
    }

    pub fn with_cluster_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cluster_title_prefix = prefix.into();
        self
    }

    /// Title given to a synthesized cluster of `count` markers.
    pub fn cluster_title(&self, count: usize) -> String {
        format!("{}{}", self.cluster_title_prefix, count)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.node_capacity == 0 {
            return Err(ClusterError::InvalidConfig(
                "Node capacity must be greater than zero".to_string(),
            ));
        }

        if !self.zoom_clamp_threshold.is_finite() {
            return Err(ClusterError::InvalidConfig(format!(
                "Zoom clamp threshold must be finite, got: {}",
                self.zoom_clamp_threshold
            )));
        }

        for (name, value) in [
            ("Clamped cell size", self.clamped_cell_size),
            ("World size", self.world_size),
            ("Tile size", self.tile_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ClusterError::InvalidConfig(format!(
                    "{} must be positive and finite, got: {}",
                    name, value
                )));
            }
        }

        if self.max_grid_cells == 0 {
            return Err(ClusterError::InvalidConfig(
                "Grid cell ceiling must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_capacity: Self::default_node_capacity(),
            zoom_clamp_threshold: Self::default_zoom_clamp_threshold(),
            clamped_cell_size: Self::default_clamped_cell_size(),
            world_size: Self::default_world_size(),
            tile_size: Self::default_tile_size(),
            max_grid_cells: Self::default_max_grid_cells(),
            cluster_title_prefix: Self::default_cluster_title_prefix(),
        }
    }
}
