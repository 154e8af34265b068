//! Clusterer builder for flexible configuration
//!
//! This module provides a builder pattern for creating a [`Clusterer`] with a
//! tuned node capacity, zoom clamp and grid ceiling.

use crate::cluster::ClusterEngine;
use crate::clusterer::Clusterer;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::marker::Marker;

/// Builder for [`Clusterer`] configuration.
#[derive(Debug, Clone, Default)]
pub struct ClustererBuilder {
    config: ClusterConfig,
}

impl ClustererBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClusterConfig) -> Self {
        self.config = config;
        self
    }

    /// Markers a quadtree node holds before subdividing.
    pub fn node_capacity(mut self, capacity: usize) -> Self {
        self.config.node_capacity = capacity;
        self
    }

    /// Use `cell_size` degrees for every zoom strictly above `threshold`.
    pub fn zoom_clamp(mut self, threshold: f64, cell_size: f64) -> Self {
        self.config = self.config.with_zoom_clamp(threshold, cell_size);
        self
    }

    /// Refuse grids with more than `max_cells` cells.
    pub fn max_grid_cells(mut self, max_cells: u64) -> Self {
        self.config.max_grid_cells = max_cells;
        self
    }

    pub fn cluster_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.cluster_title_prefix = prefix.into();
        self
    }

    /// Validate the configuration and build the clusterer.
    pub fn build<M: Marker + Clone>(self) -> Result<Clusterer<M>> {
        self.config.validate()?;
        Ok(Clusterer::from_engine(ClusterEngine::new(self.config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusterer::Viewport;
    use crate::error::ClusterError;
    use crate::marker::RawMarker;
    use quadcluster_types::coordinate::Coordinate;

    #[test]
    fn test_builder_default() {
        let clusterer: Clusterer<RawMarker> = ClustererBuilder::new().build().unwrap();
        assert_eq!(clusterer.config(), &ClusterConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let clusterer: Clusterer<RawMarker> = ClustererBuilder::new()
            .node_capacity(4)
            .zoom_clamp(6.0, 2.0)
            .max_grid_cells(1_000)
            .cluster_title_prefix("n=")
            .build()
            .unwrap();

        let config = clusterer.config();
        assert_eq!(config.node_capacity, 4);
        assert_eq!(config.zoom_clamp_threshold, 6.0);
        assert_eq!(config.clamped_cell_size, 2.0);
        assert_eq!(config.max_grid_cells, 1_000);
        assert_eq!(clusterer.engine().cell_size(7.0).unwrap(), 2.0);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = ClustererBuilder::new().node_capacity(0).build::<RawMarker>();
        assert!(matches!(result, Err(ClusterError::InvalidConfig(_))));

        let result = ClustererBuilder::new()
            .zoom_clamp(5.0, 0.0)
            .build::<RawMarker>();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_title_prefix_reaches_clusters() {
        let mut clusterer: Clusterer<RawMarker> = ClustererBuilder::new()
            .cluster_title_prefix("n=")
            .build()
            .unwrap();

        let viewport = Viewport::new(Coordinate::new(1.0, 1.0), Coordinate::new(0.0, 0.0), 7.0);
        let output = clusterer
            .rebuild(&[RawMarker::at(0.1, 0.1), RawMarker::at(0.2, 0.2)], &viewport)
            .unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].as_cluster().unwrap().cluster_title, "n=2");
    }
}
