//! Zoom-aware grid clustering over a [`QuadTree`].
//!
//! The engine lays a uniform grid over the integer-aligned scan bounds, asks
//! the index for the markers in each cell and reduces every cell to nothing,
//! the lone marker it holds, or a [`ClusterMarker`] at the cell's centroid.

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::QuadTree;
use crate::marker::{ClusterMarker, DisplayMarker, Marker};
use crate::pipeline::CancellationToken;
use quadcluster_types::bbox::BoundingBox;
use quadcluster_types::coordinate::Coordinate;

/// The grid a cluster pass walks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanGrid {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    /// Cell edge in degrees
    pub cell_size: f64,
    /// Cells along the longitude axis
    pub columns: u64,
    /// Cells along the latitude axis
    pub rows: u64,
}

impl ScanGrid {
    /// Grid covering `[floor(sw), ceil(ne) + cell_size)` on both axes.
    pub fn new(north_east: Coordinate, south_west: Coordinate, cell_size: f64) -> Result<Self> {
        if !north_east.is_finite() || !south_west.is_finite() {
            return Err(ClusterError::InvalidInput(format!(
                "Scan corners must be finite, got NE ({}, {}) SW ({}, {})",
                north_east.latitude, north_east.longitude, south_west.latitude, south_west.longitude
            )));
        }

        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ClusterError::DegenerateGrid(format!(
                "Cell size must be positive and finite, got: {}",
                cell_size
            )));
        }

        let min_latitude = south_west.latitude.floor();
        let max_latitude = north_east.latitude.ceil();
        let min_longitude = south_west.longitude.floor();
        let max_longitude = north_east.longitude.ceil();

        Ok(Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
            cell_size,
            columns: Self::steps(min_longitude, max_longitude, cell_size),
            rows: Self::steps(min_latitude, max_latitude, cell_size),
        })
    }

    /// Count of `k >= 0` with `min + k * cell < max + cell`.
    fn steps(min: f64, max: f64, cell_size: f64) -> u64 {
        let steps = ((max - min) / cell_size + 1.0).ceil();
        if steps.is_nan() || steps <= 0.0 {
            0
        } else if steps >= u64::MAX as f64 {
            u64::MAX
        } else {
            steps as u64
        }
    }

    pub fn cell_count(&self) -> u64 {
        self.columns.saturating_mul(self.rows)
    }

    /// Box of the cell at `column`, `row`.
    pub fn cell(&self, column: u64, row: u64) -> BoundingBox {
        let longitude = self.min_longitude + column as f64 * self.cell_size;
        let latitude = self.min_latitude + row as f64 * self.cell_size;
        BoundingBox::from_corners(
            Coordinate::new(latitude + self.cell_size, longitude + self.cell_size),
            Coordinate::new(latitude, longitude),
        )
    }
}

/// Reduces a quadtree to display markers for one zoom level.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Grid cell edge in degrees for `zoom`.
    ///
    /// `world_size / (tile_size * 2^zoom)`, i.e. `32768 / (256 * 2^zoom)` by
    /// default, replaced by `clamped_cell_size` once zoom passes the clamp
    /// threshold.
    ///
    /// ```
    /// use quadcluster::ClusterEngine;
    ///
    /// let engine = ClusterEngine::default();
    /// assert_eq!(engine.cell_size(0.0).unwrap(), 128.0);
    /// assert_eq!(engine.cell_size(3.0).unwrap(), 16.0);
    /// assert_eq!(engine.cell_size(14.0).unwrap(), 1.0);
    /// assert!(engine.cell_size(-1.0).is_err());
    /// ```
    pub fn cell_size(&self, zoom: f64) -> Result<f64> {
        if !zoom.is_finite() || zoom < 0.0 {
            return Err(ClusterError::InvalidZoom(zoom));
        }

        let cell_size = if zoom > self.config.zoom_clamp_threshold {
            self.config.clamped_cell_size
        } else {
            self.config.world_size / (self.config.tile_size * 2f64.powf(zoom))
        };

        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ClusterError::DegenerateGrid(format!(
                "Zoom {} yields unusable cell size {}",
                zoom, cell_size
            )));
        }

        Ok(cell_size)
    }

    /// Build the scan grid for a zoom level and pair of corners, enforcing the
    /// configured cell ceiling.
    pub fn scan_grid(
        &self,
        zoom: f64,
        boundary_ne: Coordinate,
        boundary_sw: Coordinate,
    ) -> Result<ScanGrid> {
        let grid = ScanGrid::new(boundary_ne, boundary_sw, self.cell_size(zoom)?)?;

        if grid.cell_count() > self.config.max_grid_cells {
            log::warn!(
                "Refusing {}x{} grid at zoom {} (limit {} cells)",
                grid.columns,
                grid.rows,
                zoom,
                self.config.max_grid_cells
            );
            return Err(ClusterError::DegenerateGrid(format!(
                "Grid of {} x {} cells exceeds the limit of {}",
                grid.columns, grid.rows, self.config.max_grid_cells
            )));
        }

        Ok(grid)
    }

    /// Cluster the markers of `index` at `zoom`.
    ///
    /// `boundary_ne`/`boundary_sw` bound the scanned grid; `view_box` prunes
    /// index subtrees. A marker lying on a grid line matches every cell that
    /// shares the line and is reported once per cell.
    pub fn cluster<M>(
        &self,
        index: &QuadTree<M>,
        zoom: f64,
        boundary_ne: Coordinate,
        boundary_sw: Coordinate,
        view_box: &BoundingBox,
    ) -> Result<Vec<DisplayMarker<M>>>
    where
        M: Marker + Clone,
    {
        self.cluster_with_cancel(
            index,
            zoom,
            boundary_ne,
            boundary_sw,
            view_box,
            &CancellationToken::new(),
        )
    }

    /// [`ClusterEngine::cluster`] that gives up with [`ClusterError::Cancelled`]
    /// once `cancel` fires. The token is checked before each grid column.
    ///
    /// An empty index yields an empty result for any valid zoom, whatever the
    /// corners.
    pub fn cluster_with_cancel<M>(
        &self,
        index: &QuadTree<M>,
        zoom: f64,
        boundary_ne: Coordinate,
        boundary_sw: Coordinate,
        view_box: &BoundingBox,
        cancel: &CancellationToken,
    ) -> Result<Vec<DisplayMarker<M>>>
    where
        M: Marker + Clone,
    {
        self.cell_size(zoom)?;
        if index.is_empty() {
            return Ok(Vec::new());
        }

        let grid = self.scan_grid(zoom, boundary_ne, boundary_sw)?;
        let mut clustered = Vec::new();

        for column in 0..grid.columns {
            if cancel.is_cancelled() {
                log::debug!("Cluster pass cancelled at column {}/{}", column, grid.columns);
                return Err(ClusterError::Cancelled);
            }

            for row in 0..grid.rows {
                let cell = grid.cell(column, row);
                if let Some(marker) = self.reduce_cell(index, view_box, &cell) {
                    clustered.push(marker);
                }
            }
        }

        log::debug!(
            "Clustered {} markers into {} at zoom {} (cell {}°, {} cells)",
            index.len(),
            clustered.len(),
            zoom,
            grid.cell_size,
            grid.cell_count()
        );

        Ok(clustered)
    }

    fn reduce_cell<M>(
        &self,
        index: &QuadTree<M>,
        view_box: &BoundingBox,
        cell: &BoundingBox,
    ) -> Option<DisplayMarker<M>>
    where
        M: Marker + Clone,
    {
        let mut first: Option<&M> = None;
        let mut count = 0usize;
        let mut total_latitude = 0.0;
        let mut total_longitude = 0.0;

        index.visit_region(view_box, cell, |marker| {
            let coordinate = marker.coordinate();
            total_latitude += coordinate.latitude;
            total_longitude += coordinate.longitude;
            count += 1;
            first.get_or_insert(marker);
        });

        match count {
            0 => None,
            1 => first.cloned().map(DisplayMarker::Single),
            _ => {
                let centroid = Coordinate::new(
                    total_latitude / count as f64,
                    total_longitude / count as f64,
                );
                Some(DisplayMarker::Cluster(ClusterMarker::new(
                    centroid,
                    count,
                    self.config.cluster_title(count),
                )))
            }
        }
    }
}
