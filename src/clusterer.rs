//! Per-viewport orchestration: rebuild the index, then cluster it.

use crate::cluster::ClusterEngine;
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::{Extents, QuadTree};
use crate::marker::{DisplayMarker, Marker};
use crate::pipeline::CancellationToken;
use geo::Rect;
use quadcluster_types::bbox::BoundingBox;
use quadcluster_types::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// The visible map area and zoom of one cluster pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub north_east: Coordinate,
    pub south_west: Coordinate,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(north_east: Coordinate, south_west: Coordinate, zoom: f64) -> Self {
        Self {
            north_east,
            south_west,
            zoom,
        }
    }

    /// Viewport spanning a `geo::Rect` in longitude/latitude.
    pub fn from_rect(rect: Rect, zoom: f64) -> Self {
        let bounds = BoundingBox::from_rect(rect);
        Self::new(bounds.north_east(), bounds.south_west(), zoom)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_corners(self.north_east, self.south_west)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.north_east.is_finite() || !self.south_west.is_finite() {
            return Err(ClusterError::InvalidInput(format!(
                "Viewport corners must be finite, got NE ({}, {}) SW ({}, {})",
                self.north_east.latitude,
                self.north_east.longitude,
                self.south_west.latitude,
                self.south_west.longitude
            )));
        }
        Ok(())
    }
}

/// What the most recent rebuild did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Markers accepted by the index
    pub inserted: usize,
    /// Markers outside the viewport box
    pub rejected: usize,
    /// Whether this build recomputed the cached extents
    pub tracked_extents: bool,
    /// Display markers produced
    pub output: usize,
}

/// Rebuilds a [`QuadTree`] for each viewport and clusters it.
///
/// The first build that sees any marker records the extents of that marker
/// set, grown from the origin. Later builds reuse them, so markers that fall
/// outside those extents are never reached by the clustering grid until
/// [`Clusterer::reset_extents`] is called.
///
/// # Examples
///
/// ```
/// use quadcluster::{Clusterer, Coordinate, RawMarker, Viewport};
///
/// let markers = vec![
///     RawMarker::at(0.1, 0.1),
///     RawMarker::at(0.2, 0.2),
///     RawMarker::at(0.9, 0.9),
/// ];
/// let viewport = Viewport::new(Coordinate::new(1.0, 1.0), Coordinate::new(0.0, 0.0), 0.0);
///
/// let mut clusterer = Clusterer::new();
/// let displayed = clusterer.rebuild(&markers, &viewport)?;
/// assert_eq!(displayed.len(), 1);
/// # Ok::<(), quadcluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct Clusterer<M> {
    engine: ClusterEngine,
    cached_extents: Option<Extents>,
    last_index: Option<QuadTree<M>>,
    last_build: Option<BuildReport>,
}

impl<M: Marker + Clone> Clusterer<M> {
    pub fn new() -> Self {
        Self::from_engine(ClusterEngine::default())
    }

    /// Validate `config` and create a clusterer using it.
    pub fn with_config(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_engine(ClusterEngine::new(config)))
    }

    pub(crate) fn from_engine(engine: ClusterEngine) -> Self {
        Self {
            engine,
            cached_extents: None,
            last_index: None,
            last_build: None,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &ClusterEngine {
        &self.engine
    }

    /// Rebuild the index for `viewport` from `markers` and cluster it.
    pub fn rebuild(&mut self, markers: &[M], viewport: &Viewport) -> Result<Vec<DisplayMarker<M>>> {
        self.rebuild_with_cancel(markers, viewport, &CancellationToken::new())
    }

    /// [`Clusterer::rebuild`] that stops with [`ClusterError::Cancelled`] once
    /// `cancel` fires. Once the new index is built it replaces the previous
    /// one, even if clustering is then cancelled.
    pub fn rebuild_with_cancel(
        &mut self,
        markers: &[M],
        viewport: &Viewport,
        cancel: &CancellationToken,
    ) -> Result<Vec<DisplayMarker<M>>> {
        viewport.validate()?;
        self.engine.cell_size(viewport.zoom)?;

        if cancel.is_cancelled() {
            return Err(ClusterError::Cancelled);
        }

        let view_box = viewport.bounds();
        let mut index = QuadTree::with_capacity(view_box, self.config().node_capacity);
        let track_extents = self.cached_extents.is_none();

        let inserted = index.extend(markers.iter().cloned(), track_extents);
        let rejected = markers.len() - inserted;
        log::debug!(
            "Rebuilt index with {} markers ({} outside viewport)",
            inserted,
            rejected
        );

        if track_extents && !index.extents().is_empty() {
            self.cached_extents = Some(index.extents());
        }

        let mut report = BuildReport {
            inserted,
            rejected,
            tracked_extents: track_extents,
            output: 0,
        };

        let corners = self
            .cached_extents
            .as_ref()
            .map(|extents| (extents.north_east(), extents.south_west()));

        let result = match corners {
            Some((north_east, south_west)) => self.engine.cluster_with_cancel(
                &index,
                viewport.zoom,
                north_east,
                south_west,
                &view_box,
                cancel,
            ),
            None => Ok(Vec::new()),
        };

        if let Ok(clustered) = &result {
            report.output = clustered.len();
        }
        self.last_index = Some(index);
        self.last_build = Some(report);

        result
    }

    /// Forget the cached extents so the next rebuild measures the marker set again.
    pub fn reset_extents(&mut self) {
        self.cached_extents = None;
    }

    pub fn cached_extents(&self) -> Option<&Extents> {
        self.cached_extents.as_ref()
    }

    /// Index built by the most recent rebuild.
    pub fn last_index(&self) -> Option<&QuadTree<M>> {
        self.last_index.as_ref()
    }

    pub fn last_build(&self) -> Option<BuildReport> {
        self.last_build
    }
}

impl<M: Marker + Clone> Default for Clusterer<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::RawMarker;

    fn viewport(ne: (f64, f64), sw: (f64, f64), zoom: f64) -> Viewport {
        Viewport::new(ne.into(), sw.into(), zoom)
    }

    #[test]
    fn test_viewport_from_rect() {
        let rect = Rect::new(geo::coord! { x: -74.0, y: 40.0 }, geo::coord! { x: -73.0, y: 41.0 });
        let vp = Viewport::from_rect(rect, 4.0);
        assert_eq!(vp.north_east, Coordinate::new(41.0, -73.0));
        assert_eq!(vp.south_west, Coordinate::new(40.0, -74.0));
        assert_eq!(vp.bounds().rect, rect);
    }

    #[test]
    fn test_empty_marker_set() {
        let mut clusterer: Clusterer<RawMarker> = Clusterer::new();
        let output = clusterer
            .rebuild(&[], &viewport((10.0, 10.0), (-10.0, -10.0), 3.0))
            .unwrap();

        assert!(output.is_empty());
        assert!(clusterer.cached_extents().is_none());
        assert!(clusterer.last_index().unwrap().is_empty());
    }

    #[test]
    fn test_first_build_caches_extents() {
        let markers = vec![RawMarker::at(1.0, 2.0), RawMarker::at(3.0, 4.0)];
        let mut clusterer = Clusterer::new();

        clusterer
            .rebuild(&markers, &viewport((10.0, 10.0), (0.0, 0.0), 7.0))
            .unwrap();

        let extents = clusterer.cached_extents().copied().unwrap();
        assert_eq!(extents.north_east(), Coordinate::new(3.0, 4.0));
        assert_eq!(extents.south_west(), Coordinate::new(0.0, 0.0));
        assert!(clusterer.last_build().unwrap().tracked_extents);

        // A second build with a wider marker set keeps the first extents.
        let mut wider = markers.clone();
        wider.push(RawMarker::at(8.0, 8.0));
        clusterer
            .rebuild(&wider, &viewport((10.0, 10.0), (0.0, 0.0), 7.0))
            .unwrap();

        assert_eq!(clusterer.cached_extents().copied(), Some(extents));
        assert!(!clusterer.last_build().unwrap().tracked_extents);
    }

    #[test]
    fn test_markers_beyond_cached_extents_are_not_clustered() {
        let mut clusterer = Clusterer::new();
        let vp = viewport((10.0, 10.0), (0.0, 0.0), 7.0);

        clusterer.rebuild(&[RawMarker::at(0.5, 0.5)], &vp).unwrap();

        let later = vec![RawMarker::at(0.5, 0.5), RawMarker::at(8.5, 8.5)];
        let output = clusterer.rebuild(&later, &vp).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(clusterer.last_index().unwrap().len(), 2);

        clusterer.reset_extents();
        let output = clusterer.rebuild(&later, &vp).unwrap();
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn test_grid_is_anchored_at_origin() {
        let markers = vec![RawMarker::at(3.5, 3.5), RawMarker::at(4.5, 4.5)];
        let mut clusterer = Clusterer::new();

        // 2° cells counted from 0 put the markers in [2,4] and [4,6].
        let output = clusterer
            .rebuild(&markers, &viewport((10.0, 10.0), (0.0, 0.0), 6.0))
            .unwrap();

        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|m| !m.is_cluster()));
        assert_eq!(clusterer.cached_extents().unwrap().min_latitude, 0.0);
    }

    #[test]
    fn test_markers_outside_viewport_are_rejected() {
        let markers = vec![
            RawMarker::at(0.5, 0.5),
            RawMarker::at(0.6, 0.6),
            RawMarker::at(20.0, 20.0),
        ];
        let mut clusterer = Clusterer::new();

        let output = clusterer
            .rebuild(&markers, &viewport((1.0, 1.0), (0.0, 0.0), 7.0))
            .unwrap();

        let report = clusterer.last_build().unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.output, 1);
        assert_eq!(output[0].cluster_count(), 2);

        // Extents still cover the rejected marker.
        let extents = clusterer.cached_extents().unwrap();
        assert_eq!(extents.max_latitude, 20.0);
    }

    #[test]
    fn test_rebuild_replaces_previous_index() {
        let mut clusterer = Clusterer::new();
        let vp = viewport((10.0, 10.0), (0.0, 0.0), 7.0);

        clusterer
            .rebuild(&[RawMarker::at(1.0, 1.0), RawMarker::at(2.0, 2.0)], &vp)
            .unwrap();
        assert_eq!(clusterer.last_index().unwrap().len(), 2);

        clusterer.rebuild(&[RawMarker::at(1.0, 1.0)], &vp).unwrap();
        assert_eq!(clusterer.last_index().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let mut clusterer: Clusterer<RawMarker> = Clusterer::new();

        let bad_corner = viewport((f64::NAN, 1.0), (0.0, 0.0), 3.0);
        assert!(matches!(
            clusterer.rebuild(&[], &bad_corner),
            Err(ClusterError::InvalidInput(_))
        ));

        let bad_zoom = viewport((1.0, 1.0), (0.0, 0.0), -2.0);
        assert!(matches!(
            clusterer.rebuild(&[], &bad_zoom),
            Err(ClusterError::InvalidZoom(_))
        ));
    }

    #[test]
    fn test_cancelled_before_build() {
        let mut clusterer = Clusterer::new();
        let token = CancellationToken::new();
        token.cancel();

        let result = clusterer.rebuild_with_cancel(
            &[RawMarker::at(1.0, 1.0)],
            &viewport((2.0, 2.0), (0.0, 0.0), 5.0),
            &token,
        );
        assert!(matches!(result, Err(ClusterError::Cancelled)));
        assert!(clusterer.cached_extents().is_none());
    }

    #[test]
    fn test_with_config_validates() {
        let mut config = ClusterConfig::default();
        config.node_capacity = 0;
        assert!(Clusterer::<RawMarker>::with_config(config).is_err());

        let clusterer =
            Clusterer::<RawMarker>::with_config(ClusterConfig::default().with_node_capacity(4))
                .unwrap();
        assert_eq!(clusterer.config().node_capacity, 4);
    }
}
