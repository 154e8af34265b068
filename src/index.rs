//! Region quadtree over markers.
//!
//! Each node keeps up to `capacity` markers in insertion order. When a full
//! node receives another marker it splits its box into four quadrants once and
//! routes that marker, and every later one, to the first quadrant containing
//! it (north-west, north-east, south-west, south-east). Markers already held
//! by the node stay where they are.
//!
//! The tree is built once per cluster pass and thrown away afterwards; there
//! is no removal.

use crate::marker::Marker;
use quadcluster_types::bbox::BoundingBox;
use quadcluster_types::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// Markers a node holds before it subdivides.
pub const DEFAULT_NODE_CAPACITY: usize = 25;

/// Running minimum/maximum latitude and longitude of observed coordinates.
///
/// Extents start collapsed on the origin `(0, 0)` and only ever widen, so the
/// window they describe always contains the origin as well as every observed
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    /// Number of coordinates folded in so far
    pub observed: usize,
}

impl Extents {
    pub const fn origin() -> Self {
        Self {
            min_latitude: 0.0,
            max_latitude: 0.0,
            min_longitude: 0.0,
            max_longitude: 0.0,
            observed: 0,
        }
    }

    /// True until a coordinate has been folded in.
    pub fn is_empty(&self) -> bool {
        self.observed == 0
    }

    /// Widen the extents to cover `coordinate`. Non-finite coordinates are ignored.
    pub fn include(&mut self, coordinate: &Coordinate) {
        if !coordinate.is_finite() {
            log::warn!(
                "Ignoring non-finite coordinate ({}, {}) for extents",
                coordinate.latitude,
                coordinate.longitude
            );
            return;
        }

        self.min_latitude = self.min_latitude.min(coordinate.latitude);
        self.max_latitude = self.max_latitude.max(coordinate.latitude);
        self.min_longitude = self.min_longitude.min(coordinate.longitude);
        self.max_longitude = self.max_longitude.max(coordinate.longitude);
        self.observed += 1;
    }

    /// `(max_latitude, max_longitude)`
    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(self.max_latitude, self.max_longitude)
    }

    /// `(min_latitude, min_longitude)`
    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(self.min_latitude, self.min_longitude)
    }

    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::from_corners(self.north_east(), self.south_west())
    }
}

impl Default for Extents {
    fn default() -> Self {
        Self::origin()
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub nodes: usize,
    pub markers: usize,
    /// Depth of the deepest node; the root is depth 0
    pub max_depth: usize,
}

/// One quadtree node.
#[derive(Debug)]
pub struct Node<M> {
    bounds: BoundingBox,
    markers: Vec<M>,
    /// Either no children or all four, ordered NW, NE, SW, SE
    children: Option<Box<[Node<M>; 4]>>,
}

impl<M> Node<M> {
    fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            markers: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Markers held by this node itself, in insertion order.
    pub fn markers(&self) -> &[M] {
        &self.markers
    }

    /// The four quadrants `[north_west, north_east, south_west, south_east]` once subdivided.
    pub fn children(&self) -> Option<&[Node<M>; 4]> {
        self.children.as_deref()
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }
}

// Stacked markers can chain nodes thousands of levels deep, so subtrees are
// released from a heap worklist instead of by recursion.
impl<M> Drop for Node<M> {
    fn drop(&mut self) {
        let mut pending: Vec<Box<[Node<M>; 4]>> = self.children.take().into_iter().collect();

        while let Some(mut children) = pending.pop() {
            pending.extend(children.iter_mut().filter_map(|child| child.children.take()));
        }
    }
}

impl<M: Marker> Node<M> {
    /// Insert below this node, handing the marker back if no node accepts it.
    fn insert(&mut self, marker: M, capacity: usize) -> Result<(), M> {
        let coordinate = marker.coordinate();
        if !self.bounds.contains(&coordinate) {
            return Err(marker);
        }

        let mut node = self;
        loop {
            if node.markers.len() < capacity {
                node.markers.push(marker);
                return Ok(());
            }

            let bounds = node.bounds;
            let children = node
                .children
                .get_or_insert_with(|| Box::new(bounds.quadrants().map(Node::new)));

            // Quadrants cover the parent, so this only misses for coordinates the
            // parent box rejects under rounding.
            match children
                .iter_mut()
                .find(|child| child.bounds.contains(&coordinate))
            {
                Some(child) => node = child,
                None => return Err(marker),
            }
        }
    }
}

/// A region quadtree of markers plus the extents observed while filling it.
///
/// # Examples
///
/// ```
/// use quadcluster::{BoundingBox, QuadTree, RawMarker};
///
/// let bounds = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
/// let mut tree = QuadTree::new(bounds);
///
/// assert!(tree.insert(RawMarker::at(40.7128, -74.0060), true));
/// assert!(tree.insert(RawMarker::at(51.5074, -0.1278), true));
///
/// let europe = BoundingBox::new(-10.0, 35.0, 30.0, 60.0);
/// let found = tree.query_region(&bounds, &europe);
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug)]
pub struct QuadTree<M> {
    root: Node<M>,
    capacity: usize,
    len: usize,
    extents: Extents,
}

impl<M: Marker> QuadTree<M> {
    /// Create an empty tree with [`DEFAULT_NODE_CAPACITY`].
    pub fn new(bounds: BoundingBox) -> Self {
        Self::with_capacity(bounds, DEFAULT_NODE_CAPACITY)
    }

    /// Create an empty tree whose nodes subdivide past `capacity` markers.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. [`ClusterConfig::validate`] rejects such
    /// a capacity before any tree is built from a configuration.
    ///
    /// [`ClusterConfig::validate`]: crate::config::ClusterConfig::validate
    pub fn with_capacity(bounds: BoundingBox, capacity: usize) -> Self {
        assert!(capacity > 0, "Node capacity must be greater than zero");

        Self {
            root: Node::new(bounds),
            capacity,
            len: 0,
            extents: Extents::origin(),
        }
    }

    /// Insert a marker.
    ///
    /// With `track_extents` the marker's coordinate is folded into
    /// [`QuadTree::extents`] first, whether or not the tree accepts it.
    ///
    /// Returns `false` when the coordinate lies outside the root box; the tree
    /// is left unchanged in that case.
    pub fn insert(&mut self, marker: M, track_extents: bool) -> bool {
        if track_extents {
            self.extents.include(&marker.coordinate());
        }

        match self.root.insert(marker, self.capacity) {
            Ok(()) => {
                self.len += 1;
                true
            }
            Err(rejected) => {
                let coordinate = rejected.coordinate();
                log::trace!(
                    "Marker at ({}, {}) lies outside index bounds",
                    coordinate.latitude,
                    coordinate.longitude
                );
                false
            }
        }
    }

    /// Insert every marker, returning how many were accepted.
    pub fn extend<I>(&mut self, markers: I, track_extents: bool) -> usize
    where
        I: IntoIterator<Item = M>,
    {
        markers
            .into_iter()
            .map(|marker| self.insert(marker, track_extents))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Collect markers inside `region` from every node whose box meets `view`.
    ///
    /// `region` decides which markers match. Subtrees whose box misses `view`
    /// are skipped; so are those missing `region`, which cannot hold a match
    /// since every marker lies inside its node's box. Results list a node's own
    /// markers before those of its children, children taken in NW, NE, SW, SE
    /// order.
    pub fn query_region(&self, view: &BoundingBox, region: &BoundingBox) -> Vec<&M> {
        let mut found = Vec::new();
        self.visit_region(view, region, |marker| found.push(marker));
        found
    }

    /// Like [`QuadTree::query_region`] but streams matches into `visit`.
    pub fn visit_region<'a, F>(&'a self, view: &BoundingBox, region: &BoundingBox, mut visit: F)
    where
        F: FnMut(&'a M),
    {
        let mut stack = vec![&self.root];

        while let Some(node) = stack.pop() {
            if !node.bounds.intersects(view) || !node.bounds.intersects(region) {
                continue;
            }

            node.markers
                .iter()
                .filter(|marker| region.contains(&marker.coordinate()))
                .for_each(&mut visit);

            if let Some(children) = &node.children {
                stack.extend(children.iter().rev());
            }
        }
    }

    /// Number of markers accepted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.root.bounds
    }

    pub fn root(&self) -> &Node<M> {
        &self.root
    }

    /// Extents of every coordinate inserted with tracking enabled.
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Iterate over all markers, node by node.
    pub fn iter(&self) -> impl Iterator<Item = &M> + '_ {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev());
            }
            Some(node.markers.iter())
        })
        .flatten()
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::default();
        let mut stack = vec![(&self.root, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.markers += node.markers.len();
            stats.max_depth = stats.max_depth.max(depth);

            if let Some(children) = &node.children {
                stack.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }

        stats
    }
}
