//! Marker capability set and its concrete variants.
//!
//! The index and the cluster engine only ever talk to markers through the
//! [`Marker`] trait. Two variants ship with the crate: [`RawMarker`] for
//! user-supplied points and [`ClusterMarker`] for the centroids the engine
//! synthesizes. [`DisplayMarker`] is what a cluster pass hands to a renderer.

use quadcluster_types::colour::Colour;
use quadcluster_types::coordinate::Coordinate;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;

/// Decimal places used when deriving a [`MarkerId`] from a coordinate.
pub const DEFAULT_IDENTITY_PRECISION: usize = 6;

/// Identity of a displayed marker.
///
/// Two markers share an id exactly when their coordinates print the same at
/// [`DEFAULT_IDENTITY_PRECISION`] decimal places. Distinct markers stacked on
/// one coordinate are therefore the same marker as far as display diffing is
/// concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

impl MarkerId {
    pub fn from_coordinate(coordinate: &Coordinate) -> Self {
        Self::with_precision(coordinate, DEFAULT_IDENTITY_PRECISION)
    }

    /// Hash `"{lat} {long}"` formatted to `precision` decimal places.
    pub fn with_precision(coordinate: &Coordinate, precision: usize) -> Self {
        let text = format!(
            "{:.*} {:.*}",
            precision, coordinate.latitude, precision, coordinate.longitude
        );
        let mut hasher = FxHasher::default();
        hasher.write(text.as_bytes());
        Self(hasher.finish())
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// The capability set every indexed or displayed marker provides.
pub trait Marker {
    fn coordinate(&self) -> Coordinate;
    fn set_coordinate(&mut self, coordinate: Coordinate);

    fn title(&self) -> &str;
    fn set_title(&mut self, title: String);

    fn colour(&self) -> Colour;
    fn set_colour(&mut self, colour: Colour);

    fn cluster_title(&self) -> &str;
    fn set_cluster_title(&mut self, title: String);

    fn cluster_colour(&self) -> Colour;
    fn set_cluster_colour(&mut self, colour: Colour);

    /// Number of markers this one stands for; 0 for a raw marker.
    fn cluster_count(&self) -> usize;
    fn set_cluster_count(&mut self, count: usize);

    fn identity(&self) -> MarkerId {
        MarkerId::from_coordinate(&self.coordinate())
    }

    fn is_same_marker(&self, other: &dyn Marker) -> bool {
        self.identity() == other.identity()
    }
}

/// A user-supplied marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarker {
    pub coordinate: Coordinate,
    pub title: String,
    pub colour: Colour,
    pub cluster_title: String,
    pub cluster_colour: Colour,
    pub cluster_count: usize,
}

impl RawMarker {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            title: String::new(),
            colour: Colour::RED,
            cluster_title: String::new(),
            cluster_colour: Colour::PURPLE,
            cluster_count: 0,
        }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(Coordinate::new(latitude, longitude))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }
}

impl Marker for RawMarker {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate;
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn colour(&self) -> Colour {
        self.colour
    }

    fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    fn cluster_title(&self) -> &str {
        &self.cluster_title
    }

    fn set_cluster_title(&mut self, title: String) {
        self.cluster_title = title;
    }

    fn cluster_colour(&self) -> Colour {
        self.cluster_colour
    }

    fn set_cluster_colour(&mut self, colour: Colour) {
        self.cluster_colour = colour;
    }

    fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    fn set_cluster_count(&mut self, count: usize) {
        self.cluster_count = count;
    }
}

/// A marker synthesized by the engine for a grid cell holding two or more markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMarker {
    pub coordinate: Coordinate,
    pub title: String,
    pub colour: Colour,
    pub cluster_title: String,
    pub cluster_colour: Colour,
    pub count: usize,
}

impl ClusterMarker {
    /// Create a cluster of `count` markers centred on `centroid`.
    pub fn new(centroid: Coordinate, count: usize, cluster_title: String) -> Self {
        Self {
            coordinate: centroid,
            title: String::new(),
            colour: Colour::RED,
            cluster_title,
            cluster_colour: Colour::PURPLE,
            count,
        }
    }
}

impl Marker for ClusterMarker {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate;
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn colour(&self) -> Colour {
        self.colour
    }

    fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    fn cluster_title(&self) -> &str {
        &self.cluster_title
    }

    fn set_cluster_title(&mut self, title: String) {
        self.cluster_title = title;
    }

    fn cluster_colour(&self) -> Colour {
        self.cluster_colour
    }

    fn set_cluster_colour(&mut self, colour: Colour) {
        self.cluster_colour = colour;
    }

    fn cluster_count(&self) -> usize {
        self.count
    }

    fn set_cluster_count(&mut self, count: usize) {
        self.count = count;
    }
}

/// One entry of a cluster pass's output.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayMarker<M> {
    /// A cell that matched exactly one marker passes it through unchanged.
    Single(M),
    Cluster(ClusterMarker),
}

impl<M: Marker> DisplayMarker<M> {
    pub fn is_cluster(&self) -> bool {
        matches!(self, DisplayMarker::Cluster(_))
    }

    pub fn as_single(&self) -> Option<&M> {
        match self {
            DisplayMarker::Single(marker) => Some(marker),
            DisplayMarker::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterMarker> {
        match self {
            DisplayMarker::Single(_) => None,
            DisplayMarker::Cluster(cluster) => Some(cluster),
        }
    }

    fn inner(&self) -> &dyn Marker {
        match self {
            DisplayMarker::Single(marker) => marker,
            DisplayMarker::Cluster(cluster) => cluster,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Marker {
        match self {
            DisplayMarker::Single(marker) => marker,
            DisplayMarker::Cluster(cluster) => cluster,
        }
    }
}

impl<M: Marker> Marker for DisplayMarker<M> {
    fn coordinate(&self) -> Coordinate {
        self.inner().coordinate()
    }

    fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.inner_mut().set_coordinate(coordinate);
    }

    fn title(&self) -> &str {
        self.inner().title()
    }

    fn set_title(&mut self, title: String) {
        self.inner_mut().set_title(title);
    }

    fn colour(&self) -> Colour {
        self.inner().colour()
    }

    fn set_colour(&mut self, colour: Colour) {
        self.inner_mut().set_colour(colour);
    }

    fn cluster_title(&self) -> &str {
        self.inner().cluster_title()
    }

    fn set_cluster_title(&mut self, title: String) {
        self.inner_mut().set_cluster_title(title);
    }

    fn cluster_colour(&self) -> Colour {
        self.inner().cluster_colour()
    }

    fn set_cluster_colour(&mut self, colour: Colour) {
        self.inner_mut().set_cluster_colour(colour);
    }

    fn cluster_count(&self) -> usize {
        self.inner().cluster_count()
    }

    fn set_cluster_count(&mut self, count: usize) {
        self.inner_mut().set_cluster_count(count);
    }

    // Wrapped markers may override identity.
    fn identity(&self) -> MarkerId {
        self.inner().identity()
    }
}
