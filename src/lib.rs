//! Zoom-aware clustering of map markers backed by a region quadtree.
//!
//! ```rust
//! use quadcluster::{Clusterer, Coordinate, RawMarker, Viewport};
//!
//! let markers = vec![
//!     RawMarker::at(40.7128, -74.0060).with_title("New York"),
//!     RawMarker::at(40.7306, -73.9352).with_title("Brooklyn"),
//!     RawMarker::at(42.3601, -71.0589).with_title("Boston"),
//! ];
//! let viewport = Viewport::new(
//!     Coordinate::new(45.0, -70.0),
//!     Coordinate::new(38.0, -76.0),
//!     6.0,
//! );
//!
//! let mut clusterer = Clusterer::new();
//! let displayed = clusterer.rebuild(&markers, &viewport)?;
//!
//! // New York and Brooklyn share a 2° cell, Boston sits alone.
//! assert_eq!(displayed.len(), 2);
//! assert_eq!(displayed.iter().filter(|m| m.is_cluster()).count(), 1);
//! # Ok::<(), quadcluster::ClusterError>(())
//! ```

pub mod builder;
pub mod cluster;
pub mod clusterer;
pub mod config;
pub mod error;
pub mod index;
pub mod marker;
pub mod pipeline;
pub mod render;

#[cfg(feature = "geojson")]
pub mod export;

pub use builder::ClustererBuilder;
pub use cluster::{ClusterEngine, ScanGrid};
pub use clusterer::{BuildReport, Clusterer, Viewport};
pub use config::ClusterConfig;
pub use error::{ClusterError, Result};
pub use index::{DEFAULT_NODE_CAPACITY, Extents, IndexStats, Node, QuadTree};
pub use marker::{ClusterMarker, DisplayMarker, Marker, MarkerId, RawMarker};
pub use pipeline::{CancellationToken, ClusterPipeline, PendingPass};
pub use render::{DisplayState, IconTier, MarkerAppearance, MarkerDiff, MarkerRenderer};

pub use geo::{Point, Rect};

pub use quadcluster_types::bbox::BoundingBox;
pub use quadcluster_types::colour::Colour;
pub use quadcluster_types::coordinate::Coordinate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterError, ClustererBuilder, Result};

    pub use crate::{BoundingBox, Colour, Coordinate};

    pub use crate::{ClusterConfig, ClusterEngine, Clusterer, Viewport};

    pub use crate::{ClusterMarker, DisplayMarker, Marker, RawMarker};

    pub use crate::{QuadTree, DEFAULT_NODE_CAPACITY};

    pub use crate::{CancellationToken, ClusterPipeline, DisplayState, MarkerRenderer};
}
