//! # quadcluster-types
//!
//! Value types shared by the quadcluster index and cluster engine:
//!
//! - **`Coordinate`**: a latitude/longitude pair in degrees
//! - **`BoundingBox`**: an axis-aligned longitude/latitude rectangle
//! - **`Colour`**: an RGBA display colour carried by markers
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's primitives.
//!
//! ## Examples
//!
//! ```rust
//! use quadcluster_types::bbox::BoundingBox;
//! use quadcluster_types::coordinate::Coordinate;
//!
//! let viewport = BoundingBox::from_corners(
//!     Coordinate::new(40.8, -73.9),
//!     Coordinate::new(40.7, -74.0),
//! );
//! assert!(viewport.contains(&Coordinate::new(40.75, -73.95)));
//! ```

pub mod bbox;
pub mod colour;
pub mod coordinate;
