use crate::coordinate::Coordinate;
use geo::Rect;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in longitude/latitude space.
///
/// The box spans `(x0, y0)` to `(xf, yf)`, i.e. `(min_long, min_lat)` to
/// `(max_long, max_lat)`. It wraps `geo::Rect`, which keeps the minimum
/// corner below the maximum corner on both axes no matter how it was built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

impl BoundingBox {
    /// Create a bounding box from its four edges.
    ///
    /// # Arguments
    ///
    /// * `x0` - Minimum longitude
    /// * `y0` - Minimum latitude
    /// * `xf` - Maximum longitude
    /// * `yf` - Maximum latitude
    ///
    /// # Examples
    ///
    /// ```
    /// use quadcluster_types::bbox::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(-74.0, 40.7, -73.9, 40.8);
    /// assert_eq!(bbox.x0(), -74.0);
    /// assert_eq!(bbox.yf(), 40.8);
    /// ```
    pub fn new(x0: f64, y0: f64, xf: f64, yf: f64) -> Self {
        Self {
            rect: Rect::new(geo::coord! { x: x0, y: y0 }, geo::coord! { x: xf, y: yf }),
        }
    }

    /// Build the box spanned by a north-east and a south-west corner.
    ///
    /// ```
    /// use quadcluster_types::bbox::BoundingBox;
    /// use quadcluster_types::coordinate::Coordinate;
    ///
    /// let bbox = BoundingBox::from_corners(Coordinate::new(1.0, 2.0), Coordinate::new(-1.0, -2.0));
    /// assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 2.0, 1.0));
    /// ```
    pub fn from_corners(north_east: Coordinate, south_west: Coordinate) -> Self {
        Self::new(
            south_west.longitude,
            south_west.latitude,
            north_east.longitude,
            north_east.latitude,
        )
    }

    /// Create a bounding box from a `geo::Rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    /// Minimum longitude.
    pub fn x0(&self) -> f64 {
        self.rect.min().x
    }

    /// Minimum latitude.
    pub fn y0(&self) -> f64 {
        self.rect.min().y
    }

    /// Maximum longitude.
    pub fn xf(&self) -> f64 {
        self.rect.max().x
    }

    /// Maximum latitude.
    pub fn yf(&self) -> f64 {
        self.rect.max().y
    }

    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(self.yf(), self.xf())
    }

    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(self.y0(), self.x0())
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new((self.y0() + self.yf()) / 2.0, (self.x0() + self.xf()) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.xf() - self.x0()
    }

    pub fn height(&self) -> f64 {
        self.yf() - self.y0()
    }

    /// Returns true when all four edges are finite.
    pub fn is_finite(&self) -> bool {
        [self.x0(), self.y0(), self.xf(), self.yf()]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Check whether a coordinate lies in the box. All four edges are inclusive,
    /// so a point on an edge shared by two boxes is contained in both.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.x0() <= coordinate.longitude
            && coordinate.longitude <= self.xf()
            && self.y0() <= coordinate.latitude
            && coordinate.latitude <= self.yf()
    }

    /// Check if this box overlaps another. Touching edges count as overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0() <= other.xf()
            && self.xf() >= other.x0()
            && self.y0() <= other.yf()
            && self.yf() >= other.y0()
    }

    /// Split the box at its midpoint into `[north_west, north_east, south_west, south_east]`.
    ///
    /// Neighbouring quadrants share their midpoint edges.
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let mid = self.center();
        let (mid_x, mid_y) = (mid.longitude, mid.latitude);

        [
            Self::new(self.x0(), mid_y, mid_x, self.yf()),
            Self::new(mid_x, mid_y, self.xf(), self.yf()),
            Self::new(self.x0(), self.y0(), mid_x, mid_y),
            Self::new(mid_x, self.y0(), self.xf(), mid_y),
        ]
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}
