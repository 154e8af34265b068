use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Latitude maps to the `y` axis and longitude to the `x` axis when
/// converting to and from `geo::Point`.
///
/// # Examples
///
/// ```
/// use quadcluster_types::coordinate::Coordinate;
/// use geo::Point;
///
/// let nyc = Coordinate::new(40.7128, -74.0060);
/// let point: Point = nyc.into();
/// assert_eq!(point.x(), -74.0060);
/// assert_eq!(point.y(), 40.7128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Arithmetic mean of a set of coordinates, or `None` for an empty set.
    ///
    /// ```
    /// use quadcluster_types::coordinate::Coordinate;
    ///
    /// let mean = Coordinate::mean([
    ///     Coordinate::new(0.0, 0.0),
    ///     Coordinate::new(2.0, 4.0),
    /// ])
    /// .unwrap();
    /// assert_eq!(mean, Coordinate::new(1.0, 2.0));
    /// ```
    pub fn mean<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut count = 0usize;
        let mut total_latitude = 0.0;
        let mut total_longitude = 0.0;

        for coordinate in coordinates {
            total_latitude += coordinate.latitude;
            total_longitude += coordinate.longitude;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self::new(
            total_latitude / count as f64,
            total_longitude / count as f64,
        ))
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    /// Builds a coordinate from a `(latitude, longitude)` tuple.
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}
