//! GeoJSON export of cluster output.

use crate::error::Result;
use crate::marker::{DisplayMarker, Marker};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Convert one pass's output into a `FeatureCollection` of points.
///
/// Each feature carries `title`, `count`, `cluster` and `identity` properties.
pub fn to_feature_collection<M: Marker>(markers: &[DisplayMarker<M>]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: markers.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

pub fn to_feature<M: Marker>(marker: &DisplayMarker<M>) -> Feature {
    let coordinate = marker.coordinate();
    let title = if marker.is_cluster() {
        marker.cluster_title()
    } else {
        marker.title()
    };

    let mut properties = JsonObject::new();
    properties.insert("title".to_string(), title.into());
    properties.insert("count".to_string(), marker.cluster_count().into());
    properties.insert("cluster".to_string(), marker.is_cluster().into());
    properties.insert("identity".to_string(), marker.identity().to_string().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            coordinate.longitude,
            coordinate.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Serialize one pass's output as a GeoJSON string.
pub fn to_geojson_string<M: Marker>(markers: &[DisplayMarker<M>]) -> Result<String> {
    Ok(serde_json::to_string(&to_feature_collection(markers))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{ClusterMarker, RawMarker};
    use quadcluster_types::coordinate::Coordinate;

    #[test]
    fn test_feature_collection() {
        let markers: Vec<DisplayMarker<RawMarker>> = vec![
            DisplayMarker::Single(RawMarker::at(40.7, -74.0).with_title("nyc")),
            DisplayMarker::Cluster(ClusterMarker::new(
                Coordinate::new(51.5, -0.1),
                12,
                "Marker Count: 12".to_string(),
            )),
        ];

        let collection = to_feature_collection(&markers);
        assert_eq!(collection.features.len(), 2);

        let nyc = &collection.features[0];
        assert_eq!(
            nyc.geometry.as_ref().map(|g| g.value.clone()),
            Some(Value::Point(vec![-74.0, 40.7]))
        );
        let properties = nyc.properties.as_ref().unwrap();
        assert_eq!(properties["title"], "nyc");
        assert_eq!(properties["count"], 0);
        assert_eq!(properties["cluster"], false);

        let london = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(london["title"], "Marker Count: 12");
        assert_eq!(london["count"], 12);
    }

    #[test]
    fn test_geojson_string_parses() {
        let markers = vec![DisplayMarker::Single(RawMarker::at(1.0, 2.0))];
        let json = to_geojson_string(&markers).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"][0]["geometry"]["coordinates"][0], 2.0);
    }
}
