//! Hazard-area shape payload.
//!
//! The payload is GeoJSON and is otherwise opaque to this crate: it is
//! validated on the way in and kept verbatim so it round-trips unchanged.
//! Accepted shapes are a `Polygon` or `MultiPolygon` geometry, a
//! `GeometryCollection` of those, a `Feature` holding one, or a
//! `FeatureCollection` of such features.

use std::fmt;

use serde_json::Value;

/// Errors produced while validating a hazard-area payload.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("malformed geojson: {0}")]
    Malformed(String),

    #[error("geojson must be an object")]
    NotAnObject,

    #[error("geojson member missing: {0}")]
    MissingMember(&'static str),

    #[error("unsupported geojson type: {0}")]
    UnsupportedType(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("hazard area contains no polygons")]
    Empty,
}

/// A longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// Validated hazard-area payload.
#[derive(Debug, Clone)]
pub struct HazardArea {
    raw: Value,
    /// Outer ring of every polygon, in document order.
    rings: Vec<Vec<Position>>,
}

impl HazardArea {
    /// Validate `value` without any coercion.
    pub fn parse(value: Value) -> Result<Self, GeometryError> {
        Self::parse_with(value, false)
    }

    /// Validate `value`. With `accept_single_value_as_array`, a bare object
    /// where a list of features is expected is wrapped into a one-element list.
    pub fn parse_with(
        mut value: Value,
        accept_single_value_as_array: bool,
    ) -> Result<Self, GeometryError> {
        if accept_single_value_as_array {
            coerce_single_features(&mut value);
        }

        let mut rings = Vec::new();
        collect_rings(&value, &mut rings)?;
        if rings.is_empty() {
            return Err(GeometryError::Empty);
        }

        Ok(Self { raw: value, rings })
    }

    /// Parse and validate a GeoJSON document.
    pub fn from_json_str(json: &str) -> Result<Self, GeometryError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| GeometryError::Malformed(e.to_string()))?;
        Self::parse_with(value, true)
    }

    /// The payload exactly as it will be encoded.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Outer ring of every polygon in the payload.
    pub fn outer_rings(&self) -> &[Vec<Position>] {
        &self.rings
    }

    /// GeoJSON `type` of the top-level object.
    pub fn kind(&self) -> &str {
        self.raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

impl PartialEq for HazardArea {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl fmt::Display for HazardArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertices: usize = self.rings.iter().map(Vec::len).sum();
        write!(
            f,
            "{} ({} polygon(s), {} vertices)",
            self.kind(),
            self.rings.len(),
            vertices
        )
    }
}

fn coerce_single_features(value: &mut Value) {
    for key in ["features", "geometries"] {
        if let Some(list) = value.get_mut(key) {
            if list.is_object() {
                let single = list.take();
                *list = Value::Array(vec![single]);
            }
        }
    }
    if let Some(Value::Array(items)) = value.get_mut("features") {
        items.iter_mut().for_each(coerce_single_features);
    }
    if let Some(geometry) = value.get_mut("geometry") {
        coerce_single_features(geometry);
    }
}

fn member<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value, GeometryError> {
    value.get(name).ok_or(GeometryError::MissingMember(name))
}

fn collect_rings(value: &Value, rings: &mut Vec<Vec<Position>>) -> Result<(), GeometryError> {
    if !value.is_object() {
        return Err(GeometryError::NotAnObject);
    }
    let kind = member(value, "type")?
        .as_str()
        .ok_or(GeometryError::MissingMember("type"))?;

    match kind {
        "FeatureCollection" => {
            let features = member(value, "features")?
                .as_array()
                .ok_or_else(|| GeometryError::UnsupportedType("features must be a list".into()))?;
            for feature in features {
                collect_rings(feature, rings)?;
            }
            Ok(())
        }
        "GeometryCollection" => {
            let geometries = member(value, "geometries")?
                .as_array()
                .ok_or_else(|| GeometryError::UnsupportedType("geometries must be a list".into()))?;
            for geometry in geometries {
                collect_rings(geometry, rings)?;
            }
            Ok(())
        }
        "Feature" => {
            let geometry = member(value, "geometry")?;
            if geometry.is_null() {
                return Err(GeometryError::MissingMember("geometry"));
            }
            collect_rings(geometry, rings)
        }
        "Polygon" => {
            let coordinates = member(value, "coordinates")?;
            rings.push(parse_polygon(coordinates)?);
            Ok(())
        }
        "MultiPolygon" => {
            let polygons = member(value, "coordinates")?
                .as_array()
                .ok_or_else(|| GeometryError::InvalidCoordinates("expected list of polygons".into()))?;
            for polygon in polygons {
                rings.push(parse_polygon(polygon)?);
            }
            Ok(())
        }
        other => Err(GeometryError::UnsupportedType(other.to_string())),
    }
}

/// Validate every ring of a polygon and return its outer ring.
fn parse_polygon(coordinates: &Value) -> Result<Vec<Position>, GeometryError> {
    let ring_values = coordinates
        .as_array()
        .ok_or_else(|| GeometryError::InvalidCoordinates("expected list of rings".into()))?;

    let mut parsed = ring_values
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    parsed
        .next()
        .ok_or_else(|| GeometryError::InvalidCoordinates("polygon has no rings".into()))
}

fn parse_ring(ring: &Value) -> Result<Vec<Position>, GeometryError> {
    let points = ring
        .as_array()
        .ok_or_else(|| GeometryError::InvalidCoordinates("expected list of positions".into()))?;
    if points.len() < 3 {
        return Err(GeometryError::InvalidCoordinates(format!(
            "ring needs at least 3 positions, got {}",
            points.len()
        )));
    }
    points.iter().map(parse_position).collect()
}

fn parse_position(point: &Value) -> Result<Position, GeometryError> {
    let pair = point
        .as_array()
        .filter(|p| p.len() >= 2)
        .ok_or_else(|| GeometryError::InvalidCoordinates(format!("bad position: {}", point)))?;

    let lon = pair[0].as_f64().filter(|v| v.is_finite());
    let lat = pair[1].as_f64().filter(|v| v.is_finite());
    match (lon, lat) {
        (Some(lon), Some(lat)) if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) => {
            Ok(Position { lon, lat })
        }
        _ => Err(GeometryError::InvalidCoordinates(format!(
            "position out of range: {}",
            point
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Value {
        json!([[[4.0, 52.0], [5.0, 52.0], [5.0, 53.0], [4.0, 53.0], [4.0, 52.0]]])
    }

    #[test]
    fn test_feature_collection_with_polygon() {
        let area = HazardArea::parse(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": square()},
                "properties": {"selectionType": "box"}
            }]
        }))
        .expect("valid area");

        assert_eq!(area.kind(), "FeatureCollection");
        assert_eq!(area.outer_rings().len(), 1);
        assert_eq!(area.outer_rings()[0][1], Position { lon: 5.0, lat: 52.0 });
    }

    #[test]
    fn test_multipolygon_collects_every_outer_ring() {
        let area = HazardArea::parse(json!({
            "type": "MultiPolygon",
            "coordinates": [square(), square()]
        }))
        .expect("valid area");
        assert_eq!(area.outer_rings().len(), 2);
    }

    #[test]
    fn test_payload_kept_verbatim() {
        let value = json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": square()},
            "properties": {"prop0": "value0", "prop1": {"this": "that"}}
        });
        let area = HazardArea::parse(value.clone()).expect("valid area");
        assert_eq!(area.as_value(), &value);
    }

    #[test]
    fn test_key_order_survives_reencoding() {
        let json = r#"{"type":"Polygon","coordinates":[[[4.0,52.0],[5.0,52.0],[5.0,53.0]]]}"#;
        let area = HazardArea::from_json_str(json).expect("valid area");
        assert_eq!(area.as_value().to_string(), json);
    }

    #[test]
    fn test_single_feature_coerced_to_list() {
        let value = json!({
            "type": "FeatureCollection",
            "features": {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": square()}}
        });

        assert!(HazardArea::parse(value.clone()).is_err());

        let area = HazardArea::parse_with(value, true).expect("coerced");
        assert!(area.as_value()["features"].is_array());
        assert_eq!(area.outer_rings().len(), 1);
    }

    #[test]
    fn test_single_geometry_in_collection_coerced() {
        let value = json!({
            "type": "Feature",
            "geometry": {
                "type": "GeometryCollection",
                "geometries": {"type": "Polygon", "coordinates": square()}
            }
        });
        let area = HazardArea::parse_with(value, true).expect("coerced");
        assert!(area.as_value()["geometry"]["geometries"].is_array());
        assert_eq!(area.outer_rings().len(), 1);
    }

    #[test]
    fn test_point_geometry_rejected() {
        let err = HazardArea::parse(json!({"type": "Point", "coordinates": [4.0, 52.0]})).unwrap_err();
        assert_eq!(err, GeometryError::UnsupportedType("Point".to_string()));
    }

    #[test]
    fn test_empty_collection_rejected() {
        let err = HazardArea::parse(json!({"type": "FeatureCollection", "features": []})).unwrap_err();
        assert_eq!(err, GeometryError::Empty);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let err = HazardArea::parse(json!({
            "type": "Polygon",
            "coordinates": [[[4.0, 95.0], [5.0, 52.0], [5.0, 53.0]]]
        }))
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidCoordinates(_)));
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let err = HazardArea::parse(json!({
            "type": "Polygon",
            "coordinates": [[[4.0, 52.0], [5.0, 52.0]]]
        }))
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidCoordinates(_)));
    }
}
