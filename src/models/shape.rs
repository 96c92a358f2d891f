//! Boundary shapes: pointers, geometries and sampling bounds.

use geo::BoundingRect;
use geo_types::{coord, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::address::number_text;

/// Kind of boundary shape known to the `/search` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// US state (TIGER `state`)
    State,
    /// County or county equivalent
    County,
    /// County subdivision
    Cousub,
    /// Census-designated or incorporated place
    Place,
    /// Census tract
    Tract,
    /// ZIP code tabulation area
    Zcta5,
}

impl ShapeKind {
    /// Wire name, as sent in `?kind=`
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::State => "state",
            ShapeKind::County => "county",
            ShapeKind::Cousub => "cousub",
            ShapeKind::Place => "place",
            ShapeKind::Tract => "tract",
            ShapeKind::Zcta5 => "zcta5",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::State,
            ShapeKind::County,
            ShapeKind::Cousub,
            ShapeKind::Place,
            ShapeKind::Tract,
            ShapeKind::Zcta5,
        ]
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shape kind '{}'", s))
    }
}

/// Reference to a shape, without a geometry included.
///
/// Cheap to pass around; the geometry can be fetched on demand with
/// [`crate::api::ApiClient::fetch_shape`]. `gid` is unique within a `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapePointer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    pub gid: i64,
    pub kind: ShapeKind,
}

impl ShapePointer {
    pub fn new(name: impl Into<String>, gid: i64, kind: ShapeKind) -> Self {
        Self {
            name: name.into(),
            secondary: None,
            gid,
            kind,
        }
    }
}

/// GeoJSON position: longitude, latitude, then any further ordinates.
///
/// Ordinates keep their JSON number form, so integer and float values
/// serialize back the way they were received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Number>", into = "Vec<Number>")]
pub struct Position(Vec<Number>);

impl Position {
    /// `None` when an ordinate is not finite.
    pub fn new(x: f64, y: f64) -> Option<Self> {
        Some(Position(vec![Number::from_f64(x)?, Number::from_f64(y)?]))
    }

    pub fn x(&self) -> f64 {
        self.0[0].as_f64().unwrap_or(f64::NAN)
    }

    pub fn y(&self) -> f64 {
        self.0[1].as_f64().unwrap_or(f64::NAN)
    }

    /// Ordinate `index` as text, integral values without a fraction.
    pub fn ordinate_text(&self, index: usize) -> Option<String> {
        self.0.get(index).map(number_text)
    }

    pub fn ordinates(&self) -> &[Number] {
        &self.0
    }
}

impl TryFrom<Vec<Number>> for Position {
    type Error = String;

    fn try_from(ordinates: Vec<Number>) -> Result<Self, Self::Error> {
        if ordinates.len() < 2 {
            return Err(format!(
                "position needs at least 2 ordinates, got {}",
                ordinates.len()
            ));
        }
        Ok(Position(ordinates))
    }
}

impl From<Position> for Vec<Number> {
    fn from(position: Position) -> Self {
        position.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MultiPolygonTag {
    MultiPolygon,
}

/// GeoJSON MultiPolygon geometry.
///
/// Kept as received: extra ordinates and foreign members such as `bbox`
/// are carried through unchanged. Only [`MultiPolygonGeometry::bounding_rect`]
/// looks at the coordinates as planar geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygonGeometry {
    #[serde(rename = "type")]
    geometry_type: MultiPolygonTag,
    pub coordinates: Vec<Vec<Vec<Position>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MultiPolygonGeometry {
    pub fn new(coordinates: Vec<Vec<Vec<Position>>>) -> Self {
        Self {
            geometry_type: MultiPolygonTag::MultiPolygon,
            coordinates,
            extra: Map::new(),
        }
    }

    /// Extent of the geometry, `None` when it has no positions.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        MultiPolygon::from(self).bounding_rect()
    }
}

impl From<&MultiPolygonGeometry> for MultiPolygon<f64> {
    fn from(geom: &MultiPolygonGeometry) -> Self {
        let polygons = geom
            .coordinates
            .iter()
            .filter(|rings| !rings.is_empty())
            .map(|rings| {
                let mut rings = rings.iter().map(|ring| {
                    LineString::new(ring.iter().map(|p| coord! { x: p.x(), y: p.y() }).collect())
                });
                // Non-empty checked above
                let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
                Polygon::new(exterior, rings.collect())
            })
            .collect::<Vec<_>>();
        MultiPolygon::new(polygons)
    }
}

/// Any GeoJSON geometry accepted as custom sampling bounds.
///
/// The sample endpoint only accepts MultiPolygons, so a bare Polygon is
/// promoted. Foreign members are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundsGeometry {
    Polygon {
        coordinates: Vec<Vec<Position>>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl From<BoundsGeometry> for MultiPolygonGeometry {
    fn from(geom: BoundsGeometry) -> Self {
        let (coordinates, extra) = match geom {
            BoundsGeometry::Polygon { coordinates, extra } => (vec![coordinates], extra),
            BoundsGeometry::MultiPolygon { coordinates, extra } => (coordinates, extra),
        };
        MultiPolygonGeometry {
            extra,
            ..MultiPolygonGeometry::new(coordinates)
        }
    }
}

/// Feature with shape geometry and identifying information.
///
/// Only built by attaching a fetched geometry to an existing pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    feature_type: FeatureTag,
    pub geometry: MultiPolygonGeometry,
    pub properties: ShapePointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    Feature,
}

impl Shape {
    pub fn new(pointer: ShapePointer, geometry: MultiPolygonGeometry) -> Self {
        Self {
            feature_type: FeatureTag::Feature,
            geometry,
            properties: pointer,
        }
    }

    pub fn pointer(&self) -> &ShapePointer {
        &self.properties
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }
}

/// Constraint for drawing a sample: a stored shape or arbitrary geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Bounds {
    Shape(ShapePointer),
    Custom(MultiPolygonGeometry),
}

impl From<ShapePointer> for Bounds {
    fn from(pointer: ShapePointer) -> Self {
        Bounds::Shape(pointer)
    }
}

impl From<MultiPolygonGeometry> for Bounds {
    fn from(geom: MultiPolygonGeometry) -> Self {
        Bounds::Custom(geom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> MultiPolygonGeometry {
        let ring = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
            .iter()
            .map(|[x, y]| Position::new(*x, *y).unwrap())
            .collect();
        MultiPolygonGeometry::new(vec![vec![ring]])
    }

    #[test]
    fn test_kind_round_trips_lowercase() {
        let json = serde_json::to_string(&ShapeKind::Zcta5).unwrap();
        assert_eq!(json, "\"zcta5\"");
        assert_eq!("County".parse::<ShapeKind>().unwrap(), ShapeKind::County);
        assert!("planet".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_pointer_without_secondary() {
        let pointer: ShapePointer =
            serde_json::from_str(r#"{"name":"Texas","gid":48,"kind":"state"}"#).unwrap();
        assert_eq!(pointer, ShapePointer::new("Texas", 48, ShapeKind::State));
        let back = serde_json::to_value(&pointer).unwrap();
        assert_eq!(
            back,
            serde_json::json!({"name": "Texas", "gid": 48, "kind": "state"})
        );
    }

    #[test]
    fn test_geometry_type_tag() {
        let value = serde_json::to_value(unit_square()).unwrap();
        assert_eq!(value["type"], "MultiPolygon");
        let err = serde_json::from_str::<MultiPolygonGeometry>(
            r#"{"type":"Point","coordinates":[1,2]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_bounding_rect() {
        let rect = unit_square().bounding_rect().unwrap();
        assert_eq!(rect.min(), coord! { x: 0.0, y: 0.0 });
        assert_eq!(rect.max(), coord! { x: 1.0, y: 1.0 });
        assert!(MultiPolygonGeometry::new(vec![]).bounding_rect().is_none());
    }

    #[test]
    fn test_polygon_promoted() {
        let geom: BoundsGeometry = serde_json::from_str(
            r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#,
        )
        .unwrap();
        let multi = MultiPolygonGeometry::from(geom);
        assert_eq!(multi.coordinates.len(), 1);
        assert_eq!(multi.coordinates[0][0].len(), 4);
    }

    #[test]
    fn test_geometry_kept_as_received() {
        let raw = serde_json::json!({
            "type": "MultiPolygon",
            "bbox": [0, 0, 1, 1],
            "coordinates": [[[[0, 0, 12.5], [1, 0, 12.5], [1, 1, 3], [0, 0, 12.5]]]]
        });
        let geom: MultiPolygonGeometry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(geom.extra["bbox"], serde_json::json!([0, 0, 1, 1]));
        assert_eq!(geom.coordinates[0][0][0].ordinates().len(), 3);
        assert_eq!(serde_json::to_value(&geom).unwrap(), raw);

        let rect = geom.bounding_rect().unwrap();
        assert_eq!(rect.max(), coord! { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_position_needs_two_ordinates() {
        assert!(serde_json::from_str::<Position>("[1.5]").is_err());
        assert!(serde_json::from_str::<Position>("[1.5, 2, 3, 4]").is_ok());
        assert!(Position::new(f64::NAN, 0.0).is_none());
        let p: Position = serde_json::from_str("[-97, 30.25]").unwrap();
        assert_eq!(p.ordinate_text(0).as_deref(), Some("-97"));
        assert_eq!(p.y(), 30.25);
    }

    #[test]
    fn test_bounds_polygon_with_altitude() {
        let geom: BoundsGeometry = serde_json::from_str(
            r#"{"type":"Polygon","bbox":[0,0,1,1],"coordinates":[[[0,0,5],[1,0,5],[1,1,5],[0,0,5]]]}"#,
        )
        .unwrap();
        let multi = MultiPolygonGeometry::from(geom);
        let value = serde_json::to_value(&multi).unwrap();
        assert_eq!(value["type"], "MultiPolygon");
        assert_eq!(value["bbox"], serde_json::json!([0, 0, 1, 1]));
        assert_eq!(value["coordinates"][0][0][1], serde_json::json!([1, 0, 5]));
    }

    #[test]
    fn test_shape_feature_layout() {
        let shape = Shape::new(ShapePointer::new("Texas", 48, ShapeKind::State), unit_square());
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["kind"], "state");
        assert_eq!(shape.name(), "Texas");
    }
}
