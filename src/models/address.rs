//! Sampled address points.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::shape::Position;

/// Building type codes attached to addresses by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    /// Mixed use
    X,
    /// Residential
    R,
    /// Business
    B,
}

impl BuildingType {
    /// Human label for the code
    pub fn label(&self, short: bool) -> &'static str {
        match (self, short) {
            (BuildingType::R, false) => "Residential",
            (BuildingType::R, true) => "Res.",
            (BuildingType::B, false) => "Business",
            (BuildingType::B, true) => "Bus.",
            (BuildingType::X, false) => "Mixed Use",
            (BuildingType::X, true) => "Mixed",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BuildingType::X => "X",
            BuildingType::R => "R",
            BuildingType::B => "B",
        }
    }
}

impl std::str::FromStr for BuildingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(BuildingType::X),
            "R" => Ok(BuildingType::R),
            "B" => Ok(BuildingType::B),
            other => Err(format!("unknown building type '{}'", other)),
        }
    }
}

/// Whether a requested sample size is a count or a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSizeUnit {
    #[default]
    Total,
    Pct,
}

impl std::str::FromStr for SampleSizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(SampleSizeUnit::Total),
            "pct" => Ok(SampleSizeUnit::Pct),
            other => Err(format!("unknown unit {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PointTag {
    Point,
}

/// GeoJSON point. Extra ordinates and foreign members are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    geometry_type: PointTag,
    pub coordinates: Position,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PointGeometry {
    /// `None` when a coordinate is not finite.
    pub fn new(longitude: f64, latitude: f64) -> Option<Self> {
        Some(Self::from(Position::new(longitude, latitude)?))
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }
}

impl From<Position> for PointGeometry {
    fn from(coordinates: Position) -> Self {
        Self {
            geometry_type: PointTag::Point,
            coordinates,
            extra: Map::new(),
        }
    }
}

impl From<&PointGeometry> for geo_types::Point<f64> {
    fn from(p: &PointGeometry) -> Self {
        geo_types::Point::new(p.longitude(), p.latitude())
    }
}

/// Address feature returned by the sample endpoint.
///
/// The property bag differs between server versions, so it is kept as an
/// ordered JSON map and projected through [`crate::export::SchemaVersion`]
/// or [`Address::structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "type", default = "feature_tag")]
    pub feature_type: String,
    pub geometry: PointGeometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

fn feature_tag() -> String {
    "Feature".to_string()
}

impl Address {
    pub fn new(geometry: PointGeometry, properties: Map<String, Value>) -> Self {
        Self {
            feature_type: feature_tag(),
            geometry,
            properties,
        }
    }

    /// Property rendered as text. Missing and null values are `None`.
    pub fn prop_text(&self, key: &str) -> Option<String> {
        value_text(self.properties.get(key)?)
    }

    /// Building type code, for server versions that report one.
    pub fn building_type(&self) -> Option<BuildingType> {
        self.prop_text("type")?.parse().ok()
    }

    pub fn structured(&self) -> StructuredAddress {
        StructuredAddress {
            unit: self.prop_text("unit"),
            number: self.prop_text("number"),
            street: self.prop_text("street"),
            city: self.prop_text("city"),
            county: self.prop_text("county"),
            state: self.prop_text("state"),
            zip: self.prop_text("zip"),
        }
    }
}

/// Scalar JSON value as text; nested values have no text form.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
    }
}

/// Number as text. Integral floats drop the fraction (`3.0` is `3`).
pub(crate) fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Structured mailing-address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}
