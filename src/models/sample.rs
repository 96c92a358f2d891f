//! Request and response payloads for the address API.

use serde::{Deserialize, Serialize};

use super::address::{Address, BuildingType, SampleSizeUnit};
use super::shape::{Bounds, MultiPolygonGeometry, ShapeKind, ShapePointer};

/// Body of `POST /sample`.
///
/// Exactly one of `shape_bounds` / `custom_bounds` is serialized, and
/// `types` is left out when no filter is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    shape_bounds: Option<ShapePointer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_bounds: Option<MultiPolygonGeometry>,
    pub n: u64,
    pub unit: SampleSizeUnit,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<BuildingType>,
}

impl SampleRequest {
    pub fn new(bounds: Bounds, n: u64, unit: SampleSizeUnit) -> Self {
        let (shape_bounds, custom_bounds) = match bounds {
            Bounds::Shape(pointer) => (Some(pointer), None),
            Bounds::Custom(geom) => (None, Some(geom)),
        };
        Self {
            shape_bounds,
            custom_bounds,
            n,
            unit,
            types: Vec::new(),
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = BuildingType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn shape_bounds(&self) -> Option<&ShapePointer> {
        self.shape_bounds.as_ref()
    }

    pub fn custom_bounds(&self) -> Option<&MultiPolygonGeometry> {
        self.custom_bounds.as_ref()
    }

    /// Check the request against the limits the sampler enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.n == 0 {
            return Err("n must be positive".to_string());
        }
        if self.unit == SampleSizeUnit::Pct && self.n > 100 {
            return Err("can't sample more than 100%".to_string());
        }
        Ok(())
    }
}

/// Response of `POST /sample`.
///
/// `validation` holds warnings about the sample (for example a short
/// draw); they do not mean the request failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResponse {
    pub n: u64,
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub validation: Vec<String>,
}

/// Response of `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ShapePointer>,
}

/// Response of `GET /shape`.
///
/// Current servers return the bare geometry; the first server version
/// wrapped it as a JSON string under `geom`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShapeResponse {
    Geometry(MultiPolygonGeometry),
    Wrapped {
        gid: i64,
        kind: ShapeKind,
        geom: String,
    },
}

/// Response of `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> MultiPolygonGeometry {
        serde_json::from_value(json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        }))
        .unwrap()
    }

    #[test]
    fn test_shape_bounds_body() {
        let pointer = ShapePointer::new("Travis County", 2201, ShapeKind::County);
        let req = SampleRequest::new(pointer.into(), 50, SampleSizeUnit::Total);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({
                "shape_bounds": {"name": "Travis County", "gid": 2201, "kind": "county"},
                "n": 50,
                "unit": "total"
            })
        );
    }

    #[test]
    fn test_custom_bounds_body_with_types() {
        let req = SampleRequest::new(square().into(), 5, SampleSizeUnit::Pct)
            .with_types([BuildingType::R, BuildingType::X]);
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("shape_bounds").is_none());
        assert_eq!(body["custom_bounds"]["type"], "MultiPolygon");
        assert_eq!(body["types"], json!(["R", "X"]));
        assert_eq!(body["unit"], "pct");
    }

    #[test]
    fn test_validate_limits() {
        let ok = SampleRequest::new(square().into(), 100, SampleSizeUnit::Pct);
        assert!(ok.validate().is_ok());
        let too_many = SampleRequest::new(square().into(), 101, SampleSizeUnit::Pct);
        assert!(too_many.validate().is_err());
        let zero = SampleRequest::new(square().into(), 0, SampleSizeUnit::Total);
        assert!(zero.validate().is_err());
        let big = SampleRequest::new(square().into(), 5000, SampleSizeUnit::Total);
        assert!(big.validate().is_ok());
    }

    #[test]
    fn test_shape_response_variants() {
        let raw: ShapeResponse = serde_json::from_value(json!({
            "type": "MultiPolygon",
            "coordinates": []
        }))
        .unwrap();
        assert!(matches!(raw, ShapeResponse::Geometry(_)));

        let wrapped: ShapeResponse = serde_json::from_value(json!({
            "gid": 1,
            "kind": "state",
            "geom": "{\"type\":\"MultiPolygon\",\"coordinates\":[]}"
        }))
        .unwrap();
        assert!(matches!(wrapped, ShapeResponse::Wrapped { .. }));
    }
}
