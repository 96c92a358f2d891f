//! Data models shared by the API client and exporters.

pub mod address;
pub mod sample;
pub mod shape;

pub use address::{Address, BuildingType, PointGeometry, SampleSizeUnit, StructuredAddress};
pub use sample::{HealthResponse, SampleRequest, SampleResponse, SearchResponse, ShapeResponse};
pub use shape::{
    Bounds, BoundsGeometry, MultiPolygonGeometry, Position, Shape, ShapeKind, ShapePointer,
};
