//! CSV serialization of address samples.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::models::{Address, ShapeKind};

/// MIME type of exported CSV bodies.
pub const CSV_MIME: &str = "text/plain;charset=utf-8";

/// Column of an export, projected from an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Property `key` under header `header`
    Prop {
        header: &'static str,
        key: &'static str,
    },
    Longitude,
    Latitude,
}

impl Column {
    const fn prop(key: &'static str) -> Self {
        Column::Prop { header: key, key }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Column::Prop { header, .. } => *header,
            Column::Longitude => "longitude",
            Column::Latitude => "latitude",
        }
    }

    fn cell(&self, addr: &Address) -> String {
        match self {
            Column::Prop { key, .. } => addr.prop_text(key).unwrap_or_default(),
            Column::Longitude => addr.geometry.coordinates.ordinate_text(0).unwrap_or_default(),
            Column::Latitude => addr.geometry.coordinates.ordinate_text(1).unwrap_or_default(),
        }
    }
}

const FREEFORM_COLUMNS: &[Column] = &[
    Column::prop("address"),
    Column::Longitude,
    Column::Latitude,
];

const BUILDING_TYPE_COLUMNS: &[Column] = &[
    Column::Prop {
        header: "address",
        key: "addr",
    },
    Column::prop("type"),
    Column::prop("units"),
    Column::Longitude,
    Column::Latitude,
    Column::prop("statefp"),
    Column::prop("countyfp"),
    Column::prop("tractce"),
    Column::prop("blkgrpce"),
];

const STRUCTURED_COLUMNS: &[Column] = &[
    Column::prop("unit"),
    Column::prop("number"),
    Column::prop("street"),
    Column::prop("city"),
    Column::prop("county"),
    Column::prop("state"),
    Column::prop("zip"),
    Column::Longitude,
    Column::Latitude,
    Column::prop("statefp"),
    Column::prop("countyfp"),
    Column::prop("tractce"),
    Column::prop("blkgrpce"),
];

/// Address-property layout of a server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Single free-text `address` property
    Freeform,
    /// `addr`, building `type` and `units` with census codes
    BuildingType,
    /// Split unit/number/street/city/county/state/zip with census codes
    #[default]
    Structured,
}

impl SchemaVersion {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            SchemaVersion::Freeform => FREEFORM_COLUMNS,
            SchemaVersion::BuildingType => BUILDING_TYPE_COLUMNS,
            SchemaVersion::Structured => STRUCTURED_COLUMNS,
        }
    }

    /// Shape kinds the matching server version can search and fetch.
    pub fn shape_kinds(&self) -> &'static [ShapeKind] {
        match self {
            SchemaVersion::Freeform => &[ShapeKind::State, ShapeKind::County, ShapeKind::Cousub],
            SchemaVersion::BuildingType => &[
                ShapeKind::State,
                ShapeKind::County,
                ShapeKind::Cousub,
                ShapeKind::Place,
                ShapeKind::Tract,
            ],
            SchemaVersion::Structured => ShapeKind::all(),
        }
    }

    pub fn header(&self) -> String {
        self.columns()
            .iter()
            .map(Column::header)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn row(&self, addr: &Address) -> String {
        self.columns()
            .iter()
            .map(|col| quote_cell(&col.cell(addr)).into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "freeform" => Ok(SchemaVersion::Freeform),
            "building_type" => Ok(SchemaVersion::BuildingType),
            "structured" => Ok(SchemaVersion::Structured),
            other => Err(format!("unknown schema '{}'", other)),
        }
    }
}

/// Quote a cell iff it contains a double quote, comma or newline.
///
/// Narrower than `csv::QuoteStyle::Necessary`: a `\r` without `\n` is
/// left unquoted.
pub fn quote_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains(['"', ',', '\n']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

/// In-memory CSV document with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvBlob {
    pub mime: &'static str,
    pub body: String,
}

impl CsvBlob {
    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }
}

/// Header row plus one row per address, joined by `\n`.
pub fn address_list_to_csv(addresses: &[Address], schema: SchemaVersion) -> CsvBlob {
    let mut body = schema.header();
    for addr in addresses {
        body.push('\n');
        body.push_str(&schema.row(addr));
    }
    CsvBlob {
        mime: CSV_MIME,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointGeometry;
    use serde_json::json;

    fn address(lon: f64, lat: f64, props: serde_json::Value) -> Address {
        Address::new(
            PointGeometry::new(lon, lat).unwrap(),
            props.as_object().cloned().unwrap_or_default(),
        )
    }

    #[test]
    fn test_quote_cell() {
        assert_eq!(quote_cell(r#"He said "hi", ok"#), r#""He said ""hi"", ok""#);
        assert_eq!(quote_cell("42"), "42");
        assert_eq!(quote_cell("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(quote_cell("a,b"), "\"a,b\"");
        assert_eq!(quote_cell("plain text"), "plain text");
        assert!(matches!(quote_cell("x"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_headers() {
        assert_eq!(SchemaVersion::Freeform.header(), "address,longitude,latitude");
        assert_eq!(
            SchemaVersion::Structured.header(),
            "unit,number,street,city,county,state,zip,longitude,latitude,statefp,countyfp,tractce,blkgrpce"
        );
        assert_eq!(
            SchemaVersion::BuildingType.header(),
            "address,type,units,longitude,latitude,statefp,countyfp,tractce,blkgrpce"
        );
    }

    #[test]
    fn test_longitude_before_latitude() {
        let addr = address(-97.7431, 30.2672, json!({"address": "Austin, TX"}));
        let blob = address_list_to_csv(&[addr], SchemaVersion::Freeform);
        assert_eq!(
            blob.body,
            "address,longitude,latitude\n\"Austin, TX\",-97.7431,30.2672"
        );
        assert_eq!(blob.mime, "text/plain;charset=utf-8");
    }

    #[test]
    fn test_structured_row_missing_fields_empty() {
        let addr = address(
            -97.0,
            30.5,
            json!({
                "number": 12,
                "street": "Main St",
                "city": "Austin",
                "state": "TX",
                "zip": "78701",
                "statefp": "48",
                "countyfp": "453"
            }),
        );
        assert_eq!(
            SchemaVersion::Structured.row(&addr),
            ",12,Main St,Austin,,TX,78701,-97,30.5,48,453,,"
        );
    }

    #[test]
    fn test_building_type_row() {
        let addr = address(
            -97.1,
            30.2,
            json!({"addr": "9 Elm St", "type": "R", "units": 2, "statefp": "48"}),
        );
        assert_eq!(
            SchemaVersion::BuildingType.row(&addr),
            "9 Elm St,R,2,-97.1,30.2,48,,,"
        );
    }

    #[test]
    fn test_empty_list_is_header_only() {
        let blob = address_list_to_csv(&[], SchemaVersion::Structured);
        assert_eq!(blob.body, SchemaVersion::Structured.header());
    }

    #[test]
    fn test_schema_parse_and_kinds() {
        assert_eq!(
            "building-type".parse::<SchemaVersion>(),
            Ok(SchemaVersion::BuildingType)
        );
        assert!("v9".parse::<SchemaVersion>().is_err());
        assert!(!SchemaVersion::Freeform.shape_kinds().contains(&ShapeKind::Tract));
        assert!(SchemaVersion::Structured.shape_kinds().contains(&ShapeKind::Zcta5));
    }
}
