//! CSV export of address samples.

mod csv;
mod download;

pub use self::csv::{address_list_to_csv, quote_cell, Column, CsvBlob, SchemaVersion, CSV_MIME};
pub use download::{csv, export_name, name, save_csv, CsvDownload, ExportError};
