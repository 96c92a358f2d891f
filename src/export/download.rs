//! Export file naming and temporary download files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::csv::{address_list_to_csv, CsvBlob, SchemaVersion};
use crate::models::{Address, Shape};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("no file URL for {}", .0.display())]
    FileUrl(PathBuf),
}

/// Suggested file name (without extension) for an export of `count` items.
///
/// Whitespace runs become `-`, anything outside `[A-Za-z0-9_-]` is dropped.
pub fn export_name(display_name: &str, count: usize) -> String {
    let raw = format!("{}-{}-addresses", display_name, count);

    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    out
}

/// [`export_name`] for a sample drawn from `shape`.
pub fn name(shape: &Shape, data: &[Address]) -> String {
    export_name(shape.name(), data.len())
}

/// CSV written to a temporary file, addressable by a `file://` URL.
///
/// The file lives until [`CsvDownload::revoke`] is called or the handle is
/// dropped; holders of the URL must not outlive it.
#[derive(Debug)]
pub struct CsvDownload {
    file: NamedTempFile,
    url: Url,
}

impl CsvDownload {
    pub fn create(blob: &CsvBlob) -> Result<Self, ExportError> {
        let mut file = tempfile::Builder::new()
            .prefix("addresses-")
            .suffix(".csv")
            .tempfile()?;
        file.write_all(blob.as_bytes())?;
        file.flush()?;

        let url = Url::from_file_path(file.path())
            .map_err(|_| ExportError::FileUrl(file.path().to_path_buf()))?;
        debug!("Created download {}", url);

        Ok(Self { file, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the temporary file.
    pub fn revoke(self) -> Result<(), ExportError> {
        debug!("Revoking download {}", self.url);
        self.file.close()?;
        Ok(())
    }
}

/// Write `addresses` as CSV to a temporary file and return its handle.
pub fn csv(addresses: &[Address], schema: SchemaVersion) -> Result<CsvDownload, ExportError> {
    CsvDownload::create(&address_list_to_csv(addresses, schema))
}

/// Write `blob` to `<dir>/<file_stem>.csv`, returning the path.
pub fn save_csv(blob: &CsvBlob, dir: &Path, file_stem: &str) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", file_stem));
    fs::write(&path, blob.as_bytes())?;
    info!("Wrote {} bytes to {}", blob.body.len(), path.display());
    Ok(path)
}
