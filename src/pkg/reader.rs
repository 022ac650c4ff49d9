//! End-to-end decoding of a package prefix.

use log::info;
use super::format::{header, sfo};
use super::types::error::{PkgError, Result};
use super::types::models::PackageMetadata;

/// Decodes package metadata from the leading bytes of a `.pkg` file.
///
/// Runs the header parser, cuts the `param.sfo` out of `buffer` and hands
/// both to the blob parser. Performs no I/O; see [`fetch`](super::fetch)
/// for obtaining `buffer`.
///
/// # Errors
/// Any error from [`header::parse`] or [`sfo::parse`]. Only
/// [`PkgError::UnsupportedContentType`] is recoverable.
pub fn read_metadata(buffer: &[u8]) -> Result<PackageMetadata> {
    let header = header::parse(buffer)?;

    let blob = header
        .blob
        .end()
        .and_then(|end| buffer.get(header.blob.offset..end))
        .ok_or_else(|| {
            let needed = header.blob.offset.saturating_add(header.blob.size);
            PkgError::truncated("param.sfo", needed, buffer.len())
        })?;

    let metadata = sfo::parse(blob, &header)?;
    info!("Decoded {} ({})", metadata.content_id, metadata.classification);
    Ok(metadata)
}
