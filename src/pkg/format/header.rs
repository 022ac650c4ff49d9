//! Package header parsing.
//!
//! This module handles:
//! - Validating the `\x7FPKG` signature
//! - Walking the metadata table to find the content type and `param.sfo` location
//! - Reading the declared total package size

use log::{debug, info, trace};
use crate::pkg::types::{
    error::{PkgError, Result},
    models::{BlobRange, ContentType, PackageHeader},
};
use crate::pkg::utils;

/// Package signature at offset 0.
pub const PKG_MAGIC: [u8; 4] = *b"\x7FPKG";

/// Bytes needed to read every fixed header field.
pub const MIN_HEADER_LEN: usize = 32;

const META_OFFSET_POS: usize = 8;
const META_COUNT_POS: usize = 12;
const TOTAL_SIZE_POS: usize = 24;

/// Metadata entry tag carrying the content type.
pub const TAG_CONTENT_TYPE: u32 = 2;
/// Metadata entry tag carrying the `param.sfo` offset and size.
pub const TAG_SFO_LOCATOR: u32 = 14;

/// Size of the tag + payload size prefix of every metadata entry.
const ENTRY_PREFIX_LEN: usize = 8;

/// Parses the package header from the leading bytes of a package.
///
/// # Header Structure
/// ```text
/// [0..4]   Magic "\x7FPKG"
/// [8..12]  Metadata table offset (big-endian u32)
/// [12..16] Metadata entry count (big-endian u32)
/// [24..32] Total package size (big-endian u64)
/// ```
///
/// # Metadata Entry
/// ```text
/// [4 bytes] Tag (big-endian u32)
/// [4 bytes] Payload size (big-endian u32)
/// [N bytes] Payload
/// ```
///
/// # Errors
/// - [`PkgError::TruncatedInput`] if the buffer ends before a field or the blob
/// - [`PkgError::BadMagic`] if the signature does not match
/// - [`PkgError::InvalidFormat`] if no `param.sfo` locator entry exists
/// - [`PkgError::UnsupportedContentType`] if the header is sound but its
///   content type is not an application, DLC or theme
pub fn parse(buffer: &[u8]) -> Result<PackageHeader> {
    info!("Parsing package header ({} bytes available)", buffer.len());

    if buffer.len() < MIN_HEADER_LEN {
        return Err(PkgError::truncated("package header", MIN_HEADER_LEN, buffer.len()));
    }

    let magic = &buffer[..PKG_MAGIC.len()];
    if magic != PKG_MAGIC {
        return Err(PkgError::BadMagic {
            structure: "package",
            found: magic.to_vec(),
        });
    }

    let meta_offset = utils::read_u32_be(buffer, META_OFFSET_POS, "metadata table offset")? as usize;
    let meta_count = utils::read_u32_be(buffer, META_COUNT_POS, "metadata entry count")?;
    let total_size = utils::read_u64_be(buffer, TOTAL_SIZE_POS, "total package size")?;
    debug!(
        "Metadata table at {:#x} with {} entries, declared size {} bytes",
        meta_offset, meta_count, total_size
    );

    let (content_code, blob) = walk_metadata(buffer, meta_offset, meta_count)?;
    let blob = blob.ok_or_else(|| {
        PkgError::InvalidFormat("Metadata table has no param.sfo locator entry".to_string())
    })?;

    let blob_end = blob
        .end()
        .ok_or_else(|| PkgError::truncated("param.sfo", usize::MAX, buffer.len()))?;
    if blob_end > buffer.len() {
        return Err(PkgError::truncated("param.sfo", blob_end, buffer.len()));
    }

    // Classification last: structural problems take precedence.
    let content_type = ContentType::try_from(content_code)?;

    info!(
        "Package header parsed: type={:?}, param.sfo at {:#x} ({} bytes)",
        content_type, blob.offset, blob.size
    );

    Ok(PackageHeader {
        content_type,
        blob,
        total_size,
    })
}

/// Walks `count` metadata entries starting at `offset`.
///
/// Entries are variable length, so they can only be visited in order. Every
/// entry advances the cursor by its declared payload size, recognized or not.
///
/// Returns the raw content type code (0 when absent) and the blob location.
fn walk_metadata(buffer: &[u8], offset: usize, count: u32) -> Result<(u32, Option<BlobRange>)> {
    let mut cursor = offset;
    let mut content_code = 0;
    let mut blob = None;

    for index in 0..count {
        let tag = utils::read_u32_be(buffer, cursor, "metadata entry tag")?;
        let size = utils::read_u32_be(buffer, cursor + 4, "metadata entry size")? as usize;
        let payload = cursor + ENTRY_PREFIX_LEN;
        trace!("Metadata entry {}: tag={} size={} at {:#x}", index, tag, size, cursor);

        match tag {
            TAG_CONTENT_TYPE => {
                content_code = utils::read_u32_be(buffer, payload, "content type")?;
                debug!("Content type code: {:#x}", content_code);
            }
            TAG_SFO_LOCATOR => {
                let sfo_offset = utils::read_u32_be(buffer, payload, "param.sfo offset")? as usize;
                let sfo_size = utils::read_u32_be(buffer, payload + 4, "param.sfo size")? as usize;
                debug!("param.sfo located at {:#x}, {} bytes", sfo_offset, sfo_size);
                blob = Some(BlobRange {
                    offset: sfo_offset,
                    size: sfo_size,
                });
            }
            _ => {}
        }

        cursor = payload
            .checked_add(size)
            .ok_or_else(|| PkgError::truncated("metadata table", usize::MAX, buffer.len()))?;
    }

    Ok((content_code, blob))
}
