//! `param.sfo` parsing.
//!
//! The blob is a small key/value table. A fixed header points at a key table
//! and a value table; an index of 16-byte records follows the header, each
//! holding the relative offsets of one key string and one value string.

use std::str;
use log::{debug, info, trace, warn};
use crate::pkg::types::{
    error::{FieldError, PkgError, Result},
    models::{DecimalVersion, PackageHeader, PackageMetadata, SfoFields},
};
use crate::pkg::utils;

/// `param.sfo` signature at offset 0 ("PSF\0" read little-endian).
pub const SFO_MAGIC: [u8; 4] = *b"\0PSF";

/// Size of the fixed `param.sfo` header; the index starts right after it.
pub const SFO_HEADER_LEN: usize = 20;

/// Size of one index record.
pub const INDEX_ENTRY_LEN: usize = 16;

const KEY_TABLE_POS: usize = 8;
const VALUE_TABLE_POS: usize = 12;
const COUNT_POS: usize = 16;
const VALUE_OFFSET_IN_ENTRY: usize = 12;

const KEY_TITLE: &str = "TITLE";
const KEY_CONTENT_ID: &str = "CONTENT_ID";
const KEY_MIN_FIRMWARE: &str = "PSP2_DISP_VER";
const KEY_APP_VERSION: &str = "APP_VER";
const KEY_CATEGORY: &str = "CATEGORY";

/// Position of the 9-character title id inside a content id.
const TITLE_ID_START: usize = 7;
const TITLE_ID_LEN: usize = 9;

/// Parses a `param.sfo` blob and combines it with the header result.
///
/// The header's content type is needed to tell updates apart from regular
/// applications, which only the `CATEGORY` field can do.
pub fn parse(blob: &[u8], header: &PackageHeader) -> Result<PackageMetadata> {
    let fields = read_fields(blob)?;
    let metadata = PackageMetadata::assemble(header, fields);
    info!(
        "param.sfo parsed: title_id={}, classification={}, {} field issue(s)",
        metadata.title_id,
        metadata.classification,
        metadata.issues.len()
    );
    Ok(metadata)
}

/// Decodes the recognized fields of a `param.sfo` blob.
///
/// # Structure
/// ```text
/// [0..4]   Magic "\0PSF"
/// [8..12]  Key table offset (little-endian u32)
/// [12..16] Value table offset (little-endian u32)
/// [16..20] Pair count (little-endian u32)
/// [20 + 16*i]      Key offset, relative to key table (little-endian u16)
/// [20 + 16*i + 12] Value offset, relative to value table (little-endian u16)
/// ```
///
/// Missing keys keep their defaults. Undecodable values are recorded in
/// [`SfoFields::issues`] and otherwise ignored.
pub fn read_fields(blob: &[u8]) -> Result<SfoFields> {
    if blob.len() < SFO_HEADER_LEN {
        return Err(PkgError::truncated("param.sfo header", SFO_HEADER_LEN, blob.len()));
    }

    let magic = &blob[..SFO_MAGIC.len()];
    if magic != SFO_MAGIC {
        return Err(PkgError::BadMagic {
            structure: "param.sfo",
            found: magic.to_vec(),
        });
    }

    let key_table = utils::read_u32_le(blob, KEY_TABLE_POS, "param.sfo key table offset")? as usize;
    let value_table = utils::read_u32_le(blob, VALUE_TABLE_POS, "param.sfo value table offset")? as usize;
    let count = utils::read_u32_le(blob, COUNT_POS, "param.sfo pair count")? as usize;
    debug!(
        "param.sfo: {} pairs, key table {:#x}, value table {:#x}",
        count, key_table, value_table
    );

    let mut fields = SfoFields::default();
    for index in 0..count {
        let entry = index
            .checked_mul(INDEX_ENTRY_LEN)
            .and_then(|pos| pos.checked_add(SFO_HEADER_LEN))
            .ok_or_else(|| PkgError::truncated("param.sfo index", usize::MAX, blob.len()))?;
        let key_rel = utils::read_u16_le(blob, entry, "param.sfo index entry")? as usize;
        let value_rel = utils::read_u16_le(blob, entry + VALUE_OFFSET_IN_ENTRY, "param.sfo index entry")? as usize;

        let key_bytes = utils::cstr_at(blob, key_table.saturating_add(key_rel));
        let value_bytes = utils::cstr_at(blob, value_table.saturating_add(value_rel));

        let Ok(key) = str::from_utf8(key_bytes) else {
            record_issue(&mut fields, FieldError::Decode {
                key: String::from_utf8_lossy(key_bytes).into_owned(),
            });
            continue;
        };
        trace!("param.sfo entry {}: key={}", index, key);

        if !is_recognized(key) {
            continue;
        }

        match str::from_utf8(value_bytes) {
            Ok(value) => apply_field(&mut fields, key, value),
            Err(_) => record_issue(&mut fields, FieldError::Decode { key: key.to_string() }),
        }
    }

    Ok(fields)
}

fn is_recognized(key: &str) -> bool {
    matches!(
        key,
        KEY_TITLE | KEY_CONTENT_ID | KEY_MIN_FIRMWARE | KEY_APP_VERSION | KEY_CATEGORY
    )
}

/// Store one decoded value. Later duplicates overwrite earlier ones.
fn apply_field(fields: &mut SfoFields, key: &str, value: &str) {
    match key {
        KEY_TITLE => fields.title = value.replace('\n', " "),
        KEY_CONTENT_ID => {
            fields.content_id = value.to_string();
            fields.title_id = value.chars().skip(TITLE_ID_START).take(TITLE_ID_LEN).collect();
        }
        KEY_MIN_FIRMWARE => {
            if let Some(version) = parse_version(fields, key, value) {
                fields.min_firmware = version;
            }
        }
        KEY_APP_VERSION => {
            if let Some(version) = parse_version(fields, key, value) {
                fields.app_version = Some(version);
            }
        }
        KEY_CATEGORY => fields.category = value.to_string(),
        _ => {}
    }
}

fn parse_version(fields: &mut SfoFields, key: &str, value: &str) -> Option<DecimalVersion> {
    match value.parse::<DecimalVersion>() {
        Ok(version) => Some(version),
        Err(_) => {
            record_issue(fields, FieldError::InvalidNumeric {
                key: key.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}

fn record_issue(fields: &mut SfoFields, issue: FieldError) {
    warn!("Skipping param.sfo field: {}", issue);
    fields.issues.push(issue);
}
