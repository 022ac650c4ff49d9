//! Core data structures for the package header and `param.sfo` contents.
//!
//! This module defines the values passed between the decoding stages:
//! - The header parse result ([`PackageHeader`])
//! - Decoded `param.sfo` fields ([`SfoFields`])
//! - The final record ([`PackageMetadata`]) and its derived enums

use std::fmt;
use serde::{Serialize, Serializer};
use super::error::{FieldError, PkgError, Result};
use crate::pkg::size;

/// Placeholder for text fields the `param.sfo` does not provide.
pub const UNDEFINED: &str = "Undefined";

/// Content type declared in the package header's metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Application,
    Dlc,
    Theme,
}

impl ContentType {
    /// Raw header code for applications (and their updates).
    pub const APPLICATION_CODE: u32 = 0x15;
    /// Raw header code for additional content.
    pub const DLC_CODE: u32 = 0x16;
    /// Raw header code for themes.
    pub const THEME_CODE: u32 = 0x1F;
}

impl TryFrom<u32> for ContentType {
    type Error = PkgError;
    fn try_from(code: u32) -> Result<Self> {
        match code {
            Self::APPLICATION_CODE => Ok(Self::Application),
            Self::DLC_CODE => Ok(Self::Dlc),
            Self::THEME_CODE => Ok(Self::Theme),
            _ => Err(PkgError::UnsupportedContentType { code }),
        }
    }
}

/// Location of the embedded `param.sfo`, relative to the package start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobRange {
    pub offset: usize,
    pub size: usize,
}

impl BlobRange {
    /// Exclusive end offset, or `None` if it does not fit in `usize`.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.size)
    }
}

/// Result of parsing the outer package header.
///
/// Produced by [`header::parse`](crate::pkg::format::header::parse) and handed
/// to [`sfo::parse`](crate::pkg::format::sfo::parse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    pub content_type: ContentType,
    pub blob: BlobRange,
    /// Total package size as declared in the header, in bytes.
    pub total_size: u64,
}

/// Final package classification shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Application,
    Dlc,
    Theme,
    /// An application package whose `CATEGORY` is `gp`.
    Update,
}

impl Classification {
    /// Category code that marks an application package as a patch.
    pub const UPDATE_CATEGORY: &'static str = "gp";

    /// Combine the header content type with the `param.sfo` category.
    pub fn refine(content_type: ContentType, category: &str) -> Self {
        match content_type {
            ContentType::Application if category == Self::UPDATE_CATEGORY => Self::Update,
            ContentType::Application => Self::Application,
            ContentType::Dlc => Self::Dlc,
            ContentType::Theme => Self::Theme,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Application => "VITA APP",
            Self::Dlc => "VITA DLC",
            Self::Theme => "VITA THEME",
            Self::Update => "VITA UPDATE",
        }
    }
}

/// Market region, derived from the first character of the content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Usa,
    Eur,
    Jpn,
    Kor,
    Hkg,
    Int,
    Unknown,
}

impl Region {
    /// Map a content id such as `UP1234-ABCD12345_00-...` to its region.
    ///
    /// The [`UNDEFINED`] placeholder maps to [`Region::Unknown`] even though it
    /// starts with `U`.
    pub fn from_content_id(content_id: &str) -> Self {
        if content_id == UNDEFINED {
            return Self::Unknown;
        }
        match content_id.chars().next() {
            Some('U') => Self::Usa,
            Some('E') => Self::Eur,
            Some('J') => Self::Jpn,
            Some('K') => Self::Kor,
            Some('H') => Self::Hkg,
            Some('I') => Self::Int,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::Eur => "EUR",
            Self::Jpn => "JPN",
            Self::Kor => "KOR",
            Self::Hkg => "HKG",
            Self::Int => "INT",
            Self::Unknown => "???",
        }
    }
}

macro_rules! label_display_and_serialize {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    )*};
}

label_display_and_serialize!(Classification, Region);

/// A decimal version number such as `PSP2_DISP_VER=03.600`.
///
/// Displays with at least one fractional digit, so `3.0` prints as `3.0`
/// rather than `3`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct DecimalVersion(pub f64);

impl std::str::FromStr for DecimalVersion {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for DecimalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Fields recovered from a `param.sfo` blob.
#[derive(Debug, Clone, PartialEq)]
pub struct SfoFields {
    pub title: String,
    pub content_id: String,
    pub title_id: String,
    pub min_firmware: DecimalVersion,
    pub app_version: Option<DecimalVersion>,
    pub category: String,
    /// Field-level failures absorbed while decoding.
    pub issues: Vec<FieldError>,
}

impl Default for SfoFields {
    fn default() -> Self {
        Self {
            title: UNDEFINED.to_string(),
            content_id: UNDEFINED.to_string(),
            title_id: UNDEFINED.to_string(),
            min_firmware: DecimalVersion::default(),
            app_version: None,
            category: String::new(),
            issues: Vec::new(),
        }
    }
}

/// Metadata decoded from a package header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageMetadata {
    pub title: String,
    pub content_id: String,
    pub title_id: String,
    pub region: Region,
    pub min_firmware: DecimalVersion,
    pub app_version: Option<DecimalVersion>,
    pub category: String,
    pub classification: Classification,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldError>,
}

impl PackageMetadata {
    /// Merge the header result with the decoded `param.sfo` fields.
    pub fn assemble(header: &PackageHeader, fields: SfoFields) -> Self {
        Self {
            region: Region::from_content_id(&fields.content_id),
            classification: Classification::refine(header.content_type, &fields.category),
            total_size: header.total_size,
            title: fields.title,
            content_id: fields.content_id,
            title_id: fields.title_id,
            min_firmware: fields.min_firmware,
            app_version: fields.app_version,
            category: fields.category,
            issues: fields.issues,
        }
    }

    /// Human-readable total size, e.g. `1.2 GiB`.
    pub fn pretty_size(&self) -> String {
        size::pretty_size(self.total_size)
    }
}
