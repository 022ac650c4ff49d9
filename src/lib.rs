//! # vita-pkginfo
//!
//! Reads title, content id, region, firmware requirement and size from the
//! header of a PlayStation Vita `.pkg` file, without downloading the package.
//!
//! Only the first few kilobytes are needed: the package header points at an
//! embedded `param.sfo`, which holds the descriptive fields.
pub mod pkg;

// Re-export the main types for convenience
pub use pkg::{
    fetch::{FetchConfig, HeaderFetcher, Source},
    read_metadata,
    size::pretty_size,
    types::models::{
        Classification,
        ContentType,
        DecimalVersion,
        PackageHeader,
        PackageMetadata,
        Region,
        SfoFields,
    },
    FetchError,
    FieldError,
    PkgError,
};
