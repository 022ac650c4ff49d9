//! Binary format parsing layer for Vita package headers.
//!
//! # Module Organization
//!
//! - [`header`]: Parses the outer package header and its metadata table
//! - [`sfo`]: Decodes the embedded `param.sfo` key/value table
//!
//! # Architecture
//!
//! ```text
//! Package prefix:
//! ┌──────────────────┐
//! │  Fixed header    │ ← header::parse()
//! ├──────────────────┤
//! │  Metadata table  │ ← walked by header::parse()
//! │  (tag, size,     │
//! │   payload)...    │──┐ tag 14: offset + size
//! ├──────────────────┤  │
//! │  ...             │  │
//! ├──────────────────┤  │
//! │  param.sfo       │ ←┘ sfo::parse()
//! └──────────────────┘
//! ```

pub mod header;
pub mod sfo;
