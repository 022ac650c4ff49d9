//! Core package metadata module

pub mod fetch;
pub mod format;
pub mod reader;
pub mod size;
pub mod types;
mod utils;

pub use reader::read_metadata;
pub use types::error::{FetchError, FieldError, PkgError, Result};
