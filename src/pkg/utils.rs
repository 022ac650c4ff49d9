//! Low-level byte reading utilities
//!
//! Every reader is bounds-checked against the slice it is given and reports
//! a [`PkgError::TruncatedInput`] instead of panicking on short input.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use super::types::error::{PkgError, Result};

/// Borrow `len` bytes starting at `offset`.
///
/// `context` names the structure being read and ends up in the error message.
pub fn slice_at<'a>(data: &'a [u8], offset: usize, len: usize, context: &'static str) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| PkgError::truncated(context, usize::MAX, data.len()))?;
    data.get(offset..end)
        .ok_or_else(|| PkgError::truncated(context, end, data.len()))
}

/// Read a big-endian u32 at `offset`.
pub fn read_u32_be(data: &[u8], offset: usize, context: &'static str) -> Result<u32> {
    Ok(BigEndian::read_u32(slice_at(data, offset, 4, context)?))
}

/// Read a big-endian u64 at `offset`.
pub fn read_u64_be(data: &[u8], offset: usize, context: &'static str) -> Result<u64> {
    Ok(BigEndian::read_u64(slice_at(data, offset, 8, context)?))
}

/// Read a little-endian u16 at `offset`.
pub fn read_u16_le(data: &[u8], offset: usize, context: &'static str) -> Result<u16> {
    Ok(LittleEndian::read_u16(slice_at(data, offset, 2, context)?))
}

/// Read a little-endian u32 at `offset`.
pub fn read_u32_le(data: &[u8], offset: usize, context: &'static str) -> Result<u32> {
    Ok(LittleEndian::read_u32(slice_at(data, offset, 4, context)?))
}

/// Return the null-terminated byte string starting at `offset`, without the
/// terminator.
///
/// The scan stops at the first zero byte or at the end of `data`, whichever
/// comes first. An offset at or past the end yields an empty slice.
pub fn cstr_at(data: &[u8], offset: usize) -> &[u8] {
    let tail = data.get(offset..).unwrap_or_default();
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    &tail[..end]
}
