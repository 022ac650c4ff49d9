//! Builders for synthetic package prefixes.
#![allow(dead_code)]

pub const APP: u32 = 0x15;
pub const DLC: u32 = 0x16;
pub const THEME: u32 = 0x1F;

const META_OFFSET: usize = 0xC0;
const SFO_ALIGN: usize = 0x10;

/// Builds a `param.sfo` blob from key/value pairs, in order.
#[derive(Default)]
pub struct SfoBuilder {
    pairs: Vec<(Vec<u8>, Vec<u8>)>,
}

impl SfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(mut self, key: &str, value: &str) -> Self {
        self.pairs.push((key.as_bytes().to_vec(), value.as_bytes().to_vec()));
        self
    }

    pub fn raw_pair(mut self, key: &[u8], value: &[u8]) -> Self {
        self.pairs.push((key.to_vec(), value.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let count = self.pairs.len();
        let key_table = 20 + count * 16;

        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut index = Vec::new();
        for (key, value) in &self.pairs {
            let key_rel = keys.len() as u16;
            let value_rel = values.len() as u32;
            keys.extend_from_slice(key);
            keys.push(0);
            values.extend_from_slice(value);
            values.push(0);

            index.extend_from_slice(&key_rel.to_le_bytes());
            index.extend_from_slice(&0x0204u16.to_le_bytes()); // utf-8 string
            index.extend_from_slice(&(value.len() as u32 + 1).to_le_bytes());
            index.extend_from_slice(&(value.len() as u32 + 1).to_le_bytes());
            index.extend_from_slice(&value_rel.to_le_bytes());
        }
        let value_table = key_table + keys.len();

        let mut blob = Vec::new();
        blob.extend_from_slice(b"\0PSF");
        blob.extend_from_slice(&0x0101u32.to_le_bytes());
        blob.extend_from_slice(&(key_table as u32).to_le_bytes());
        blob.extend_from_slice(&(value_table as u32).to_le_bytes());
        blob.extend_from_slice(&(count as u32).to_le_bytes());
        blob.extend_from_slice(&index);
        blob.extend_from_slice(&keys);
        blob.extend_from_slice(&values);
        blob
    }
}

/// A typical application `param.sfo`.
pub fn sample_sfo(category: &str) -> Vec<u8> {
    SfoBuilder::new()
        .pair("APP_VER", "01.05")
        .pair("ATTRIBUTE", "0")
        .pair("CATEGORY", category)
        .pair("CONTENT_ID", "UP1234-ABCD12345_00-0000000000000000")
        .pair("PSP2_DISP_VER", "03.600")
        .pair("STITLE", "Sample")
        .pair("TITLE", "Sample\nGame")
        .pair("TITLE_ID", "ABCD12345")
        .build()
}

/// Builds the leading bytes of a package around a `param.sfo` blob.
pub struct PkgBuilder {
    content_type: Option<u32>,
    with_locator: bool,
    leading_entries: Vec<(u32, Vec<u8>)>,
    trailing_entries: Vec<(u32, Vec<u8>)>,
    sfo: Vec<u8>,
    total_size: u64,
    trailer: usize,
}

/// A built package prefix plus where its `param.sfo` landed.
pub struct BuiltPkg {
    pub bytes: Vec<u8>,
    pub sfo_offset: usize,
    pub sfo_size: usize,
}

impl PkgBuilder {
    pub fn new(content_type: u32, sfo: Vec<u8>) -> Self {
        Self {
            content_type: Some(content_type),
            with_locator: true,
            leading_entries: Vec::new(),
            trailing_entries: Vec::new(),
            sfo,
            total_size: 123_456_789,
            trailer: 64,
        }
    }

    pub fn total_size(mut self, size: u64) -> Self {
        self.total_size = size;
        self
    }

    /// Adds an entry the parser must skip, placed before the known ones.
    pub fn unknown_entry(mut self, tag: u32, payload: &[u8]) -> Self {
        self.leading_entries.push((tag, payload.to_vec()));
        self
    }

    /// Adds an entry placed after the known ones.
    pub fn trailing_entry(mut self, tag: u32, payload: &[u8]) -> Self {
        self.trailing_entries.push((tag, payload.to_vec()));
        self
    }

    pub fn without_content_type(mut self) -> Self {
        self.content_type = None;
        self
    }

    pub fn without_locator(mut self) -> Self {
        self.with_locator = false;
        self
    }

    pub fn build(&self) -> BuiltPkg {
        let mut entries: Vec<(u32, Vec<u8>)> = self.leading_entries.clone();
        if let Some(code) = self.content_type {
            entries.push((2, code.to_be_bytes().to_vec()));
        }
        // Locator payload is patched once the table size is known.
        let locator_index = self.with_locator.then(|| {
            entries.push((14, vec![0u8; 16]));
            entries.len() - 1
        });
        entries.extend(self.trailing_entries.iter().cloned());

        let table_len: usize = entries.iter().map(|(_, p)| 8 + p.len()).sum();
        let sfo_offset = (META_OFFSET + table_len).div_ceil(SFO_ALIGN) * SFO_ALIGN;
        let sfo_size = self.sfo.len();

        if let Some(i) = locator_index {
            let payload = &mut entries[i].1;
            payload[..4].copy_from_slice(&(sfo_offset as u32).to_be_bytes());
            payload[4..8].copy_from_slice(&(sfo_size as u32).to_be_bytes());
        }

        let mut bytes = vec![0u8; META_OFFSET];
        bytes[..4].copy_from_slice(b"\x7FPKG");
        bytes[4..8].copy_from_slice(&0x8001_0002u32.to_be_bytes());
        bytes[8..12].copy_from_slice(&(META_OFFSET as u32).to_be_bytes());
        bytes[12..16].copy_from_slice(&(entries.len() as u32).to_be_bytes());
        bytes[24..32].copy_from_slice(&self.total_size.to_be_bytes());

        for (tag, payload) in &entries {
            bytes.extend_from_slice(&tag.to_be_bytes());
            bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            bytes.extend_from_slice(payload);
        }
        bytes.resize(sfo_offset, 0);
        bytes.extend_from_slice(&self.sfo);
        bytes.resize(bytes.len() + self.trailer, 0);

        BuiltPkg {
            bytes,
            sfo_offset,
            sfo_size,
        }
    }
}
