//! Stream filters and the registry that names them.
//!
//! The registry is a plain value: whoever owns the session owns the set of
//! filters available to it.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{ObjectError, ObjectResult};

/// A reversible byte transform applied to stream payloads.
pub trait Filter: Send + Sync {
    /// The name recorded in a stream's `/Filter` entry.
    fn name(&self) -> &str;

    fn encode(&self, data: &[u8]) -> ObjectResult<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> ObjectResult<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// FlateDecode
// ---------------------------------------------------------------------------

/// zlib/deflate compression.
#[derive(Clone, Copy, Debug)]
pub struct FlateFilter {
    level: u32,
}

impl FlateFilter {
    pub const NAME: &'static str = "FlateDecode";

    /// Compression level 0-9.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    fn failure(err: std::io::Error) -> ObjectError {
        ObjectError::Filter {
            filter: Self::NAME.to_string(),
            reason: err.to_string(),
        }
    }
}

impl Default for FlateFilter {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Filter for FlateFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, data: &[u8]) -> ObjectResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data).map_err(Self::failure)?;
        encoder.finish().map_err(Self::failure)
    }

    fn decode(&self, data: &[u8]) -> ObjectResult<Vec<u8>> {
        let mut decoded = Vec::new();
        ZlibDecoder::new(data)
            .read_to_end(&mut decoded)
            .map_err(Self::failure)?;
        Ok(decoded)
    }
}

// ---------------------------------------------------------------------------
// ASCIIHexDecode
// ---------------------------------------------------------------------------

/// Hexadecimal text encoding terminated by `>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiHexFilter;

impl AsciiHexFilter {
    pub const NAME: &'static str = "ASCIIHexDecode";
}

impl Filter for AsciiHexFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn encode(&self, data: &[u8]) -> ObjectResult<Vec<u8>> {
        let mut encoded = hex::encode_upper(data).into_bytes();
        encoded.push(b'>');
        Ok(encoded)
    }

    /// Whitespace is ignored, decoding stops at `>`, and an odd final digit
    /// is treated as if followed by `0`.
    fn decode(&self, data: &[u8]) -> ObjectResult<Vec<u8>> {
        let mut digits: Vec<u8> = data
            .iter()
            .copied()
            .take_while(|&b| b != b'>')
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        hex::decode(&digits).map_err(|e| ObjectError::Filter {
            filter: Self::NAME.to_string(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Filters available to a session, keyed by name.
#[derive(Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `FlateDecode` and `ASCIIHexDecode`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FlateFilter::default()));
        registry.register(Box::new(AsciiHexFilter));
        registry
    }

    /// Add a filter under its own name, returning any filter it replaces.
    pub fn register(&mut self, filter: Box<dyn Filter>) -> Option<Box<dyn Filter>> {
        self.filters.insert(filter.name().to_string(), filter)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| &**f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.filters.keys().map(String::as_str)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
