//! Upload normalization: size limits, gzip sniffing, and UTF-8 decoding.
//!
//! Turns the raw bytes of an upload into a [`NormalizedTable`] that rule
//! engines can share read-only. The size limit is checked against the
//! compressed input first and again against the decompressed output, so a
//! small gzip bomb cannot expand past the limit in memory.

use std::io::Read;

use flate2::read::MultiGzDecoder;

use crate::error::ValidationError;

/// Leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

const UTF8_BOM: char = '\u{feff}';

/// Transport encoding detected from the payload's magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Plain,
    Gzip,
}

impl ContentEncoding {
    /// Detect the encoding from content, never from a file name.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::Plain
        }
    }
}

/// Raw upload as received from the transport layer.
#[derive(Debug)]
pub struct UploadedPayload {
    bytes: Vec<u8>,
    declared_size: Option<u64>,
}

impl UploadedPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            declared_size: None,
        }
    }

    /// Attach the size the client announced (e.g. `Content-Length`).
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn encoding(&self) -> ContentEncoding {
        ContentEncoding::sniff(&self.bytes)
    }
}

/// Decoded tab-separated text ready for rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    text: String,
    row_count: usize,
    encoding: ContentEncoding,
}

impl NormalizedTable {
    /// Build a table from already-decoded text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_encoding(text.into(), ContentEncoding::Plain)
    }

    fn with_encoding(text: String, encoding: ContentEncoding) -> Self {
        let non_blank = text.lines().filter(|line| !line.trim().is_empty()).count();
        Self {
            text,
            row_count: non_blank.saturating_sub(1),
            encoding,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of data rows (non-blank lines after the header).
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn encoding(&self) -> ContentEncoding {
        self.encoding
    }
}

/// Normalize an upload into text, enforcing `max_size` on both the
/// compressed and the decompressed form.
pub fn normalize(
    payload: UploadedPayload,
    max_size: u64,
) -> Result<NormalizedTable, ValidationError> {
    let too_large = ValidationError::PayloadTooLarge { limit: max_size };

    if payload.declared_size.is_some_and(|size| size > max_size)
        || payload.len() as u64 > max_size
    {
        return Err(too_large);
    }
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let encoding = payload.encoding();
    let bytes = match encoding {
        ContentEncoding::Plain => payload.bytes,
        ContentEncoding::Gzip => {
            let decoded = gunzip_bounded(&payload.bytes, max_size)?;
            if decoded.len() as u64 > max_size {
                return Err(too_large);
            }
            decoded
        }
    };

    let mut text = String::from_utf8(bytes)
        .map_err(|e| ValidationError::UnsupportedEncoding(e.utf8_error().to_string()))?;
    if text.starts_with(UTF8_BOM) {
        text.drain(..UTF8_BOM.len_utf8());
    }
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let table = NormalizedTable::with_encoding(text, encoding);
    tracing::debug!(
        encoding = ?table.encoding(),
        rows = table.row_count(),
        "Payload normalized"
    );
    Ok(table)
}

/// Decompress at most `max_size + 1` bytes so the caller can detect overflow
/// without materializing the rest of the stream.
fn gunzip_bounded(compressed: &[u8], max_size: u64) -> Result<Vec<u8>, ValidationError> {
    let mut decoded = Vec::new();
    MultiGzDecoder::new(compressed)
        .take(max_size.saturating_add(1))
        .read_to_end(&mut decoded)
        .map_err(|e| ValidationError::Decompression(e.to_string()))?;
    Ok(decoded)
}
