use std::borrow::Cow;

use crate::error::{IdxError, Result};
use crate::shared_macros::{read_be_u32, read_be_u64};

/// One location of a headword inside the companion data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sense {
    pub offset: u64,
    pub size: u64,
}

/// Byte width of the offset/size integers, fixed for a whole index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Width {
    #[default]
    Bits32,
    Bits64,
}

impl Width {
    /// Map the `idxoffsetbits` value of a `.ifo` file.
    pub fn from_offset_bits(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Width::Bits32),
            64 => Ok(Width::Bits64),
            other => Err(IdxError::InvalidArgument(format!(
                "idxoffsetbits must be 32 or 64, got {}",
                other
            ))),
        }
    }

    /// Number of bytes per integer field: 4 or 8.
    pub fn bytes(&self) -> usize {
        match self {
            Width::Bits32 => 4usize,
            Width::Bits64 => 8usize,
        }
    }

    /// Decode the first `self.bytes()` bytes of `buf` as a big-endian unsigned integer.
    pub(crate) fn read_be(&self, buf: &[u8; 8]) -> u64 {
        match self {
            Width::Bits32 => read_be_u32(buf),
            Width::Bits64 => read_be_u64(buf),
        }
    }
}

/// Metadata handed in by the caller; only the integer width matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdxInfo {
    pub is_64: bool,
}

impl IdxInfo {
    pub fn from_offset_bits(bits: u32) -> Result<Self> {
        let width = Width::from_offset_bits(bits)?;
        Ok(IdxInfo {
            is_64: width == Width::Bits64,
        })
    }

    pub fn width(&self) -> Width {
        if self.is_64 {
            Width::Bits64
        } else {
            Width::Bits32
        }
    }
}

impl From<Width> for IdxInfo {
    fn from(width: Width) -> Self {
        IdxInfo {
            is_64: width == Width::Bits64,
        }
    }
}

/// A decoded `(key, offset, size)` triple. The key keeps the raw bytes found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxRecord {
    pub key: Vec<u8>,
    pub offset: u64,
    pub size: u64,
}

impl IdxRecord {
    pub fn new(key: impl Into<Vec<u8>>, offset: u64, size: u64) -> Self {
        IdxRecord {
            key: key.into(),
            offset,
            size,
        }
    }

    /// Headword as text; invalid UTF-8 sequences are replaced.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    pub fn sense(&self) -> Sense {
        Sense {
            offset: self.offset,
            size: self.size,
        }
    }
}
