use std::fmt;
use std::io;

/// The field a truncated record stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Key,
    Offset,
    Size,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::Key => "key",
            RecordField::Offset => "offset",
            RecordField::Size => "size",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdxError {
    #[error("Source Unavailable: {0}")]
    SourceUnavailable(#[from] io::Error),
    #[error("Decompression Failure: {0}")]
    DecompressionFailure(String),
    /// The stream ended inside a record. `filled` counts the bytes of `field`
    /// that were read; `record_start` is the stream offset of the record.
    #[error("Truncated Record: stream ended in {field} after {filled} bytes (record at byte {record_start})")]
    TruncatedRecord {
        field: RecordField,
        filled: usize,
        record_start: u64,
    },
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl From<binrw::Error> for IdxError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(io) => IdxError::SourceUnavailable(io),
            other => IdxError::InvalidArgument(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, IdxError>;
