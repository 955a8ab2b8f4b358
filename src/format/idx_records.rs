use std::io::{ErrorKind, Read};

use log::trace;

use crate::error::{IdxError, RecordField, Result};
use crate::types::{IdxRecord, Width};

const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug)]
enum DecodeState {
    ReadingKey,
    ReadingOffset { key: Vec<u8> },
    ReadingSize { key: Vec<u8>, offset: u64 },
}

/// Collects exactly `width.bytes()` bytes, then yields the decoded integer.
#[derive(Debug, Default)]
struct IntAccumulator {
    buf: [u8; 8],
    filled: usize,
}

impl IntAccumulator {
    fn push(&mut self, byte: u8, width: Width) -> Option<u64> {
        self.buf[self.filled] = byte;
        self.filled += 1;
        if self.filled < width.bytes() {
            return None;
        }
        self.filled = 0;
        Some(width.read_be(&self.buf))
    }
}

/// Push-style decoder for `<key>\0<offset:W><size:W>` records.
///
/// Bytes are fed one at a time; a record is returned as soon as its last size
/// byte arrives. Call [`RecordDecoder::finish`] once the input is exhausted to
/// find out whether it ended on a record boundary.
#[derive(Debug)]
pub struct RecordDecoder {
    width: Width,
    state: DecodeState,
    key_buf: Vec<u8>,
    ints: IntAccumulator,
    consumed: u64,
    record_start: u64,
}

impl RecordDecoder {
    pub fn new(width: Width) -> Self {
        RecordDecoder {
            width,
            state: DecodeState::ReadingKey,
            key_buf: Vec::new(),
            ints: IntAccumulator::default(),
            consumed: 0,
            record_start: 0,
        }
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    pub fn is_at_record_boundary(&self) -> bool {
        matches!(self.state, DecodeState::ReadingKey) && self.key_buf.is_empty()
    }

    pub fn push(&mut self, byte: u8) -> Option<IdxRecord> {
        self.consumed += 1;
        match &mut self.state {
            DecodeState::ReadingKey => {
                if byte != 0 {
                    self.key_buf.push(byte);
                    return None;
                }
                let key = std::mem::take(&mut self.key_buf);
                if key.is_empty() {
                    trace!("empty headword in record at byte {}", self.record_start);
                }
                self.state = DecodeState::ReadingOffset { key };
                None
            }
            DecodeState::ReadingOffset { key } => {
                let offset = self.ints.push(byte, self.width)?;
                let key = std::mem::take(key);
                self.state = DecodeState::ReadingSize { key, offset };
                None
            }
            DecodeState::ReadingSize { key, offset } => {
                let size = self.ints.push(byte, self.width)?;
                let record = IdxRecord {
                    key: std::mem::take(key),
                    offset: *offset,
                    size,
                };
                self.state = DecodeState::ReadingKey;
                self.record_start = self.consumed;
                Some(record)
            }
        }
    }

    /// Succeeds only if the bytes pushed so far end exactly on a record boundary.
    pub fn finish(&self) -> Result<()> {
        let (field, filled) = match &self.state {
            DecodeState::ReadingKey if self.key_buf.is_empty() => return Ok(()),
            DecodeState::ReadingKey => (RecordField::Key, self.key_buf.len()),
            DecodeState::ReadingOffset { .. } => (RecordField::Offset, self.ints.filled),
            DecodeState::ReadingSize { .. } => (RecordField::Size, self.ints.filled),
        };
        Err(IdxError::TruncatedRecord {
            field,
            filled,
            record_start: self.record_start,
        })
    }
}

/// Lazy iterator over the records of an in-memory index.
///
/// Yields `Ok` records in file order. If the input ends mid-record the last
/// item is the `TruncatedRecord` error; afterwards the iterator is exhausted.
#[derive(Debug)]
pub struct IdxRecords<'a> {
    data: &'a [u8],
    pos: usize,
    decoder: RecordDecoder,
    done: bool,
}

impl<'a> IdxRecords<'a> {
    pub fn new(data: &'a [u8], width: Width) -> Self {
        IdxRecords {
            data,
            pos: 0,
            decoder: RecordDecoder::new(width),
            done: false,
        }
    }
}

impl Iterator for IdxRecords<'_> {
    type Item = Result<IdxRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(&byte) = self.data.get(self.pos) {
            self.pos += 1;
            if let Some(record) = self.decoder.push(byte) {
                return Some(Ok(record));
            }
        }

        self.done = true;
        self.decoder.finish().err().map(Err)
    }
}

impl std::iter::FusedIterator for IdxRecords<'_> {}

/// Decode the records of an already decompressed index buffer.
pub fn decode_records(data: &[u8], width: Width) -> IdxRecords<'_> {
    IdxRecords::new(data, width)
}

/// Stream `reader` through a [`RecordDecoder`], handing each record to `sink`.
///
/// Returns the number of records decoded. Records are passed on as they
/// complete, so on error `sink` has already seen the records before the bad tail.
/// `InvalidData` / `InvalidInput` read errors, as raised by decompressing
/// readers, become `DecompressionFailure`; other read errors `SourceUnavailable`.
pub fn decode_from_reader<R, F>(mut reader: R, width: Width, mut sink: F) -> Result<u64>
where
    R: Read,
    F: FnMut(IdxRecord),
{
    let mut decoder = RecordDecoder::new(width);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut count = 0u64;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::InvalidInput) => {
                return Err(IdxError::DecompressionFailure(e.to_string()))
            }
            Err(e) => return Err(IdxError::SourceUnavailable(e)),
        };
        for &byte in &chunk[..n] {
            if let Some(record) = decoder.push(byte) {
                sink(record);
                count += 1;
            }
        }
    }

    decoder.finish()?;
    Ok(count)
}
