use std::io::{Cursor, Write};

use binrw::BinWrite;

use crate::error::{IdxError, Result};
use crate::types::{IdxRecord, Width};

#[derive(Debug, BinWrite)]
#[bw(big)]
struct LocationV32 {
    offset: u32,
    size: u32,
}

#[derive(Debug, BinWrite)]
#[bw(big)]
struct LocationV64 {
    offset: u64,
    size: u64,
}

/// Serializes records in index-file layout with a fixed integer width.
pub struct IdxWriter {
    width: Width,
    out: Cursor<Vec<u8>>,
    num_records: u64,
}

impl IdxWriter {
    pub fn new(width: Width) -> Self {
        Self {
            width,
            out: Cursor::new(Vec::new()),
            num_records: 0,
        }
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// Append one record. Keys may not contain a zero byte, and with 32-bit
    /// width both values must fit in a `u32`.
    pub fn push(&mut self, key: &[u8], offset: u64, size: u64) -> Result<()> {
        if key.contains(&0) {
            return Err(IdxError::InvalidArgument(format!(
                "key {:?} contains a zero byte",
                String::from_utf8_lossy(key)
            )));
        }

        match self.width {
            Width::Bits32 => {
                let offset = narrow(offset, "offset")?;
                let size = narrow(size, "size")?;
                self.write_key(key)?;
                LocationV32 { offset, size }.write(&mut self.out)?;
            }
            Width::Bits64 => {
                self.write_key(key)?;
                LocationV64 { offset, size }.write(&mut self.out)?;
            }
        }

        self.num_records += 1;
        Ok(())
    }

    pub fn push_record(&mut self, record: &IdxRecord) -> Result<()> {
        self.push(&record.key, record.offset, record.size)
    }

    fn write_key(&mut self, key: &[u8]) -> Result<()> {
        self.out.write_all(key)?;
        self.out.write_all(&[0])?;
        Ok(())
    }

    pub fn finish_into_bytes(self) -> Vec<u8> {
        self.out.into_inner()
    }

    pub fn finish_to_writer<W: Write>(self, writer: &mut W) -> Result<()> {
        let bytes = self.finish_into_bytes();
        writer.write_all(&bytes)?;
        Ok(())
    }
}

fn narrow(value: u64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        IdxError::InvalidArgument(format!(
            "{} {} does not fit in a 32-bit index",
            field, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_big_endian_32_bit_layout() {
        let mut writer = IdxWriter::new(Width::Bits32);
        writer.push(b"cat", 16, 5).unwrap();
        let bytes = writer.finish_into_bytes();

        assert_eq!(bytes, b"cat\x00\x00\x00\x00\x10\x00\x00\x00\x05".to_vec());
    }

    #[test]
    fn writes_big_endian_64_bit_layout() {
        let mut writer = IdxWriter::new(Width::Bits64);
        writer.push(b"a", 0x0102_0304_0506_0708, 1).unwrap();
        let bytes = writer.finish_into_bytes();

        let mut expected = b"a\x00".to_vec();
        expected.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn rejects_key_with_zero_byte() {
        let mut writer = IdxWriter::new(Width::Bits32);
        let err = writer.push(b"ca\x00t", 0, 0).unwrap_err();
        assert!(matches!(err, IdxError::InvalidArgument(_)));
        assert_eq!(writer.num_records(), 0);
        assert!(writer.finish_into_bytes().is_empty());
    }

    #[test]
    fn rejects_values_wider_than_32_bits() {
        let mut writer = IdxWriter::new(Width::Bits32);
        assert!(matches!(
            writer.push(b"big", u32::MAX as u64 + 1, 0),
            Err(IdxError::InvalidArgument(_))
        ));
        assert!(matches!(
            writer.push(b"big", 0, u64::MAX),
            Err(IdxError::InvalidArgument(_))
        ));
        writer.push(b"max", u32::MAX as u64, u32::MAX as u64).unwrap();
        assert_eq!(writer.num_records(), 1);
    }

    #[test]
    fn finish_to_writer_matches_bytes() {
        let mut writer = IdxWriter::new(Width::Bits32);
        writer.push(b"cat", 16, 5).unwrap();
        let mut out = Vec::new();
        writer.finish_to_writer(&mut out).unwrap();

        assert_eq!(out, b"cat\x00\x00\x00\x00\x10\x00\x00\x00\x05".to_vec());
    }
}
