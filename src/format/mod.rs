pub mod idx_records;
pub mod idx_writer;

pub use idx_records::{decode_from_reader, decode_records, IdxRecords, RecordDecoder};
pub use idx_writer::IdxWriter;
