pub mod error;
pub mod format;
pub mod index_store;
pub mod io;
mod shared_macros;
pub mod types;

pub use error::{IdxError, RecordField, Result};
pub use format::{decode_records, IdxWriter, RecordDecoder};
pub use index_store::{read_index, IndexStore};
pub use types::{IdxInfo, IdxRecord, Sense, Width};
