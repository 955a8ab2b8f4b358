use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use log::debug;
use memmap2::Mmap;
use flate2::read::MultiGzDecoder;

use crate::error::{IdxError, Result};

/// Fully loaded, decompressed index bytes.
#[derive(Debug)]
pub enum IndexBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for IndexBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            IndexBytes::Mapped(mmap) => &mmap[..],
            IndexBytes::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// Does the file name end in `.gz`? A bare `.gz` name counts too.
pub fn is_gzip_path(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().ends_with(".gz")
}

/// Load the index at `path`, gunzipping it first when the name ends in `.gz`.
pub fn load_index_bytes<P: AsRef<Path>>(path: P) -> Result<IndexBytes> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    if is_gzip_path(path) {
        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;
        let bytes = inflate_gzip(&compressed)?;
        debug!(
            "loaded gzip index {} ({} -> {} bytes)",
            path.display(),
            compressed.len(),
            bytes.len()
        );
        return Ok(IndexBytes::Owned(bytes));
    }

    if file.metadata()?.len() == 0 {
        debug!("index {} is empty", path.display());
        return Ok(IndexBytes::Owned(Vec::new()));
    }

    // SAFETY: the mapping is read-only and lives no longer than the returned
    // value; callers must not truncate the file while it is mapped.
    let mmap = unsafe { Mmap::map(&file)? };
    debug!("mapped index {} ({} bytes)", path.display(), mmap.len());
    Ok(IndexBytes::Mapped(mmap))
}

/// Gunzip every member of `compressed`. Bytes after the last member that do
/// not form another valid member are an error.
pub fn inflate_gzip(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(|e| IdxError::DecompressionFailure(format!("gzip decode: {}", e)))?;
    Ok(out)
}
