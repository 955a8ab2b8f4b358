use std::collections::btree_map::{self, BTreeMap};
use std::io::Read;
use std::ops::Bound;
use std::path::Path;

use log::{debug, warn};

use crate::error::Result;
use crate::format::{decode_from_reader, decode_records};
use crate::io::load_index_bytes;
use crate::types::{IdxInfo, IdxRecord, Sense, Width};

/// Headword -> senses multimap built from an index file.
///
/// Keys are the raw headword bytes and iterate in byte order. The senses of
/// one key keep the order in which they were added, which for a decoded index
/// is the on-disk record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStore {
    items: BTreeMap<Vec<u8>, Vec<Sense>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sense for `key`. Duplicates are kept.
    pub fn add(&mut self, key: impl Into<Vec<u8>>, offset: u64, size: u64) {
        self.items
            .entry(key.into())
            .or_default()
            .push(Sense { offset, size });
    }

    /// All senses for `key` in insertion order; empty for unknown keys.
    pub fn get(&self, key: impl AsRef<[u8]>) -> &[Sense] {
        self.items
            .get(key.as_ref())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.items.contains_key(key.as_ref())
    }

    /// Number of distinct headwords.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of senses across all headwords.
    pub fn sense_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.items.keys().map(Vec::as_slice)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.items.iter(),
        }
    }

    /// Headwords starting with `prefix`, in key order.
    pub fn iter_prefix<'a>(
        &'a self,
        prefix: &'a [u8],
    ) -> impl Iterator<Item = (&'a [u8], &'a [Sense])> + 'a {
        self.items
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, senses)| (key.as_slice(), senses.as_slice()))
    }

    /// Build a store from already decompressed index bytes.
    ///
    /// Either every record decodes and the full store is returned, or the
    /// error is returned and nothing else.
    pub fn decode(data: &[u8], width: Width) -> Result<Self> {
        let mut store = IndexStore::new();
        let mut count = 0u64;
        for record in decode_records(data, width) {
            let record = record.map_err(|e| {
                warn!("index decode stopped after {} records: {}", count, e);
                e
            })?;
            store.add(record.key, record.offset, record.size);
            count += 1;
        }
        debug!(
            "decoded {} records into {} headwords ({:?})",
            count,
            store.len(),
            width
        );
        Ok(store)
    }

    /// Build a store from a reader yielding decompressed index bytes.
    pub fn from_reader<R: Read>(reader: R, width: Width) -> Result<Self> {
        let mut store = IndexStore::new();
        let count = decode_from_reader(reader, width, |record| {
            store.add(record.key, record.offset, record.size)
        })?;
        debug!("read {} records into {} headwords", count, store.len());
        Ok(store)
    }

    /// Open an index file, transparently gunzipping `*.gz` paths.
    pub fn open<P: AsRef<Path>>(path: P, info: &IdxInfo) -> Result<Self> {
        let bytes = load_index_bytes(path)?;
        Self::decode(&bytes, info.width())
    }
}

/// Read the index at `path` into an [`IndexStore`].
pub fn read_index<P: AsRef<Path>>(path: P, info: &IdxInfo) -> Result<IndexStore> {
    IndexStore::open(path, info)
}

pub struct Iter<'a> {
    inner: btree_map::Iter<'a, Vec<u8>, Vec<Sense>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [Sense]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, senses)| (key.as_slice(), senses.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a IndexStore {
    type Item = (&'a [u8], &'a [Sense]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Extend<IdxRecord> for IndexStore {
    fn extend<I: IntoIterator<Item = IdxRecord>>(&mut self, iter: I) {
        for record in iter {
            self.add(record.key, record.offset, record.size);
        }
    }
}

impl FromIterator<IdxRecord> for IndexStore {
    fn from_iter<I: IntoIterator<Item = IdxRecord>>(iter: I) -> Self {
        let mut store = IndexStore::new();
        store.extend(iter);
        store
    }
}
