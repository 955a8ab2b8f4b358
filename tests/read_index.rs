//! Reading index files from disk, plain and gzip-compressed.

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use stardict_idx::{
        read_index, IdxError, IdxInfo, IdxWriter, IndexStore, RecordField, Sense, Width,
    };
    use tempfile::TempDir;

    fn entries() -> Vec<(&'static str, u64, u64)> {
        vec![
            ("a", 0, 10),
            ("run", 10, 200),
            ("zebra", 210, 33),
            ("run", 243, 90),
            ("über", 333, 7),
        ]
    }

    fn encode(width: Width) -> Vec<u8> {
        let mut writer = IdxWriter::new(width);
        for (key, offset, size) in entries() {
            writer.push(key.as_bytes(), offset, size).unwrap();
        }
        writer.finish_into_bytes()
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn assert_expected(store: &IndexStore) {
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.get("run"),
            &[
                Sense { offset: 10, size: 200 },
                Sense { offset: 243, size: 90 }
            ]
        );
        assert_eq!(store.get("über"), &[Sense { offset: 333, size: 7 }]);
        assert!(store.get("missing").is_empty());
    }

    #[test]
    fn reads_plain_32_bit_index() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "dict.idx", &encode(Width::Bits32));

        let store = read_index(&path, &IdxInfo { is_64: false }).unwrap();
        assert_expected(&store);
    }

    #[test]
    fn reads_plain_64_bit_index() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "dict.idx", &encode(Width::Bits64));

        let info = IdxInfo::from_offset_bits(64).unwrap();
        let store = IndexStore::open(&path, &info).unwrap();
        assert_expected(&store);
    }

    #[test]
    fn reads_gzip_index_by_suffix() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "dict.idx.gz", &gzip(&encode(Width::Bits64)));

        let store = read_index(&path, &IdxInfo { is_64: true }).unwrap();
        assert_expected(&store);
    }

    #[test]
    fn reads_multi_member_gzip_index() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(Width::Bits32);
        // Split on a record boundary: "a" and "run" make up the first 10 + 12 bytes.
        let (head, tail) = bytes.split_at(22);
        let mut packed = gzip(head);
        packed.extend_from_slice(&gzip(tail));
        let path = write_file(dir.path(), "dict.idx.gz", &packed);

        let store = read_index(&path, &IdxInfo::default()).unwrap();
        assert_expected(&store);
        assert_eq!(store.get("zebra"), &[Sense { offset: 210, size: 33 }]);
    }

    #[test]
    fn member_split_mid_record_still_decodes() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(Width::Bits64);
        let (head, tail) = bytes.split_at(5);
        let mut packed = gzip(head);
        packed.extend_from_slice(&gzip(tail));
        let path = write_file(dir.path(), "dict.idx.gz", &packed);

        assert_expected(&read_index(&path, &IdxInfo { is_64: true }).unwrap());
    }

    #[test]
    fn trailing_bytes_after_gzip_member_fail() {
        let dir = TempDir::new().unwrap();
        let mut packed = gzip(&encode(Width::Bits32));
        packed.extend_from_slice(b"garbage");
        let path = write_file(dir.path(), "dict.idx.gz", &packed);

        assert!(matches!(
            read_index(&path, &IdxInfo::default()),
            Err(IdxError::DecompressionFailure(_))
        ));
    }

    #[test]
    fn empty_file_decodes_to_empty_store() {
        let dir = TempDir::new().unwrap();
        let plain = write_file(dir.path(), "empty.idx", &[]);

        assert!(read_index(&plain, &IdxInfo::default()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        let result = read_index(dir.path().join("absent.idx"), &IdxInfo::default());

        match result {
            Err(IdxError::SourceUnavailable(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn corrupt_gzip_is_decompression_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "broken.idx.gz", b"definitely not gzip data");

        assert!(matches!(
            read_index(&path, &IdxInfo::default()),
            Err(IdxError::DecompressionFailure(_))
        ));
    }

    #[test]
    fn truncated_file_returns_error_not_partial_store() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(Width::Bits32);
        let path = write_file(dir.path(), "short.idx", &bytes[..bytes.len() - 3]);

        assert!(matches!(
            read_index(&path, &IdxInfo::default()),
            Err(IdxError::TruncatedRecord {
                field: RecordField::Size,
                filled: 1,
                ..
            })
        ));
    }

    #[test]
    fn store_can_be_shared_across_threads() {
        let store = IndexStore::decode(&encode(Width::Bits32), Width::Bits32).unwrap();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.get("run").len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
