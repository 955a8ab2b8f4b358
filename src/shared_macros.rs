// Generates `read_be_<type>` helpers that decode the leading bytes of an
// 8-byte scratch buffer as a big-endian integer widened to u64.
macro_rules! generate_read_be_fns {
    ($($type:ty);*) => {
        $(
            paste::item! {
                #[inline]
                pub(crate) fn [< read_be_ $type >](buf: &[u8; 8]) -> u64 {
                    const SIZE: usize = std::mem::size_of::<$type>();
                    let mut bytes = [0u8; SIZE];
                    bytes.copy_from_slice(&buf[..SIZE]);
                    u64::from(<$type>::from_be_bytes(bytes))
                }
            }
        )*
    };
}

generate_read_be_fns!(
    u32;
    u64
);
