pub(crate) fn u32_to_bytes(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

pub(crate) fn bytes_to_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(
        bytes
            .try_into()
            .expect("Index out of bounds or incorrect length"),
    )
}

/// Big-endian encoding of `value` into `out`, left-padded with zeros
/// (`toByte` of RFC 8391).
pub(crate) fn to_byte(out: &mut [u8], mut value: u64) {
    for slot in out.iter_mut().rev() {
        *slot = (value & 0xff) as u8;
        value >>= 8;
    }
}
