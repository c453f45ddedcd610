//! The wire-format contract (§4.4): byte layout facts every generator must
//! agree on, regardless of target language. This module holds no logic, only
//! the constants and size arithmetic generators call into so the layout
//! rules live in exactly one place.

use crate::token::BaseType;

/// Every record (struct, message, union) and the top-level encoding of a
/// schema-valued byte buffer is little-endian throughout; integers are
/// two's complement.
pub const BYTE_ORDER_LITTLE_ENDIAN: bool = true;

/// Length prefixes on `string`, `array`, and `map`, and the `byteLength`
/// field on `message`, are this many bytes wide.
pub const LENGTH_PREFIX_SIZE: u32 = 4;

/// `guid` is encoded as Microsoft's "mixed-endian" `GUID` struct layout: the
/// first three fields are little-endian, the last two are big-endian byte
/// arrays.
pub const GUID_BYTE_LEN: u32 = 16;
/// Widths of the three little-endian groups (`Data1`, `Data2`, `Data3`); the
/// remaining 8 bytes (`Data4`) are a big-endian byte array written as-is.
const GUID_LITTLE_ENDIAN_FIELD_WIDTHS: [u32; 3] = [4, 2, 2];

/// A message's field list is terminated by a field index of zero; real
/// field indices start at 1 (§3 invariant 5, §4.4).
pub const MESSAGE_END_SENTINEL: u8 = 0;

// `Array(Byte)` is the one specialization in the contract: a generator must
// emit and consume it as a raw byte run (length prefix + the bytes
// themselves, same payload shape as `String`'s, but with its own length
// prefix) rather than as a general array of one-byte elements. The derived
// size math doesn't change — still a length prefix plus N bytes either way
// — only the concrete encode/decode path a generator takes.

/// Fixed encoded width in bytes of a scalar base type, or `None` for
/// `string`, which is length-prefixed and therefore variable.
pub fn scalar_size(base: BaseType) -> Option<u32> {
    base.fixed_size()
}

/// `(offset, length)` for each of the four groups in a `guid`'s mixed-endian
/// layout: three little-endian groups followed by one 8-byte big-endian
/// byte array.
pub fn guid_mixed_endian_groups() -> [(usize, usize); 4] {
    let mut offset = 0;
    let mut groups = [(0usize, 0usize); 4];
    for (i, w) in GUID_LITTLE_ENDIAN_FIELD_WIDTHS.iter().enumerate() {
        groups[i] = (offset, *w as usize);
        offset += *w as usize;
    }
    groups[3] = (offset, 8);
    groups
}
