//! Minimal RLP encoding.
//!
//! Thor transactions go over the wire as RLP, so we need an encoder — and
//! only an encoder. Receipts and blocks come back as JSON, decoding never
//! happens, and a third-party RLP crate would be more surface than the
//! three cases we use: byte strings, trimmed big-endian integers, and
//! lists.
//!
//! RLP in one paragraph: a single byte below 0x80 encodes itself; other
//! byte strings get a length header starting at 0x80 (with a
//! length-of-length form past 55 bytes); lists get the same scheme starting
//! at 0xc0 over their concatenated encoded items. Integers are their
//! minimal big-endian bytes — no leading zeros, and zero itself is the
//! empty string.

/// Encodes a byte string.
pub fn bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }
    let mut out = header(0x80, data.len());
    out.extend_from_slice(data);
    out
}

/// Encodes an unsigned integer as its minimal big-endian byte string.
pub fn uint(value: u128) -> Vec<u8> {
    let be = value.to_be_bytes();
    let first = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    bytes(&be[first..])
}

/// Wraps already-encoded, concatenated items into a list.
pub fn list(payload: &[u8]) -> Vec<u8> {
    let mut out = header(0xc0, payload.len());
    out.extend_from_slice(payload);
    out
}

/// Builds the length header for strings (`base = 0x80`) or lists
/// (`base = 0xc0`).
fn header(base: u8, len: usize) -> Vec<u8> {
    if len <= 55 {
        vec![base + len as u8]
    } else {
        let len_be = (len as u64).to_be_bytes();
        let first = len_be.iter().position(|&b| b != 0).unwrap_or(7);
        let len_of_len = len_be.len() - first;
        let mut out = Vec::with_capacity(1 + len_of_len);
        out.push(base + 55 + len_of_len as u8);
        out.extend_from_slice(&len_be[first..]);
        out
    }
}
