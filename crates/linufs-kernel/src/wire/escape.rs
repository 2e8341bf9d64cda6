//! Parameter escaping.
//!
//! Every input byte becomes a fixed-width triplet: `%` followed by two
//! lowercase hex digits. `"a/b"` → `"%61%2f%62"`. Decoding accepts either
//! hex case.

use super::WireError;

/// Width of one escaped byte.
pub const TRIPLET_LEN: usize = 3;

/// Escape every byte of `bytes`.
pub fn escape(bytes: impl AsRef<[u8]>) -> String {
    let bytes = bytes.as_ref();
    let mut out = String::with_capacity(bytes.len() * TRIPLET_LEN);
    let mut pair = [0u8; 2];
    for &b in bytes {
        // Two output bytes for one input byte cannot fail.
        if hex::encode_to_slice([b], &mut pair).is_ok() {
            out.push('%');
            out.push(pair[0] as char);
            out.push(pair[1] as char);
        }
    }
    out
}

/// Reverse [`escape`].
pub fn unescape(escaped: &str) -> Result<Vec<u8>, WireError> {
    let raw = escaped.as_bytes();
    if raw.len() % TRIPLET_LEN != 0 {
        return Err(WireError::BadEscape {
            position: raw.len() - raw.len() % TRIPLET_LEN,
        });
    }

    let mut out = Vec::with_capacity(raw.len() / TRIPLET_LEN);
    for (i, triplet) in raw.chunks_exact(TRIPLET_LEN).enumerate() {
        let position = i * TRIPLET_LEN;
        if triplet[0] != b'%' {
            return Err(WireError::BadEscape { position });
        }
        let mut byte = [0u8; 1];
        hex::decode_to_slice(&triplet[1..], &mut byte)
            .map_err(|_| WireError::BadEscape { position })?;
        out.push(byte[0]);
    }
    Ok(out)
}

/// Reverse [`escape`] for a text parameter such as a name.
pub fn unescape_str(escaped: &str) -> Result<String, WireError> {
    String::from_utf8(unescape(escaped)?).map_err(|_| WireError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_every_byte() {
        assert_eq!(escape("ab"), "%61%62");
        assert_eq!(escape("a/b c"), "%61%2f%62%20%63");
        assert_eq!(escape([0u8, 255]), "%00%ff");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_width() {
        let name = "test.txt";
        assert_eq!(escape(name).len(), name.len() * TRIPLET_LEN);
    }

    #[test]
    fn test_unescape_accepts_either_case() {
        assert_eq!(unescape("%2F%2f").unwrap(), b"//");
    }

    #[test]
    fn test_unescape_binary() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(unescape(&escape(&data)).unwrap(), data);
    }

    #[test]
    fn test_unescape_rejects_malformed() {
        assert_eq!(unescape("%6"), Err(WireError::BadEscape { position: 0 }));
        assert_eq!(unescape("%61x62"), Err(WireError::BadEscape { position: 3 }));
        assert_eq!(unescape("%zz"), Err(WireError::BadEscape { position: 0 }));
    }

    #[test]
    fn test_unescape_str_rejects_invalid_utf8() {
        assert_eq!(unescape_str("%ff"), Err(WireError::NotUtf8));
        assert_eq!(unescape_str("%74%65%73%74").unwrap(), "test");
    }
}
