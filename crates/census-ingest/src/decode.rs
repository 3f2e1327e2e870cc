//! Defensive JSON decoding for snapshot documents.
//!
//! The simulation occasionally writes stray control bytes into its save
//! files, so every document is cleaned to the printable ASCII range
//! before parsing. Decoding is a pure function over its input; parse
//! failures surface as a tagged [`DecodeError`], never as a panic.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Strip every byte outside the printable ASCII range (0x20-0x7E).
pub fn clean_payload(raw: &[u8]) -> String {
    raw.iter()
        .copied()
        .filter(|b| (0x20..=0x7E).contains(b))
        .map(char::from)
        .collect()
}

/// Decode a raw payload into an untyped JSON document.
pub fn decode_document(raw: &[u8]) -> Result<serde_json::Value, DecodeError> {
    decode_into(raw)
}

/// Decode a raw payload into a typed document.
///
/// Cleans the payload first, then deserializes. Returns
/// [`DecodeError::Empty`] when nothing printable remains, or
/// [`DecodeError::Json`] carrying the syntax error location.
pub fn decode_into<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    let cleaned = clean_payload(raw);
    if cleaned.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(&cleaned)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_bytes() {
        let raw = b"\x00{\"a\":\x07 1}\x1f";
        assert_eq!(clean_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn dirty_payload_decodes_like_clean_payload() {
        let clean = br#"{"simulatedTime": 120.5, "nBibites": 4}"#;
        let mut dirty = Vec::new();
        for chunk in clean.chunks(5) {
            dirty.extend_from_slice(chunk);
            dirty.push(0x01);
        }
        let from_clean = decode_document(clean).unwrap();
        let from_dirty = decode_document(&dirty).unwrap();
        assert_eq!(from_clean, from_dirty);
    }

    #[test]
    fn non_ascii_bytes_are_dropped() {
        // UTF-8 multibyte sequences are outside 0x20-0x7E and get removed.
        let raw = "{\"name\": \"caf\u{e9}\"}".as_bytes();
        let doc = decode_document(raw).unwrap();
        assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("caf"));
    }

    #[test]
    fn empty_payload_is_a_tagged_error() {
        assert!(matches!(decode_document(b""), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_document(b"\x00\x01\x02"),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn syntax_error_carries_location() {
        let err = decode_document(b"{\"a\": }").unwrap_err();
        assert!(matches!(err, DecodeError::Json { line: 1, .. }));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn typed_decode_reads_upstream_shapes() {
        #[derive(serde::Deserialize)]
        struct SceneDoc {
            #[serde(rename = "simulatedTime")]
            simulated_time: f64,
        }
        let doc: SceneDoc = decode_into(b"{\"simulatedTime\": 42.0}\x00").unwrap();
        assert_eq!(doc.simulated_time, 42.0);
    }
}
