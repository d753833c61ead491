//! Byte-to-text decoding for line contents.

use std::str::Utf8Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextDecoding {
    /// Strict UTF-8; invalid sequences fail the line.
    #[default]
    Utf8,
    /// Every byte becomes the scalar with the same value (ISO 8859-1).
    /// Never fails.
    Latin1,
}

impl TextDecoding {
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, Utf8Error> {
        match self {
            TextDecoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.utf8_error()),
            TextDecoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_accepts_multibyte() {
        let text = TextDecoding::Utf8.decode("héllo".as_bytes().to_vec()).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn utf8_rejects_invalid() {
        let err = TextDecoding::Utf8.decode(vec![b'a', 0xFF, b'b']).unwrap_err();
        assert_eq!(err.valid_up_to(), 1);
    }

    #[test]
    fn latin1_maps_bytes_to_scalars() {
        let text = TextDecoding::Latin1.decode(vec![b'a', 0xE9, 0xFF]).unwrap();
        assert_eq!(text, "a\u{e9}\u{ff}");
    }
}
