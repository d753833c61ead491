//! Line terminator conventions.

/// Carriage return.
pub const CR: u8 = 13;
/// Line feed.
pub const LF: u8 = 10;

/// The terminator convention of a text file, fixed when the file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\r`
    ClassicMac,
    /// `\n`
    #[default]
    Unix,
    /// `\r\n`
    Windows,
}

impl LineEnding {
    pub fn terminator(&self) -> &'static [u8] {
        match self {
            LineEnding::ClassicMac => b"\r",
            LineEnding::Unix => b"\n",
            LineEnding::Windows => b"\r\n",
        }
    }

    /// Bytes occupied by one terminator.
    pub fn width(&self) -> u64 {
        self.terminator().len() as u64
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEnding::ClassicMac => "cr",
            LineEnding::Unix => "lf",
            LineEnding::Windows => "crlf",
        }
    }

    /// Whether `bytes` ends with a complete terminator.
    pub fn terminates(&self, bytes: &[u8]) -> bool {
        bytes.ends_with(self.terminator())
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(LineEnding::ClassicMac.width(), 1);
        assert_eq!(LineEnding::Unix.width(), 1);
        assert_eq!(LineEnding::Windows.width(), 2);
    }

    #[test]
    fn default_is_unix() {
        assert_eq!(LineEnding::default(), LineEnding::Unix);
    }

    #[test]
    fn terminates_requires_full_sequence() {
        assert!(LineEnding::Windows.terminates(b"abc\r\n"));
        assert!(!LineEnding::Windows.terminates(b"abc\n"));
        assert!(!LineEnding::Windows.terminates(b"abc\r"));
        assert!(LineEnding::ClassicMac.terminates(b"abc\r"));
        assert!(!LineEnding::Unix.terminates(b""));
    }
}
