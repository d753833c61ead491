//! Fuzz testing for the line index.
//!
//! Builds a LineIndex over arbitrary bytes for each line ending and checks
//! every line span against a direct search for the terminator. Also checks
//! that scanning through a ByteSource agrees with indexing a slice.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bigfile::{LineEnding, LineIndex, ResidentFile};

#[derive(Debug, Arbitrary)]
struct IndexInput {
    ending: FuzzEnding,
    data: Vec<u8>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzEnding {
    ClassicMac,
    Unix,
    Windows,
}

impl From<FuzzEnding> for LineEnding {
    fn from(ending: FuzzEnding) -> Self {
        match ending {
            FuzzEnding::ClassicMac => LineEnding::ClassicMac,
            FuzzEnding::Unix => LineEnding::Unix,
            FuzzEnding::Windows => LineEnding::Windows,
        }
    }
}

fn naive_spans(data: &[u8], ending: LineEnding) -> (Vec<(usize, usize)>, bool) {
    if data.is_empty() {
        return (Vec::new(), false);
    }

    let term = ending.terminator();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + term.len() <= data.len() {
        if &data[i..i + term.len()] == term {
            spans.push((start, i));
            i += term.len();
            start = i;
        } else {
            i += 1;
        }
    }

    let trailing = start == data.len();
    if !trailing {
        spans.push((start, data.len()));
    }
    (spans, trailing)
}

fuzz_target!(|input: IndexInput| {
    let ending = LineEnding::from(input.ending);
    let index = LineIndex::from_bytes(&input.data, ending);
    let (spans, trailing) = naive_spans(&input.data, ending);

    assert_eq!(index.line_count(), spans.len() as u64);
    assert_eq!(index.trailing_line_feed(), trailing);
    assert_eq!(ending.terminates(&input.data), trailing);

    for (n, &(start, end)) in spans.iter().enumerate() {
        let span = index.line_span(n as u64).unwrap();
        assert_eq!(span, start as u64..end as u64);
    }
    assert!(index.line_span(spans.len() as u64).is_none());

    let mut source = ResidentFile::from_bytes(input.data.clone());
    let scanned = LineIndex::build(&mut source, ending).unwrap();
    assert_eq!(scanned.starts(), index.starts());
    assert_eq!(scanned.trailing_line_feed(), index.trailing_line_feed());
});
