//! Newline-delimited JSON frame decoder.
//!
//! The decoder accepts raw bytes in whatever chunks the transport delivers
//! them and yields complete records. Only the bytes after the last newline
//! are carried between calls.
//!
//! A segment is a record only if, after trimming, it starts with `{`, ends
//! with `}` and parses as a JSON object. Everything else is dropped without
//! surfacing an error: partial reads and line noise are normal on a serial
//! link.

use serde_json::Value;
use tracing::trace;

use super::frame::TelemetryFrame;

/// Record separator.
const SEPARATOR: u8 = b'\n';

/// Longest accepted record in bytes. Longer segments are line noise.
pub const MAX_RECORD_LEN: usize = 4096;

/// Streaming frame decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes after the last separator seen so far.
    tail: Vec<u8>,
    /// Set when the tail overflowed; everything up to the next separator
    /// belongs to an over-long record and is skipped.
    skipping: bool,
}

impl FrameDecoder {
    /// Create a decoder with an empty tail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every record completed by it, oldest first.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<TelemetryFrame> {
        let mut frames = Vec::new();
        let mut rest = bytes;

        while let Some(pos) = rest.iter().position(|&b| b == SEPARATOR) {
            let (segment, after) = rest.split_at(pos);
            rest = &after[1..];

            if self.skipping {
                self.skipping = false;
                self.tail.clear();
                continue;
            }

            let record = if self.tail.is_empty() {
                decode_segment(segment)
            } else {
                self.tail.extend_from_slice(segment);
                let record = decode_segment(&self.tail);
                self.tail.clear();
                record
            };

            frames.extend(record);
        }

        if !self.skipping {
            self.tail.extend_from_slice(rest);
            if self.tail.len() > MAX_RECORD_LEN {
                trace!(len = self.tail.len(), "Dropping over-long partial record");
                self.tail.clear();
                self.skipping = true;
            }
        }

        frames
    }

    /// Feed a chunk and return the in-order merge of every record it
    /// completed, or `None` when it completed none.
    ///
    /// Older records in the batch are superseded field by field, so a
    /// consumer polling slower than the board never sees a backlog.
    pub fn push_merged(&mut self, bytes: &[u8]) -> Option<TelemetryFrame> {
        self.push(bytes)
            .into_iter()
            .reduce(|mut merged, frame| {
                merged.merge(&frame);
                merged
            })
    }

    /// Number of buffered bytes waiting for a separator.
    pub fn pending(&self) -> usize {
        self.tail.len()
    }

    /// Drop any buffered partial record.
    pub fn reset(&mut self) {
        self.tail.clear();
        self.skipping = false;
    }
}

/// Decode one complete segment (without its separator).
fn decode_segment(segment: &[u8]) -> Option<TelemetryFrame> {
    if segment.len() > MAX_RECORD_LEN {
        trace!(len = segment.len(), "Dropping over-long record");
        return None;
    }

    let text = String::from_utf8_lossy(segment);
    let text = text.trim();
    if !(text.starts_with('{') && text.ends_with('}')) {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(TelemetryFrame::from_json_object(&object)),
        Ok(_) => None,
        Err(e) => {
            trace!(error = %e, "Discarding malformed record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_record() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"{\"r\":1.5,\"p\":-2}\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].roll(), Some(1.5));
        assert_eq!(frames[0].pitch(), Some(-2.0));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_partial_record_is_carried() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.push(b"{\"r\":1").is_empty());
        assert_eq!(decoder.pending(), 6);

        let frames = decoder.push(b"0}\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].roll(), Some(10.0));
    }

    #[test]
    fn test_crlf_and_whitespace_are_trimmed() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"  {\"alt\":120}  \r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].altitude(), Some(120.0));
    }

    #[test]
    fn test_malformed_segments_are_discarded() {
        let mut decoder = FrameDecoder::new();
        let input = b"AI ONLINE\n{\"r\":1,\n\"p\":2}\n{broken}\n[1,2]\n{\"r\":3}\n";

        let frames = decoder.push(input);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].roll(), Some(3.0));
    }

    #[test]
    fn test_invalid_utf8_does_not_stop_stream() {
        let mut decoder = FrameDecoder::new();
        let mut input = vec![0xff, 0xfe, b'\n'];
        input.extend_from_slice(b"{\"p\":4}\n");

        let frames = decoder.push(&input);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pitch(), Some(4.0));
    }

    #[test]
    fn test_push_merged_keeps_newest_values() {
        let mut decoder = FrameDecoder::new();
        let merged = decoder
            .push_merged(b"{\"r\":10,\"p\":0}\n{\"p\":5}\n")
            .unwrap();

        assert_eq!(merged.roll(), Some(10.0));
        assert_eq!(merged.pitch(), Some(5.0));
    }

    #[test]
    fn test_push_merged_none_without_complete_record() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push_merged(b"{\"r\":10").is_none());
        assert!(decoder.push_merged(b"garbage\n").is_none());
    }

    #[test]
    fn test_over_long_partial_is_skipped_until_separator() {
        let mut decoder = FrameDecoder::new();
        let mut noise = vec![b'{'];
        noise.extend(std::iter::repeat(b'x').take(MAX_RECORD_LEN + 10));

        assert!(decoder.push(&noise).is_empty());
        assert_eq!(decoder.pending(), 0);

        let frames = decoder.push(b"xx}\n{\"r\":2}\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].roll(), Some(2.0));
    }

    #[test]
    fn test_reset_drops_tail() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"{\"r\":");
        decoder.reset();
        assert!(decoder.push(b"5}\n").is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn stream() -> impl Strategy<Value = Vec<u8>> {
            let record = prop_oneof![
                (-180.0..180.0_f64, -90.0..90.0_f64)
                    .prop_map(|(r, p)| format!("{{\"r\":{r},\"p\":{p}}}\n").into_bytes()),
                (0.0..5000.0_f64).prop_map(|a| format!("{{\"alt\":{a}}}\n").into_bytes()),
                "[a-z{}:,\"0-9 ]{0,24}\n".prop_map(String::into_bytes),
                prop::collection::vec(any::<u8>(), 0..16),
            ];
            prop::collection::vec(record, 0..24).prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn test_chunk_boundary_independence(
                bytes in stream(),
                cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12)
            ) {
                let whole = FrameDecoder::new().push(&bytes);

                let mut offsets: Vec<usize> = cuts
                    .iter()
                    .map(|i| i.index(bytes.len() + 1))
                    .collect();
                offsets.sort_unstable();

                let mut decoder = FrameDecoder::new();
                let mut chunked = Vec::new();
                let mut start = 0;
                for offset in offsets.into_iter().chain(std::iter::once(bytes.len())) {
                    chunked.extend(decoder.push(&bytes[start..offset]));
                    start = offset;
                }

                prop_assert_eq!(whole, chunked);
            }
        }
    }
}
