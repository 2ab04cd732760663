//! Streaming frame synchroniser
//!
//! Extracts CRC-verified correction frames from an arbitrarily chunked byte
//! stream. The sequence of extracted frames depends only on the concatenation
//! of all bytes fed, never on where the chunk boundaries fall.

use std::sync::Arc;
use tracing::{debug, trace};

use super::crc::{crc24q, read_trailer};
use super::cursor::ByteCursor;
use crate::types::{
    CorrectionFrame, FRAME_HEADER_LEN, FRAME_MARKER, FRAME_TRAILER_LEN, PAYLOAD_LEN_MASK,
};

/// Outcome of one synchroniser step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// A complete frame was extracted and consumed from the buffer
    Frame(CorrectionFrame),

    /// Bytes were discarded while searching for the next frame boundary
    Resync { discarded: usize, reason: ResyncReason },

    /// The buffer holds no complete frame; feed more bytes
    NeedMore,
}

/// Why bytes were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncReason {
    /// The buffer did not start with the marker byte
    NoMarker,

    /// A candidate frame failed its trailer check; only the marker is dropped
    TrailerMismatch,
}

/// Running counters for a synchroniser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub frames: u64,
    pub bytes_discarded: u64,
    pub trailer_failures: u64,
}

/// Stateful scanner over an append-only byte stream.
#[derive(Debug, Default)]
pub struct FrameSynchronizer {
    cursor: ByteCursor,
    stats: SyncStats,
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and iterate the frames that are now complete.
    ///
    /// The iterator is lazy. Frames it did not reach before being dropped
    /// stay buffered and are returned by the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Frames<'_> {
        self.extend(bytes);
        self.frames()
    }

    /// Append bytes without scanning.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.cursor.extend(bytes);
    }

    /// Iterate the frames extractable from the bytes already buffered.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { sync: self }
    }

    /// Perform one scan step.
    pub fn step(&mut self) -> SyncStep {
        let buffered = self.cursor.remaining();

        let Some(&first) = buffered.first() else {
            return SyncStep::NeedMore;
        };

        if first != FRAME_MARKER {
            // Dropping a run of non-marker bytes at once is equivalent to
            // dropping them one by one: none of them can start a frame.
            let skip = buffered.iter().position(|&b| b == FRAME_MARKER).unwrap_or(buffered.len());
            self.discard(skip);
            trace!("Skipped {} bytes before marker", skip);
            return SyncStep::Resync { discarded: skip, reason: ResyncReason::NoMarker };
        }

        if buffered.len() < FRAME_HEADER_LEN {
            return SyncStep::NeedMore;
        }

        let length_word = u16::from_be_bytes([buffered[1], buffered[2]]);
        let payload_len = usize::from(length_word & PAYLOAD_LEN_MASK);
        let body_len = FRAME_HEADER_LEN + payload_len;
        let frame_len = body_len + FRAME_TRAILER_LEN;

        if buffered.len() < frame_len {
            return SyncStep::NeedMore;
        }

        let received =
            read_trailer(&[buffered[body_len], buffered[body_len + 1], buffered[body_len + 2]]);
        let computed = crc24q(&buffered[..body_len]);

        if received != computed {
            debug!(
                "Trailer mismatch for {}-byte candidate (got {:06X}, expected {:06X}); dropping marker",
                payload_len, received, computed
            );
            self.stats.trailer_failures += 1;
            self.discard(1);
            return SyncStep::Resync { discarded: 1, reason: ResyncReason::TrailerMismatch };
        }

        let payload: Arc<[u8]> = Arc::from(&buffered[FRAME_HEADER_LEN..body_len]);
        let frame = CorrectionFrame::new((length_word >> 10) as u8, payload, received);
        debug_assert_eq!(frame.wire_len(), frame_len);

        self.cursor.consume(frame_len);
        self.stats.frames += 1;
        trace!("Extracted frame with {} payload bytes", payload_len);

        SyncStep::Frame(frame)
    }

    /// Number of bytes waiting in the buffer.
    pub fn buffered(&self) -> usize {
        self.cursor.len()
    }

    /// Running counters.
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    fn discard(&mut self, count: usize) {
        self.cursor.consume(count);
        self.stats.bytes_discarded += count as u64;
    }
}

/// Lazy iterator over frames extracted by a [`FrameSynchronizer`].
pub struct Frames<'a> {
    sync: &'a mut FrameSynchronizer,
}

impl Iterator for Frames<'_> {
    type Item = CorrectionFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.sync.step() {
                SyncStep::Frame(frame) => return Some(frame),
                SyncStep::Resync { .. } => continue,
                SyncStep::NeedMore => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{frame_bytes, msm_payload};
    use proptest::prelude::*;

    fn seven_byte_frame() -> Vec<u8> {
        frame_bytes(&[0x3E, 0xD0, 0x01, 0x02, 0x03, 0x04, 0x05])
    }

    #[test]
    fn extracts_single_frame_and_empties_buffer() {
        let wire = seven_byte_frame();
        assert_eq!(&wire[..3], &[FRAME_MARKER, 0x00, 0x07]);

        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> = sync.feed(&wire).collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload_len(), 7);
        assert_eq!(frames[0].to_wire(), wire);
        assert_eq!(sync.buffered(), 0);
        assert_eq!(sync.stats().frames, 1);
    }

    #[test]
    fn corrupted_payload_drops_only_the_marker() {
        let mut wire = seven_byte_frame();
        wire[5] ^= 0xFF;

        let mut sync = FrameSynchronizer::new();
        sync.extend(&wire);

        assert_eq!(
            sync.step(),
            SyncStep::Resync { discarded: 1, reason: ResyncReason::TrailerMismatch }
        );
        assert_eq!(sync.buffered(), wire.len() - 1);
        assert_eq!(sync.stats().trailer_failures, 1);

        // Remaining bytes hold no marker, so the full scan yields nothing.
        assert_eq!(sync.frames().count(), 0);
    }

    #[test]
    fn frame_inside_rejected_candidate_is_recovered() {
        // A bogus marker whose claimed span swallows the start of a real
        // frame. Skipping the whole candidate would lose the real one.
        let real = seven_byte_frame();
        let mut stream = vec![FRAME_MARKER, 0x00, 0x05, 0xAA];
        stream.extend_from_slice(&real);
        stream.extend_from_slice(&[0x00; 8]);

        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> = sync.feed(&stream).collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].to_wire(), real);
        assert_eq!(sync.stats().trailer_failures, 1);
    }

    #[test]
    fn waits_for_header_and_body() {
        let wire = seven_byte_frame();
        let mut sync = FrameSynchronizer::new();

        assert_eq!(sync.feed(&wire[..2]).count(), 0);
        assert_eq!(sync.buffered(), 2);

        assert_eq!(sync.feed(&wire[2..10]).count(), 0);
        assert_eq!(sync.buffered(), 10);

        let frames: Vec<_> = sync.feed(&wire[10..]).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(sync.buffered(), 0);
    }

    #[test]
    fn reserved_length_bits_are_masked() {
        let payload = [0x3E, 0xD0, 0x00];
        let mut body = vec![FRAME_MARKER, 0xFC, 0x03];
        body.extend_from_slice(&payload);
        let crc = crc24q(&body);
        body.extend_from_slice(&crate::rtcm::crc::write_trailer(crc));

        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> = sync.feed(&body).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload_len(), 3);
        assert_eq!(frames[0].reserved_bits(), 0x3F);
        assert_eq!(frames[0].length_word(), 0xFC03);
        assert_eq!(frames[0].to_wire(), body);
    }

    #[test]
    fn ascii_text_is_noise() {
        let mut stream = b"$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47\r\n".to_vec();
        let frame = frame_bytes(&msm_payload(1077, 24));
        stream.extend_from_slice(&frame);

        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> = sync.feed(&stream).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(sync.stats().bytes_discarded, (stream.len() - frame.len()) as u64);
    }

    #[test]
    fn dropped_iterator_keeps_remaining_frames() {
        let mut stream = frame_bytes(&msm_payload(1005, 19));
        stream.extend(frame_bytes(&msm_payload(1077, 40)));

        let mut sync = FrameSynchronizer::new();
        let first = sync.feed(&stream).next().unwrap();
        assert_eq!(first.payload_len(), 19);

        let rest: Vec<_> = sync.feed(&[]).collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].payload_len(), 40);
    }

    #[test]
    fn empty_payload_frame() {
        let wire = frame_bytes(&[]);
        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> = sync.feed(&wire).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload_len(), 0);
    }

    fn arb_stream() -> impl Strategy<Value = Vec<u8>> {
        let item = prop_oneof![
            prop::collection::vec(any::<u8>(), 0..40).prop_map(|payload| frame_bytes(&payload)),
            prop::collection::vec(any::<u8>(), 0..12),
        ];
        prop::collection::vec(item, 0..8).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn chunk_boundaries_do_not_change_output(
            stream in arb_stream(),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..10)
        ) {
            let mut whole = FrameSynchronizer::new();
            let expected: Vec<_> = whole.feed(&stream).collect();

            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(stream.len() + 1)).collect();
            points.push(0);
            points.push(stream.len());
            points.sort_unstable();

            let mut chunked = FrameSynchronizer::new();
            let mut actual = Vec::new();
            for window in points.windows(2) {
                actual.extend(chunked.feed(&stream[window[0]..window[1]]));
            }

            prop_assert_eq!(actual, expected);
            prop_assert_eq!(chunked.buffered(), whole.buffered());
            prop_assert_eq!(chunked.stats(), whole.stats());
        }

        #[test]
        fn noise_then_frame_consumes_exactly_both(
            noise in prop::collection::vec(any::<u8>().prop_filter("marker", |b| *b != FRAME_MARKER), 0..64),
            payload in prop::collection::vec(any::<u8>(), 0..64)
        ) {
            let frame = frame_bytes(&payload);
            let mut stream = noise.clone();
            stream.extend_from_slice(&frame);

            let mut sync = FrameSynchronizer::new();
            let frames: Vec<_> = sync.feed(&stream).collect();

            prop_assert_eq!(frames.len(), 1);
            prop_assert_eq!(frames[0].payload(), payload.as_slice());
            prop_assert_eq!(sync.buffered(), 0);
            prop_assert_eq!(sync.stats().bytes_discarded, noise.len() as u64);
        }
    }
}
