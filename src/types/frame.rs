//! Correction frame value type

use std::sync::Arc;

use crate::rtcm::crc::{crc24q, write_trailer};

/// Synchronisation marker opening every correction frame.
pub const FRAME_MARKER: u8 = 0xD3;

/// Marker byte plus the 16-bit length word.
pub const FRAME_HEADER_LEN: usize = 3;

/// CRC-24Q trailer length.
pub const FRAME_TRAILER_LEN: usize = 3;

/// Low ten bits of the length word carry the payload length.
pub const PAYLOAD_LEN_MASK: u16 = 0x03FF;

/// Largest payload the 10-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = PAYLOAD_LEN_MASK as usize;

/// A complete, trailer-verified correction frame.
///
/// Frames are produced once by the [`FrameSynchronizer`](crate::rtcm::FrameSynchronizer)
/// and never mutated. The payload is shared via `Arc` so classified messages
/// and relays can hold it without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionFrame {
    /// Six reserved high bits of the length word, as received
    reserved: u8,

    /// Payload bytes; their count is the 10-bit length field
    payload: Arc<[u8]>,

    /// CRC-24Q trailer value
    crc: u32,
}

impl CorrectionFrame {
    /// Build a frame value from its parts.
    ///
    /// The payload must already fit the length field.
    pub(crate) fn new(reserved: u8, payload: impl Into<Arc<[u8]>>, crc: u32) -> Self {
        let payload = payload.into();
        debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);
        Self { reserved: reserved & 0x3F, payload, crc }
    }

    /// Always [`FRAME_MARKER`]; present for symmetry with the wire layout.
    pub fn marker(&self) -> u8 {
        FRAME_MARKER
    }

    /// Length word as it appeared on the wire, reserved bits included.
    pub fn length_word(&self) -> u16 {
        (u16::from(self.reserved) << 10) | self.payload.len() as u16
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the shared payload without copying.
    pub fn into_payload(self) -> Arc<[u8]> {
        self.payload
    }

    /// Payload length, as decoded from the 10-bit length field.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Value of the six reserved high bits of the length word.
    pub fn reserved_bits(&self) -> u8 {
        self.reserved
    }

    /// CRC-24Q trailer value.
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Total size of the frame on the wire.
    pub fn wire_len(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.len() + FRAME_TRAILER_LEN
    }

    /// Re-serialise the frame byte-for-byte as it appeared on the wire.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.wire_len());
        bytes.push(FRAME_MARKER);
        bytes.extend_from_slice(&self.length_word().to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.extend_from_slice(&write_trailer(self.crc));
        bytes
    }

    /// Encode a payload into a well-formed wire frame.
    ///
    /// Returns `None` when the payload does not fit the 10-bit length field.
    pub fn encode(payload: &[u8]) -> Option<Vec<u8>> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return None;
        }

        let mut bytes = Vec::with_capacity(FRAME_HEADER_LEN + payload.len() + FRAME_TRAILER_LEN);
        bytes.push(FRAME_MARKER);
        bytes.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        let crc = crc24q(&bytes);
        bytes.extend_from_slice(&write_trailer(crc));
        Some(bytes)
    }
}
