//! RTCM 3 correction frame handling.
//!
//! - [`FrameSynchronizer`] extracts CRC-verified frames from a chunked byte stream
//! - [`FrameClassifier`] tags each frame with its registered [`MessageType`]
//!
//! ## Wire Layout
//!
//! ```text
//! +------+----------------------+-----------------+-----------+
//! | 0xD3 | 6 reserved | 10 len  | payload (len B) | CRC-24Q   |
//! +------+----------------------+-----------------+-----------+
//!   1 B           2 B              0..=1023 B         3 B
//! ```
//!
//! The CRC covers the marker, the length word and the payload.
//!
//! ## Usage Example
//!
//! ```rust
//! use navfusion::rtcm::{FrameClassifier, FrameSynchronizer, MessageType};
//! use navfusion::types::CorrectionFrame;
//!
//! let wire = CorrectionFrame::encode(&[0x3E, 0xD0, 0x00, 0x01]).unwrap();
//! let mut sync = FrameSynchronizer::new();
//! let classifier = FrameClassifier::new();
//!
//! // Deliver the frame in two arbitrary chunks
//! assert_eq!(sync.feed(&wire[..5]).count(), 0);
//! let messages: Vec<_> = sync.feed(&wire[5..]).map(|f| classifier.classify(f)).collect();
//!
//! assert_eq!(messages[0].kind(), Some(MessageType::ReferenceStation));
//! ```

mod classify;
pub(crate) mod crc;
mod cursor;
mod sync;

pub use classify::{
    ClassifiedMessage, Constellation, FrameClassifier, MessageType, classify, message_number,
};
pub use crc::crc24q;
pub use cursor::ByteCursor;
pub use sync::{FrameSynchronizer, Frames, ResyncReason, SyncStats, SyncStep};
