//! Position sentence handling.
//!
//! - [`PositionSentenceDecoder`] turns fix-data (GGA) lines into [`FixRecord`](crate::FixRecord)s
//! - [`SentenceSplitter`] recovers lines from a raw receiver stream that also
//!   carries binary correction frames
//!
//! ## Field Layout
//!
//! ```text
//! $GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47
//!   0      1       2     3     4     5 6  7   8    9
//! ```
//!
//! Field 1 is UTC time, fields 2-5 the coordinates and hemispheres, field 6 the
//! fix quality, field 7 the satellite count and field 9 the altitude.

mod checksum;
mod gga;
mod splitter;

pub use checksum::{sentence_checksum, split_checksum, verify as verify_checksum};
pub use gga::{DecodeStats, MIN_GGA_FIELDS, PositionSentenceDecoder, Rejection, parse_fix};
pub use splitter::{MAX_SENTENCE_LEN, SentenceSplitter};
