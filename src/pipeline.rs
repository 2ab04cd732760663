//! Synchronous processing core.
//!
//! [`Pipeline`] owns every decoding component and routes each
//! [`SourceEvent`] to the right one. It never blocks or suspends; the
//! [`Driver`](crate::driver::Driver) feeds it from a single task so handlers
//! always run to completion in arrival order.
//!
//! ## Routing
//!
//! | Event          | Components                                  |
//! |----------------|---------------------------------------------|
//! | `Receiver`     | sentence splitter, receiver-stream synchronizer |
//! | `Corrections`  | correction-stream synchronizer              |
//! | `Sentence`     | position decoder                            |
//! | `Imu`          | aggregator (last sample), orientation filter |
//!
//! The receiver and correction streams keep separate synchronizers so that a
//! partial frame buffered from one stream is never completed with bytes from
//! the other.
//!
//! Sentences on the receiver stream are recovered best-effort. A frame
//! payload that itself contains a complete printable `$..GGA` line ending in
//! CR or LF cannot be told apart from a real sentence by the splitter; with
//! `sentences.verify_checksum` enabled such a line must also carry a matching
//! checksum to be accepted.

use std::sync::Arc;
use tracing::trace;

use crate::Result;
use crate::aggregator::TelemetryAggregator;
use crate::ahrs::{OrientationFilter, OrientationState, UpdateOutcome};
use crate::config::PipelineConfig;
use crate::nmea::{DecodeStats, PositionSentenceDecoder, SentenceSplitter};
use crate::rtcm::{ClassifiedMessage, FrameClassifier, FrameSynchronizer, SyncStats};
use crate::types::{FixRecord, SourceEvent, TelemetrySnapshot};

/// Output of [`Pipeline::handle`], in the order it was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A CRC-verified correction frame
    Correction(ClassifiedMessage),
    /// A sentence was accepted and the fix record changed
    FixUpdated(FixRecord),
    /// An IMU sample was fused
    OrientationUpdated(OrientationState),
}

/// Aggregate counters across all components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Combined synchronizer counters for both byte streams
    pub sync: SyncStats,
    pub recognized_messages: u64,
    pub unrecognized_messages: u64,
    pub sentences: DecodeStats,
    /// Partial lines dropped by the splitter
    pub abandoned_lines: u64,
    pub imu_applied: u64,
    pub imu_rejected: u64,
    pub snapshots: u64,
}

/// The decoding core: framing, classification, sentence decoding, fusion
/// and aggregation.
#[derive(Debug)]
pub struct Pipeline {
    receiver_sync: FrameSynchronizer,
    correction_sync: FrameSynchronizer,
    classifier: FrameClassifier,
    splitter: SentenceSplitter,
    decoder: PositionSentenceDecoder,
    filter: OrientationFilter,
    aggregator: TelemetryAggregator,
    recognized: u64,
    unrecognized: u64,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            receiver_sync: FrameSynchronizer::new(),
            correction_sync: FrameSynchronizer::new(),
            classifier: FrameClassifier::new(),
            splitter: SentenceSplitter::new(),
            decoder: PositionSentenceDecoder::new(config.sentences),
            filter: OrientationFilter::new(config.filter)?,
            aggregator: TelemetryAggregator::new(config.aggregator),
            recognized: 0,
            unrecognized: 0,
        })
    }

    /// Process one input event.
    ///
    /// For a `Receiver` chunk, correction frames are reported before the
    /// sentences completed by the same chunk. Order within each kind follows
    /// the byte stream.
    pub fn handle(&mut self, event: SourceEvent) -> Vec<PipelineEvent> {
        trace!("Handling {} event", event.kind());
        let mut out = Vec::new();

        match event {
            SourceEvent::Receiver(bytes) => {
                self.receiver_sync.extend(&bytes);
                self.drain_frames(Stream::Receiver, &mut out);
                for line in self.splitter.push(&bytes) {
                    self.decode_line(&line, &mut out);
                }
            }
            SourceEvent::Corrections(bytes) => {
                self.correction_sync.extend(&bytes);
                self.drain_frames(Stream::Corrections, &mut out);
            }
            SourceEvent::Sentence(line) => {
                self.decode_line(line.trim_end_matches(['\r', '\n']), &mut out);
            }
            SourceEvent::Imu(sample) => {
                self.aggregator.observe_sample(sample);
                if let UpdateOutcome::Applied = self.filter.update(&sample) {
                    out.push(PipelineEvent::OrientationUpdated(*self.filter.state()));
                }
            }
        }

        out
    }

    /// Compose a snapshot of the current fix and orientation.
    pub fn tick(&mut self) -> Arc<TelemetrySnapshot> {
        self.aggregator.compose(self.decoder.current(), self.filter.state())
    }

    pub fn current_fix(&self) -> &FixRecord {
        self.decoder.current()
    }

    pub fn orientation(&self) -> &OrientationState {
        self.filter.state()
    }

    pub fn aggregator(&self) -> &TelemetryAggregator {
        &self.aggregator
    }

    /// Return the orientation estimate to identity.
    pub fn reset_orientation(&mut self) {
        self.filter.reset();
    }

    pub fn stats(&self) -> PipelineStats {
        let receiver = self.receiver_sync.stats();
        let corrections = self.correction_sync.stats();
        let (imu_applied, imu_rejected) = self.filter.counts();

        PipelineStats {
            sync: SyncStats {
                frames: receiver.frames + corrections.frames,
                bytes_discarded: receiver.bytes_discarded + corrections.bytes_discarded,
                trailer_failures: receiver.trailer_failures + corrections.trailer_failures,
            },
            recognized_messages: self.recognized,
            unrecognized_messages: self.unrecognized,
            sentences: self.decoder.stats(),
            abandoned_lines: self.splitter.abandoned(),
            imu_applied,
            imu_rejected,
            snapshots: self.aggregator.ticks(),
        }
    }

    fn drain_frames(&mut self, stream: Stream, out: &mut Vec<PipelineEvent>) {
        let sync = match stream {
            Stream::Receiver => &mut self.receiver_sync,
            Stream::Corrections => &mut self.correction_sync,
        };
        for frame in sync.frames() {
            let message = self.classifier.classify(frame);
            if message.is_recognized() {
                self.recognized += 1;
            } else {
                self.unrecognized += 1;
            }
            out.push(PipelineEvent::Correction(message));
        }
    }

    fn decode_line(&mut self, line: &str, out: &mut Vec<PipelineEvent>) {
        if let Some(fix) = self.decoder.decode(line) {
            out.push(PipelineEvent::FixUpdated(fix));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Receiver,
    Corrections,
}
