//! Correction message classification
//!
//! Maps a frame's 12-bit RTCM message number onto a closed registry of
//! recognised message types. Payloads are not decoded further; recognised and
//! unrecognised messages both carry the payload as an opaque shared span.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::types::CorrectionFrame;

/// Satellite system a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constellation {
    Gps,
    Glonass,
    Galileo,
    Sbas,
    BeiDou,
    /// Station or receiver metadata not tied to one system
    Station,
}

/// Recognised correction message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// 1005: Stationary RTK reference station ARP
    ReferenceStation,
    /// 1006: Stationary RTK reference station ARP with antenna height
    ReferenceStationWithHeight,
    /// 1019: GPS ephemeris
    GpsEphemeris,
    /// 1020: GLONASS ephemeris
    GlonassEphemeris,
    /// 1033: Receiver and antenna descriptors
    ReceiverAntennaDescriptor,
    /// 1077: GPS MSM7
    GpsMsm7,
    /// 1087: GLONASS MSM7
    GlonassMsm7,
    /// 1097: Galileo MSM7
    GalileoMsm7,
    /// 1107: SBAS MSM7
    SbasMsm7,
    /// 1127: BeiDou MSM7
    BeiDouMsm7,
    /// 1230: GLONASS L1 and L2 code-phase biases
    GlonassCodePhaseBias,
}

impl MessageType {
    /// Every registered type.
    pub const ALL: [MessageType; 11] = [
        MessageType::ReferenceStation,
        MessageType::ReferenceStationWithHeight,
        MessageType::GpsEphemeris,
        MessageType::GlonassEphemeris,
        MessageType::ReceiverAntennaDescriptor,
        MessageType::GpsMsm7,
        MessageType::GlonassMsm7,
        MessageType::GalileoMsm7,
        MessageType::SbasMsm7,
        MessageType::BeiDouMsm7,
        MessageType::GlonassCodePhaseBias,
    ];

    /// Look up a message number in the registry.
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.id() == id)
    }

    /// RTCM message number.
    pub fn id(self) -> u16 {
        match self {
            MessageType::ReferenceStation => 1005,
            MessageType::ReferenceStationWithHeight => 1006,
            MessageType::GpsEphemeris => 1019,
            MessageType::GlonassEphemeris => 1020,
            MessageType::ReceiverAntennaDescriptor => 1033,
            MessageType::GpsMsm7 => 1077,
            MessageType::GlonassMsm7 => 1087,
            MessageType::GalileoMsm7 => 1097,
            MessageType::SbasMsm7 => 1107,
            MessageType::BeiDouMsm7 => 1127,
            MessageType::GlonassCodePhaseBias => 1230,
        }
    }

    pub fn constellation(self) -> Constellation {
        match self {
            MessageType::ReferenceStation
            | MessageType::ReferenceStationWithHeight
            | MessageType::ReceiverAntennaDescriptor => Constellation::Station,
            MessageType::GpsEphemeris | MessageType::GpsMsm7 => Constellation::Gps,
            MessageType::GlonassEphemeris
            | MessageType::GlonassMsm7
            | MessageType::GlonassCodePhaseBias => Constellation::Glonass,
            MessageType::GalileoMsm7 => Constellation::Galileo,
            MessageType::SbasMsm7 => Constellation::Sbas,
            MessageType::BeiDouMsm7 => Constellation::BeiDou,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MessageType::ReferenceStation => "Stationary RTK reference station ARP",
            MessageType::ReferenceStationWithHeight => {
                "Stationary RTK reference station ARP with antenna height"
            }
            MessageType::GpsEphemeris => "GPS ephemeris",
            MessageType::GlonassEphemeris => "GLONASS ephemeris",
            MessageType::ReceiverAntennaDescriptor => "Receiver and antenna descriptors",
            MessageType::GpsMsm7 => "GPS pseudorange, phase range, Doppler, CNR (MSM7)",
            MessageType::GlonassMsm7 => "GLONASS pseudorange, phase range, Doppler, CNR (MSM7)",
            MessageType::GalileoMsm7 => "Galileo pseudorange, phase range, Doppler, CNR (MSM7)",
            MessageType::SbasMsm7 => "SBAS pseudorange, phase range, Doppler, CNR (MSM7)",
            MessageType::BeiDouMsm7 => "BeiDou pseudorange, phase range, Doppler, CNR (MSM7)",
            MessageType::GlonassCodePhaseBias => "GLONASS L1 and L2 code-phase biases",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTCM {} ({})", self.id(), self.description())
    }
}

/// A correction frame tagged with its message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedMessage {
    Known { kind: MessageType, payload: Arc<[u8]> },
    Unrecognized { id: u16, payload: Arc<[u8]> },
}

impl ClassifiedMessage {
    /// RTCM message number (0 when the payload is too short to carry one).
    pub fn id(&self) -> u16 {
        match self {
            ClassifiedMessage::Known { kind, .. } => kind.id(),
            ClassifiedMessage::Unrecognized { id, .. } => *id,
        }
    }

    pub fn payload(&self) -> &Arc<[u8]> {
        match self {
            ClassifiedMessage::Known { payload, .. }
            | ClassifiedMessage::Unrecognized { payload, .. } => payload,
        }
    }

    pub fn kind(&self) -> Option<MessageType> {
        match self {
            ClassifiedMessage::Known { kind, .. } => Some(*kind),
            ClassifiedMessage::Unrecognized { .. } => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, ClassifiedMessage::Known { .. })
    }
}

/// Extract the 12-bit message number from the head of a payload.
pub fn message_number(payload: &[u8]) -> Option<u16> {
    match payload {
        [first, second, ..] => Some((u16::from(*first) << 4) | (u16::from(*second) >> 4)),
        _ => None,
    }
}

/// Classify a frame. Never fails; unknown numbers map to `Unrecognized`.
pub fn classify(frame: CorrectionFrame) -> ClassifiedMessage {
    let payload = frame.into_payload();
    let id = message_number(&payload).unwrap_or(0);

    match MessageType::from_id(id) {
        Some(kind) => ClassifiedMessage::Known { kind, payload },
        None => ClassifiedMessage::Unrecognized { id, payload },
    }
}

/// Stateless classifier over the [`MessageType`] registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClassifier;

impl FrameClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, frame: CorrectionFrame) -> ClassifiedMessage {
        classify(frame)
    }

    /// Whether a message number is in the registry.
    pub fn recognizes(&self, id: u16) -> bool {
        MessageType::from_id(id).is_some()
    }
}
