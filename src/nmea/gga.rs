//! Fix-data (GGA) sentence decoding

use thiserror::Error;
use tracing::{debug, trace};

use super::checksum::{sentence_checksum, split_checksum};
use crate::config::{FixPolicy, SentenceConfig};
use crate::types::{FixQuality, FixRecord, FixTime};

/// Fields 0 through 9 must be present so altitude is addressable.
pub const MIN_GGA_FIELDS: usize = 10;

const FIELD_TIME: usize = 1;
const FIELD_LAT: usize = 2;
const FIELD_LAT_HEMI: usize = 3;
const FIELD_LON: usize = 4;
const FIELD_LON_HEMI: usize = 5;
const FIELD_QUALITY: usize = 6;
const FIELD_SATELLITES: usize = 7;
const FIELD_ALTITUDE: usize = 9;

/// Why a line did not produce a fix update.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("not a fix-data sentence")]
    NotFixData,

    #[error("expected at least 10 fields, found {0}")]
    TooFewFields(usize),

    #[error("checksum missing or mismatched")]
    Checksum,

    #[error("unparseable time field '{0}'")]
    Time(String),

    #[error("unparseable latitude '{0}'")]
    Latitude(String),

    #[error("unparseable longitude '{0}'")]
    Longitude(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn max_degrees(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn sign(self, hemisphere: &str) -> Option<f64> {
        match (self, hemisphere.trim()) {
            (Axis::Latitude, "N") | (Axis::Longitude, "E") => Some(1.0),
            (Axis::Latitude, "S") | (Axis::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

/// Convert a `DDMM.MMMM` / `DDDMM.MMMM` field and its hemisphere to signed
/// decimal degrees.
fn parse_coordinate(value: &str, hemisphere: &str, axis: Axis) -> Option<f64> {
    let sign = axis.sign(hemisphere)?;
    let raw: f64 = value.trim().parse().ok()?;
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }

    let degrees = (raw / 100.0).floor();
    let minutes = raw - degrees * 100.0;
    if minutes >= 60.0 {
        return None;
    }

    let decimal = degrees + minutes / 60.0;
    if decimal > axis.max_degrees() {
        return None;
    }

    Some(sign * decimal)
}

/// Whether `identifier` is a two-letter talker followed by `GGA`.
fn is_fix_data(identifier: &str) -> bool {
    let bytes = identifier.as_bytes();
    bytes.len() == 5 && bytes[..2].iter().all(u8::is_ascii_uppercase) && &bytes[2..] == b"GGA"
}

/// Decode one line against the previous record.
///
/// Soft attributes (altitude, satellite count) fall back to `previous` when
/// missing or non-numeric; everything else must parse or the line is rejected.
pub fn parse_fix(
    line: &str,
    previous: &FixRecord,
    config: &SentenceConfig,
) -> Result<FixRecord, Rejection> {
    let line = line.trim();
    if !line.starts_with('$') {
        return Err(Rejection::NotFixData);
    }

    let (body, declared) = split_checksum(line);
    if config.verify_checksum && declared != Some(sentence_checksum(body)) {
        return Err(Rejection::Checksum);
    }

    let fields: Vec<&str> = body.split(',').collect();
    if !is_fix_data(fields[0]) {
        return Err(Rejection::NotFixData);
    }
    if fields.len() < MIN_GGA_FIELDS {
        return Err(Rejection::TooFewFields(fields.len()));
    }

    let time = FixTime::parse(fields[FIELD_TIME])
        .ok_or_else(|| Rejection::Time(fields[FIELD_TIME].to_string()))?;

    let latitude = parse_coordinate(fields[FIELD_LAT], fields[FIELD_LAT_HEMI], Axis::Latitude)
        .ok_or_else(|| Rejection::Latitude(fields[FIELD_LAT].to_string()))?;

    let longitude = parse_coordinate(fields[FIELD_LON], fields[FIELD_LON_HEMI], Axis::Longitude)
        .ok_or_else(|| Rejection::Longitude(fields[FIELD_LON].to_string()))?;

    let satellites = fields[FIELD_SATELLITES].trim().parse::<u8>().ok().or(previous.satellites);

    let altitude = fields[FIELD_ALTITUDE]
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|alt| alt.is_finite())
        .or(previous.altitude);

    let quality = match config.fix_policy {
        FixPolicy::QualityField => FixQuality::from_quality_field(fields[FIELD_QUALITY]),
        FixPolicy::SatelliteCount => {
            satellites.map(FixQuality::from_satellite_count).unwrap_or_default()
        }
    };

    Ok(FixRecord {
        time: Some(time),
        latitude: Some(latitude),
        longitude: Some(longitude),
        altitude,
        quality,
        satellites,
    })
}

/// Counters for accepted and rejected lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Line-oriented decoder holding the latest fix record.
#[derive(Debug, Clone, Default)]
pub struct PositionSentenceDecoder {
    config: SentenceConfig,
    current: FixRecord,
    stats: DecodeStats,
}

impl PositionSentenceDecoder {
    pub fn new(config: SentenceConfig) -> Self {
        Self { config, current: FixRecord::default(), stats: DecodeStats::default() }
    }

    /// Decode one line, replacing the current record on success.
    ///
    /// Returns the new record, or `None` when the line was rejected and the
    /// previous record kept.
    pub fn decode(&mut self, line: &str) -> Option<FixRecord> {
        self.try_decode(line).ok()
    }

    /// Like [`decode`](Self::decode) but reports the rejection reason.
    pub fn try_decode(&mut self, line: &str) -> Result<FixRecord, Rejection> {
        match parse_fix(line, &self.current, &self.config) {
            Ok(record) => {
                self.current = record;
                self.stats.accepted += 1;
                trace!(
                    "Fix {:?} at {:?}, {:?} ({})",
                    record.time, record.latitude, record.longitude, record.quality
                );
                Ok(record)
            }
            Err(reason) => {
                self.stats.rejected += 1;
                debug!("Rejected sentence: {}", reason);
                Err(reason)
            }
        }
    }

    /// Latest accepted record.
    pub fn current(&self) -> &FixRecord {
        &self.current
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }
}
