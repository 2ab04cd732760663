//! Position fix record types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positioning confidence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FixQuality {
    /// No usable position
    #[default]
    NoFix,
    /// Standalone satellite fix without corrections
    GpsFix,
    /// Corrections applied, carrier ambiguities not yet resolved
    RtkFloat,
    /// Corrections applied with fixed carrier ambiguities
    RtkFix,
}

impl FixQuality {
    /// Map the fix-quality field of a position sentence.
    ///
    /// `1` is a standard fix, `2` RTK float and `4` RTK fixed; anything else,
    /// including `0`, is treated as no fix.
    pub fn from_quality_field(field: &str) -> Self {
        match field.trim() {
            "1" => FixQuality::GpsFix,
            "2" => FixQuality::RtkFloat,
            "4" => FixQuality::RtkFix,
            _ => FixQuality::NoFix,
        }
    }

    /// Classify from the number of satellites in use.
    pub fn from_satellite_count(satellites: u8) -> Self {
        match satellites {
            n if n > 6 => FixQuality::RtkFix,
            n if n > 4 => FixQuality::RtkFloat,
            _ => FixQuality::NoFix,
        }
    }

    /// Whether differential corrections are being applied.
    pub fn is_rtk(self) -> bool {
        matches!(self, FixQuality::RtkFloat | FixQuality::RtkFix)
    }
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixQuality::NoFix => "No Fix",
            FixQuality::GpsFix => "No RTK",
            FixQuality::RtkFloat => "RTK Float",
            FixQuality::RtkFix => "RTK Fix",
        };
        f.write_str(label)
    }
}

/// UTC time of day reported with a fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixTime {
    pub hour: u8,
    pub minute: u8,
    pub second: f32,
}

impl FixTime {
    /// Parse an `hhmmss[.sss]` field.
    pub fn parse(field: &str) -> Option<Self> {
        let field = field.trim();
        if field.len() < 6 || !field.is_ascii() {
            return None;
        }

        let (hh, rest) = field.split_at(2);
        let (mm, ss) = rest.split_at(2);
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let hour: u8 = hh.parse().ok()?;
        let minute: u8 = mm.parse().ok()?;
        let second: f32 = ss.parse().ok()?;

        if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
            return None;
        }

        Some(Self { hour, minute, second })
    }

    /// Seconds since midnight.
    pub fn seconds_of_day(&self) -> f64 {
        f64::from(self.hour) * 3600.0 + f64::from(self.minute) * 60.0 + f64::from(self.second)
    }
}

impl fmt::Display for FixTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:06.3}", self.hour, self.minute, self.second)
    }
}

/// Latest decoded position fix.
///
/// Created with every attribute unknown and replaced wholesale on each
/// accepted sentence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FixRecord {
    /// UTC time of day
    pub time: Option<FixTime>,
    /// Decimal degrees, negative south
    pub latitude: Option<f64>,
    /// Decimal degrees, negative west
    pub longitude: Option<f64>,
    /// Altitude above mean sea level in metres
    pub altitude: Option<f64>,
    /// Fix quality category
    pub quality: FixQuality,
    /// Satellites in use
    pub satellites: Option<u8>,
}

impl FixRecord {
    /// Whether a position has been decoded at least once.
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_field_mapping() {
        assert_eq!(FixQuality::from_quality_field("0"), FixQuality::NoFix);
        assert_eq!(FixQuality::from_quality_field("1"), FixQuality::GpsFix);
        assert_eq!(FixQuality::from_quality_field("2"), FixQuality::RtkFloat);
        assert_eq!(FixQuality::from_quality_field("4"), FixQuality::RtkFix);
        assert_eq!(FixQuality::from_quality_field("5"), FixQuality::NoFix);
        assert_eq!(FixQuality::from_quality_field(""), FixQuality::NoFix);
    }

    #[test]
    fn satellite_count_mapping() {
        assert_eq!(FixQuality::from_satellite_count(0), FixQuality::NoFix);
        assert_eq!(FixQuality::from_satellite_count(4), FixQuality::NoFix);
        assert_eq!(FixQuality::from_satellite_count(5), FixQuality::RtkFloat);
        assert_eq!(FixQuality::from_satellite_count(6), FixQuality::RtkFloat);
        assert_eq!(FixQuality::from_satellite_count(7), FixQuality::RtkFix);
    }

    #[test]
    fn time_parsing() {
        let time = FixTime::parse("123519").unwrap();
        assert_eq!((time.hour, time.minute), (12, 35));
        assert_eq!(time.second, 19.0);

        let time = FixTime::parse("235959.50").unwrap();
        assert!((time.second - 59.5).abs() < 1e-6);
        assert_eq!(time.to_string(), "23:59:59.500");

        assert!(FixTime::parse("").is_none());
        assert!(FixTime::parse("1235").is_none());
        assert!(FixTime::parse("250000").is_none());
        assert!(FixTime::parse("12a519").is_none());
        assert!(FixTime::parse("+12359").is_none());
    }

    #[test]
    fn non_ascii_time_is_rejected() {
        assert!(FixTime::parse("123\u{e9}56").is_none());
        assert!(FixTime::parse("1\u{e9}3456").is_none());
        assert!(FixTime::parse("\u{e9}\u{e9}\u{e9}").is_none());
    }

    #[test]
    fn default_record_is_unknown() {
        let record = FixRecord::default();
        assert!(!record.has_position());
        assert_eq!(record.quality, FixQuality::NoFix);
        assert!(record.time.is_none());
        assert!(record.altitude.is_none());
        assert!(record.satellites.is_none());
    }
}
