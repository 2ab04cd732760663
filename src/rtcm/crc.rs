//! CRC-24Q integrity trailer used by RTCM 3 frames.
//!
//! Polynomial `0x1864CFB`, zero initial value, no reflection and no final xor.
//! These are the CRC-24/LTE-A parameters.

use crc::{CRC_24_LTE_A, Crc};

const CRC24Q: Crc<u32> = Crc::<u32>::new(&CRC_24_LTE_A);

/// Compute the CRC-24Q over `data`.
pub fn crc24q(data: &[u8]) -> u32 {
    CRC24Q.checksum(data)
}

/// Read a 24-bit big-endian trailer.
pub(crate) fn read_trailer(bytes: &[u8; 3]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}

/// Write a 24-bit big-endian trailer.
pub(crate) fn write_trailer(crc: u32) -> [u8; 3] {
    [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8]
}
