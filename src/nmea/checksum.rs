//! Sentence checksum handling

/// XOR of every byte between the leading `$` and the `*`.
pub fn sentence_checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Split `$BODY*HH` into the body (without `$`) and the declared checksum.
///
/// Returns `None` for the checksum when the suffix is absent or not hex.
pub fn split_checksum(line: &str) -> (&str, Option<u8>) {
    let body = line.strip_prefix('$').unwrap_or(line);
    match body.rsplit_once('*') {
        Some((body, hex)) => (body, u8::from_str_radix(hex.trim(), 16).ok()),
        None => (body, None),
    }
}

/// Whether the declared checksum is present and matches the body.
pub fn verify(line: &str) -> bool {
    match split_checksum(line) {
        (body, Some(declared)) => sentence_checksum(body) == declared,
        (_, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_missing_suffix() {
        assert_eq!(split_checksum("$GNGGA,1,2"), ("GNGGA,1,2", None));
        assert_eq!(split_checksum("$GNGGA,1,2*zz"), ("GNGGA,1,2", None));
        assert_eq!(split_checksum("$GNGGA,1,2*1F"), ("GNGGA,1,2", Some(0x1F)));
    }

    #[test]
    fn checksum_matches_reference_sentence() {
        // Widely published example sentence with its correct checksum.
        let line = "$GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76";
        assert!(verify(line));
        assert!(!verify(&line.replace("*76", "*77")));
        assert!(!verify("$GPGGA,092750.000"));
    }
}
