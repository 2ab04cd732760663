//! Sentence extraction from an interleaved receiver byte stream

use tracing::trace;

/// Longest line accepted, marker and checksum included.
pub const MAX_SENTENCE_LEN: usize = 128;

/// Pulls `$`-prefixed ASCII lines out of a byte stream that also carries
/// binary correction frames.
///
/// A line starts at `$` and ends at CR or LF. Any non-printable byte or an
/// over-long line abandons the partial line; binary data between sentences
/// is skipped.
#[derive(Debug, Default, Clone)]
pub struct SentenceSplitter {
    line: Vec<u8>,
    in_sentence: bool,
    abandoned: u64,
}

impl SentenceSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk and collect every line it completes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in bytes {
            match byte {
                b'$' => {
                    if self.in_sentence && self.line.len() > 1 {
                        self.abandoned += 1;
                    }
                    self.line.clear();
                    self.line.push(byte);
                    self.in_sentence = true;
                }
                b'\r' | b'\n' => {
                    if self.in_sentence && self.line.len() > 1 {
                        // Only printable ASCII is ever pushed.
                        if let Ok(line) = String::from_utf8(std::mem::take(&mut self.line)) {
                            trace!("Split sentence of {} bytes", line.len());
                            lines.push(line);
                        }
                    }
                    self.reset();
                }
                0x20..=0x7E if self.in_sentence => {
                    if self.line.len() >= MAX_SENTENCE_LEN {
                        self.abandon();
                    } else {
                        self.line.push(byte);
                    }
                }
                _ => {
                    if self.in_sentence {
                        self.abandon();
                    }
                }
            }
        }

        lines
    }

    /// Partial lines dropped because of binary data or excess length.
    pub fn abandoned(&self) -> u64 {
        self.abandoned
    }

    fn abandon(&mut self) {
        self.abandoned += 1;
        self.reset();
    }

    fn reset(&mut self) {
        self.line.clear();
        self.in_sentence = false;
    }
}
