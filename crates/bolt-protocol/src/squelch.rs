//! Inbound squelch command parsing
//!
//! The LD-250 accepts exactly one command over the wire: a squelch level,
//! sent as `SQ<digits>\r` with no `$` framing and no checksum. The codec
//! accumulates raw transport reads and extracts at most one complete
//! command per call, leaving partial or unrelated bytes buffered for later
//! passes.
//!
//! Extraction follows the unit's observed behavior: the first `SQ` marker
//! is located, then the first `\r` at or after it, and the matched bytes
//! are removed from the buffer by content (a single remove-first, not a
//! positional slice). Junk ahead of the first marker stays buffered.
//!
//! One divergence from the physical unit: an incomplete sentence normally
//! leaves the buffer untouched, but once accumulated bytes exceed four
//! commands' worth the codec keeps only the newest `MAX_COMMAND_LEN`
//! bytes, which can discard the head of an in-flight command along with
//! the junk. The real unit's buffer grows without bound instead.

use crate::error::ParseError;

/// Two-character start marker of the inbound command
const SENTENCE_START: &[u8] = b"SQ";
/// One-character end marker
const SENTENCE_END: u8 = b'\r';

/// Maximum command length (reasonable limit to prevent buffer overflow)
const MAX_COMMAND_LEN: usize = 64;

/// A parsed inbound squelch command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquelchCommand {
    /// Requested squelch level. The unit labels the valid range 0-15 in
    /// its acknowledgement but echoes whatever number it was sent.
    pub value: i32,
}

impl SquelchCommand {
    /// Encode the plain-text acknowledgement line for this command.
    pub fn ack(&self) -> Vec<u8> {
        format!(":SQUELCH {} (0-15)\r\n", self.value).into_bytes()
    }
}

/// Streaming codec for the inbound command channel
#[derive(Debug, Default)]
pub struct SquelchCodec {
    buffer: Vec<u8>,
}

impl SquelchCodec {
    /// Create a new codec with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_COMMAND_LEN),
        }
    }

    /// Push raw bytes into the codec's buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Prevent buffer overflow
        if self.buffer.len() > MAX_COMMAND_LEN * 4 {
            // Keep only the last portion
            let start = self.buffer.len() - MAX_COMMAND_LEN;
            self.buffer = self.buffer[start..].to_vec();
        }
    }

    /// Try to extract the next complete command from the buffer.
    ///
    /// At most one command is extracted per call. A complete but
    /// malformed command is consumed from the buffer, logged, and yields
    /// `None`; no acknowledgement should be sent for it.
    pub fn next_command(&mut self) -> Option<SquelchCommand> {
        let extracted = self.extract_sentence()?;

        match Self::parse_command(&extracted) {
            Ok(cmd) => Some(cmd),
            Err(e) => {
                tracing::warn!("Failed to parse squelch command: {}", e);
                None
            }
        }
    }

    /// Clear the internal buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Locate a complete sentence and remove it from the buffer.
    fn extract_sentence(&mut self) -> Option<Vec<u8>> {
        let start = find_subsequence(&self.buffer, SENTENCE_START)?;
        let end = self.buffer[start..]
            .iter()
            .position(|&b| b == SENTENCE_END)?;

        let extracted = self.buffer[start..start + end + 1].to_vec();

        // Remove the first occurrence of the matched bytes by content.
        // The first occurrence necessarily begins at `start`, since any
        // earlier copy would contain an earlier start marker.
        if let Some(pos) = find_subsequence(&self.buffer, &extracted) {
            self.buffer.drain(pos..pos + extracted.len());
        }

        Some(extracted)
    }

    /// Parse the numeric payload between the start marker and the
    /// terminator.
    fn parse_command(extracted: &[u8]) -> Result<SquelchCommand, ParseError> {
        let payload = &extracted[SENTENCE_START.len()..extracted.len() - 1];

        if payload.is_empty() {
            return Err(ParseError::EmptyPayload);
        }

        let text = String::from_utf8_lossy(payload);
        let value = text
            .parse::<i32>()
            .map_err(|_| ParseError::NonNumericPayload(text.into_owned()))?;

        Ok(SquelchCommand { value })
    }
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
