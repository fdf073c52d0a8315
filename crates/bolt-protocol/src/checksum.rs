//! XOR sentence checksum
//!
//! Every outbound sentence carries a two-digit hex checksum computed by
//! XOR-ing the byte value of each character between the leading `$` and the
//! trailing `*` (both exclusive). This is the same scheme an attached
//! display or logging package verifies against, so it must match bit for bit.

/// Compute the XOR checksum of a sentence prefix.
///
/// The leading `$` framing byte is skipped wherever it appears; scanning
/// stops at the first `*`. Any input, including an empty one, yields a
/// valid accumulator.
pub fn checksum(data: &[u8]) -> u8 {
    let mut acc = 0u8;

    for &b in data {
        match b {
            b'$' => {}
            b'*' => break,
            _ => acc ^= b,
        }
    }

    acc
}

/// Compute the checksum and format it as the two-character uppercase hex
/// field appended after the `*` separator.
pub fn checksum_field(data: &[u8]) -> String {
    format!("{:02X}", checksum(data))
}
