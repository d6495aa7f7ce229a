//! Integer-to-bitstream encoding
//!
//! Turns a sample sequence into the flat 0/1 sequence consumed by the
//! battery. Three policies exist:
//!
//! - `encode_val`: every sample as 32 bits, MSB first (default)
//! - `map_val`: linear rescale into a signed byte (rejected, see below)
//! - `last_bits`: the low byte of every sample, offset by -127 and packed

use crate::constants::encoding::{BYTE_BITS, LAST_BITS_OFFSET, SAMPLE_BITS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding policy, selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingPolicy {
    /// Full 32-bit expansion
    #[default]
    EncodeVal,
    /// Linear rescale into [-128, 127]
    MapVal,
    /// Low 8 bits minus 127
    LastBits,
}

impl EncodingPolicy {
    /// All policies, in display order
    pub fn all() -> &'static [EncodingPolicy] {
        &[
            EncodingPolicy::EncodeVal,
            EncodingPolicy::MapVal,
            EncodingPolicy::LastBits,
        ]
    }

    /// Config/CLI name of this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingPolicy::EncodeVal => "encode_val",
            EncodingPolicy::MapVal => "map_val",
            EncodingPolicy::LastBits => "last_bits",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            EncodingPolicy::EncodeVal => "Every sample as 32 bits, MSB first",
            EncodingPolicy::MapVal => "Rescale to a signed byte (not implemented)",
            EncodingPolicy::LastBits => "Low 8 bits of every sample minus 127, packed as bytes",
        }
    }
}

impl fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "encode_val" => Ok(EncodingPolicy::EncodeVal),
            "map_val" => Ok(EncodingPolicy::MapVal),
            "last_bits" => Ok(EncodingPolicy::LastBits),
            other => Err(Error::InvalidArgument(format!(
                "Unknown encoding policy: {} (expected one of: encode_val, map_val, last_bits)",
                other
            ))),
        }
    }
}

/// Encode a sample sequence into bits using `policy`
///
/// An empty input yields an empty output for every implemented policy.
pub fn encode_input(samples: &[u32], policy: EncodingPolicy) -> Result<Vec<u8>> {
    match policy {
        EncodingPolicy::EncodeVal => Ok(encode_val(samples)),
        EncodingPolicy::LastBits => Ok(last_bits(samples)),
        // No rescale formula is defined for map_val
        EncodingPolicy::MapVal => Err(Error::Unimplemented(
            "map_val has no defined rescale formula; use encode_val or last_bits".to_string(),
        )),
    }
}

/// Every sample as 32 bits, MSB first, concatenated in input order
pub fn encode_val(samples: &[u32]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(samples.len() * SAMPLE_BITS);
    for &sample in samples {
        for shift in (0..SAMPLE_BITS).rev() {
            bits.push(((sample >> shift) & 1) as u8);
        }
    }
    bits
}

/// Low byte of every sample minus 127, bit-packed
pub fn last_bits(samples: &[u32]) -> Vec<u8> {
    let adjusted: Vec<i64> = samples
        .iter()
        .map(|&n| i64::from(n & 0xFF) - LAST_BITS_OFFSET)
        .collect();
    pack_sequence(&adjusted)
}

/// Expand each value into its 8-bit two's-complement form, MSB first
///
/// Values outside the signed byte range wrap modulo 256, so 128 packs to the
/// same byte as -128.
pub fn pack_sequence(values: &[i64]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(values.len() * BYTE_BITS);
    for &value in values {
        let byte = (value & 0xFF) as u8;
        for shift in (0..BYTE_BITS).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Render `num` as a 32-character, zero-padded binary string
pub fn int_to_binary_32bit(num: u32) -> String {
    format!("{:032b}", num)
}

/// Inverse of `encode_val`: read consecutive 32-bit groups back as integers
///
/// A trailing partial group is ignored.
pub fn decode_32bit_groups(bits: &[u8]) -> Vec<u32> {
    bits.chunks_exact(SAMPLE_BITS)
        .map(|group| group.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b & 1)))
        .collect()
}
