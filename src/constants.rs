//! Centralized constants for the qrng-nist crate
//!
//! Values shared between the device backends, the encoder and the battery.

/// External API endpoints
pub mod api {
    /// ANU QRNG free tier (has expired SSL cert)
    pub const ANU_FREE_URL: &str = "https://qrng.anu.edu.au/API/jsonI.php";

    /// ANU QRNG paid tier (requires API key)
    pub const ANU_PAID_URL: &str = "https://api.quantumnumbers.anu.edu.au";
}

/// Bit widths used by the encoder
pub mod encoding {
    /// Bits emitted per sample by `encode_val`
    pub const SAMPLE_BITS: usize = 32;

    /// Bits emitted per packed byte by `last_bits`
    pub const BYTE_BITS: usize = 8;

    /// Offset subtracted from the low byte by `last_bits`
    pub const LAST_BITS_OFFSET: i64 = 127;
}

/// Statistical battery settings
pub mod battery {
    /// Battery display name, as printed in the report header
    pub const BATTERY_NAME: &str = "NIST-SP800-22r1a";

    /// Significance level below which a p-value fails
    pub const SIGNIFICANCE: f64 = 0.01;
}
