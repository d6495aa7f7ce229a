//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::ANU_FREE_URL;

/// Read samples from a file instead of a device
pub const DEFAULT_MOCK: bool = false;

/// Default mock sample file
pub const DEFAULT_DATA_PATH: &str = "samples.txt";

/// Default QRNG device backend
pub const DEFAULT_BACKEND: &str = "anu";

/// Default device address
pub const DEFAULT_DEVICE_ADDRESS: &str = ANU_FREE_URL;

/// Default device index (the only one the shipped devices expose)
pub const DEFAULT_DEVICE_INDEX: u32 = 0;

/// Default number of samples to request: 32 * 31_250 = 1_000_000 bits
/// under `encode_val`
pub const DEFAULT_SAMPLE_COUNT: usize = 31_250;

/// Default encoding policy
pub const DEFAULT_ENCODING: &str = "encode_val";

/// Default report format
pub const DEFAULT_FORMAT: &str = "text";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "qrng-nist";
