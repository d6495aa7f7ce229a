//! QRNG (Quantum Random Number Generator) devices
//!
//! This module defines the `QrngDevice` trait, the `DeviceSession` guard that
//! scopes a connection, and the device implementations. Each device is a
//! single file implementing the trait.
//!
//! ## Flex Point
//! Adding a new device requires:
//! 1. Create `src/qrng/{device_name}.rs` implementing `QrngDevice`
//! 2. Add `pub mod {device_name};` below
//! 3. Add a variant to `DeviceBackend` and a match arm in `open_device`

pub mod anu;
pub mod pseudo;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Trait for quantum random number generator devices
///
/// A device is connected when constructed and stays connected until
/// `disconnect` is called. Use `DeviceSession` to guarantee the release.
pub trait QrngDevice: Send {
    /// Returns the device name (e.g., "anu", "pseudo")
    fn name(&self) -> &'static str;

    /// Request `count` random 32-bit values from device `device_index`
    ///
    /// # Returns
    /// Vec of exactly `count` values, in the order the device produced them
    fn get_random(&mut self, count: usize, device_index: u32) -> Result<Vec<u32>>;

    /// Terminate the connection
    ///
    /// Calling this more than once is allowed and is a no-op after the first.
    fn disconnect(&mut self) -> Result<()>;
}

/// Which device implementation to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceBackend {
    /// ANU quantum numbers HTTP service
    Anu,
    /// Local pseudo-random generator
    Pseudo,
}

impl DeviceBackend {
    /// All backends, in display order
    pub fn all() -> &'static [DeviceBackend] {
        &[DeviceBackend::Anu, DeviceBackend::Pseudo]
    }

    /// Config/CLI name of this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceBackend::Anu => "anu",
            DeviceBackend::Pseudo => "pseudo",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            DeviceBackend::Anu => "Australian National University Quantum Random Number Generator",
            DeviceBackend::Pseudo => "Pseudo-random number generator (for testing)",
        }
    }
}

impl fmt::Display for DeviceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anu" => Ok(DeviceBackend::Anu),
            "pseudo" => Ok(DeviceBackend::Pseudo),
            other => Err(Error::InvalidArgument(format!(
                "Unknown device backend: {} (expected one of: anu, pseudo)",
                other
            ))),
        }
    }
}

/// Connection parameters for `open_device`
#[derive(Debug, Clone)]
pub struct DeviceParams<'a> {
    pub backend: DeviceBackend,
    pub address: &'a str,
    pub api_key: Option<&'a str>,
    pub seed: Option<u64>,
}

/// Connect to the configured device
pub fn open_device(params: &DeviceParams<'_>) -> Result<Box<dyn QrngDevice>> {
    debug!(backend = %params.backend, address = params.address, "connecting to device");
    match params.backend {
        DeviceBackend::Anu => Ok(Box::new(anu::AnuDevice::connect(
            params.address,
            params.api_key,
        )?)),
        DeviceBackend::Pseudo => Ok(match params.seed {
            Some(seed) => Box::new(pseudo::PseudoDevice::seeded(seed)),
            None => Box::new(pseudo::PseudoDevice::new()),
        }),
    }
}

/// Rejects any device index other than 0
///
/// Both shipped devices expose exactly one generator.
pub(crate) fn check_single_device_index(device_index: u32) -> Result<()> {
    if device_index != 0 {
        return Err(Error::InvalidArgument(format!(
            "Device index {} does not exist; this device only has index 0",
            device_index
        )));
    }
    Ok(())
}

/// Scoped ownership of a connected device
///
/// The device is disconnected exactly once: either by `close`, or on drop if
/// the session is abandoned early (error propagation, panic).
pub struct DeviceSession {
    device: Option<Box<dyn QrngDevice>>,
}

impl DeviceSession {
    /// Take ownership of a connected device
    pub fn open(device: Box<dyn QrngDevice>) -> Self {
        Self {
            device: Some(device),
        }
    }

    /// Request samples from the underlying device
    pub fn get_random(&mut self, count: usize, device_index: u32) -> Result<Vec<u32>> {
        match self.device.as_mut() {
            Some(device) => device.get_random(count, device_index),
            None => Err(Error::Qrng("Device session already closed".to_string())),
        }
    }

    /// Disconnect now and report the outcome
    pub fn close(mut self) -> Result<()> {
        match self.device.take() {
            Some(mut device) => device.disconnect(),
            None => Ok(()),
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.disconnect() {
                warn!(device = device.name(), "disconnect failed: {}", e);
            }
        }
    }
}

/// Fetch `count` samples inside a scoped session
///
/// The device is released before this returns, whether or not the request
/// succeeded. A request error takes precedence over a disconnect error.
pub fn fetch_samples(
    device: Box<dyn QrngDevice>,
    count: usize,
    device_index: u32,
) -> Result<Vec<u32>> {
    let name = device.name();
    let mut session = DeviceSession::open(device);
    let samples = session.get_random(count, device_index)?;
    session.close()?;
    debug!(device = name, count = samples.len(), "device session closed");
    Ok(samples)
}
