//! Pseudo-random device for testing
//!
//! Uses the `rand` crate. This is NOT quantum random, but provides a fast,
//! deterministic-when-seeded device for offline runs and tests.

use crate::error::{Error, Result};
use crate::qrng::{check_single_device_index, QrngDevice};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pseudo-random number generator device
pub struct PseudoDevice {
    // None once disconnected
    rng: Option<StdRng>,
}

impl PseudoDevice {
    /// Create a device seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Some(StdRng::from_entropy()),
        }
    }

    /// Create a seeded device
    ///
    /// Using the same seed will produce the same sequence of samples.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Whether `disconnect` has been called
    pub fn is_connected(&self) -> bool {
        self.rng.is_some()
    }
}

impl Default for PseudoDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl QrngDevice for PseudoDevice {
    fn name(&self) -> &'static str {
        "pseudo"
    }

    fn get_random(&mut self, count: usize, device_index: u32) -> Result<Vec<u32>> {
        check_single_device_index(device_index)?;
        let rng = self
            .rng
            .as_mut()
            .ok_or_else(|| Error::Qrng("Pseudo device is disconnected".to_string()))?;
        Ok((0..count).map(|_| rng.gen::<u32>()).collect())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.rng = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_device_count() {
        let mut device = PseudoDevice::new();
        let samples = device.get_random(100, 0).unwrap();
        assert_eq!(samples.len(), 100);
    }

    #[test]
    fn test_seeded_device_reproducible() {
        let mut device1 = PseudoDevice::seeded(42);
        let mut device2 = PseudoDevice::seeded(42);

        let samples1 = device1.get_random(100, 0).unwrap();
        let samples2 = device2.get_random(100, 0).unwrap();

        assert_eq!(samples1, samples2);
    }

    #[test]
    fn test_disconnected_device_refuses_requests() {
        let mut device = PseudoDevice::seeded(1);
        device.disconnect().unwrap();
        assert!(!device.is_connected());
        assert!(device.get_random(1, 0).is_err());
        // Second disconnect is a no-op
        assert!(device.disconnect().is_ok());
    }

    #[test]
    fn test_rejects_unknown_index() {
        let mut device = PseudoDevice::seeded(1);
        assert!(matches!(
            device.get_random(1, 3),
            Err(Error::InvalidArgument(_))
        ));
    }
}
