//! qrng-nist: QRNG sample collection and randomness testing
//!
//! A library and CLI tool that collects integer samples from a quantum random
//! number generator (or a mock file), encodes them into a bit sequence, and
//! runs the NIST SP800-22r1a statistical battery on it.
//!
//! ## Features
//!
//! - Device backends (ANU QRNG over HTTP, seeded pseudo-random)
//! - Mock mode reading one decimal sample per line
//! - `encode_val` (32 bits per sample) and `last_bits` (low byte) encodings
//! - All 15 SP800-22r1a tests with per-test eligibility
//! - Text and JSON reports
//!
//! ## Quick Start
//!
//! ```rust
//! use qrng_nist::encode::EncodingPolicy;
//! use qrng_nist::pipeline;
//! use qrng_nist::qrng::pseudo::PseudoDevice;
//! use qrng_nist::qrng::fetch_samples;
//!
//! let device = Box::new(PseudoDevice::seeded(42));
//! let samples = fetch_samples(device, 4096, 0).unwrap();
//!
//! let report = pipeline::evaluate(
//!     &samples,
//!     EncodingPolicy::EncodeVal,
//!     "pseudo".to_string(),
//!     false,
//! )
//! .unwrap();
//! println!("{} of {} tests passed", report.passed_count(), report.results.len());
//! ```

pub mod battery;
pub mod cli;
pub mod config;
pub mod constants;
pub mod encode;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod qrng;
pub mod source;

// Re-export commonly used types
pub use config::{Config, RunConfig};
pub use encode::EncodingPolicy;
pub use error::{Error, Result};
pub use pipeline::Report;
