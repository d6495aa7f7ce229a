//! Sample collection
//!
//! Produces the ordered sample sequence, either from a mock file (one decimal
//! integer per line) or from a connected QRNG device.

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::qrng::{fetch_samples, open_device, DeviceParams};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Collect samples as configured
///
/// In mock mode, reads `data_path`. Otherwise connects to the configured
/// device, requests `sample_count` values and releases the device before
/// returning.
pub fn data_collection(config: &RunConfig) -> Result<Vec<u32>> {
    if config.mock {
        info!(path = %config.data_path.display(), "reading mock samples");
        return read_samples(&config.data_path);
    }

    let params = DeviceParams {
        backend: config.backend,
        address: &config.device_address,
        api_key: config.api_key.as_deref(),
        seed: config.seed,
    };
    info!(
        backend = %config.backend,
        address = %config.device_address,
        count = config.sample_count,
        "requesting samples from device"
    );
    let device = open_device(&params)?;
    fetch_samples(device, config.sample_count, config.device_index)
}

/// Read newline-delimited integers from `path`, in file order
///
/// Each line is trimmed before parsing. An empty or non-numeric line, or one
/// outside the 32-bit unsigned range, is a parse error.
pub fn read_samples(path: &Path) -> Result<Vec<u32>> {
    let file = File::open(path)?;
    parse_samples(BufReader::new(file))
}

/// Parse samples from any buffered reader
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<u32>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let value = line.trim();
        let sample = value.parse::<u32>().map_err(|_| Error::Parse {
            line: index + 1,
            value: value.to_string(),
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Write samples to `path` in the mock file format
pub fn write_samples(path: &Path, samples: &[u32]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }
    writer.flush()?;
    Ok(())
}
