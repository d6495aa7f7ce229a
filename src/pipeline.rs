//! One measurement run: collect → encode → evaluate
//!
//! Produces a `Report` that the formatters render. Only collection and
//! encoding can fail; test failures are part of the report.

use crate::battery::{
    check_eligibility_all_battery, run_all_battery, sp800_22r1a_battery, TimedResult,
};
use crate::config::RunConfig;
use crate::encode::{encode_input, EncodingPolicy};
use crate::error::Result;
use crate::source::data_collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// "mock:<path>" or "<backend>:<address>"
    pub source: String,
    pub encoding: EncodingPolicy,
    pub sample_count: usize,
    pub bit_count: usize,
    /// Eligible test names, in run order
    pub eligible: Vec<String>,
    pub results: Vec<TimedResult>,
}

impl Report {
    /// Number of tests that passed
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.passed).count()
    }
}

/// Describe where samples came from
pub fn describe_source(config: &RunConfig) -> String {
    if config.mock {
        format!("mock:{}", config.data_path.display())
    } else {
        format!("{}:{}", config.backend, config.device_address)
    }
}

/// Collect, encode and evaluate as configured
pub fn run(config: &RunConfig) -> Result<Report> {
    let samples = data_collection(config)?;
    info!(count = samples.len(), "samples collected");
    evaluate(&samples, config.encoding, describe_source(config), config.verbose)
}

/// Encode already-collected samples and run the battery on them
pub fn evaluate(
    samples: &[u32],
    encoding: EncodingPolicy,
    source: String,
    verbose: bool,
) -> Result<Report> {
    let bits = encode_input(samples, encoding)?;
    info!(policy = %encoding, bits = bits.len(), "samples encoded");

    let battery = sp800_22r1a_battery();
    let eligible = check_eligibility_all_battery(&bits, &battery);
    info!(
        eligible = eligible.len(),
        total = battery.len(),
        "eligibility checked"
    );

    let results = run_all_battery(&bits, &eligible, verbose);

    Ok(Report {
        generated_at: Utc::now(),
        source,
        encoding,
        sample_count: samples.len(),
        bit_count: bits.len(),
        eligible: eligible.iter().map(|t| t.name().to_string()).collect(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::qrng::DeviceBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mock_run_three_samples() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\n2\n3\n").unwrap();
        let config = RunConfig {
            mock: true,
            data_path: file.path().to_path_buf(),
            ..RunConfig::default()
        };

        // 3 samples * 32 bits = 96 bits: only serial (>= 64) is eligible
        let report = run(&config).unwrap();
        assert_eq!(report.sample_count, 3);
        assert_eq!(report.bit_count, 96);
        assert_eq!(report.eligible, vec!["serial".to_string()]);
        assert!(report.source.starts_with("mock:"));
    }

    #[test]
    fn test_empty_sample_set_reports_nothing() {
        let report = evaluate(&[], EncodingPolicy::EncodeVal, "test".into(), false).unwrap();
        assert_eq!(report.bit_count, 0);
        assert!(report.eligible.is_empty());
        assert!(report.results.is_empty());
        assert_eq!(report.passed_count(), 0);
    }

    #[test]
    fn test_one_sample_is_ineligible_everywhere() {
        let report = evaluate(&[5], EncodingPolicy::LastBits, "test".into(), false).unwrap();
        assert_eq!(report.bit_count, 8);
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_all_zero_samples_fail_monobit() {
        let samples = vec![0u32; 1_000];
        let report = evaluate(&samples, EncodingPolicy::EncodeVal, "test".into(), false).unwrap();
        let monobit = report
            .results
            .iter()
            .find(|r| r.result.name == "monobit")
            .unwrap();
        assert!(!monobit.result.passed);
    }

    #[test]
    fn test_map_val_aborts_run() {
        let err = evaluate(&[1, 2, 3], EncodingPolicy::MapVal, "test".into(), false).unwrap_err();
        assert!(matches!(err, Error::Unimplemented(_)));
    }

    #[test]
    fn test_pseudo_device_run() {
        let config = RunConfig {
            backend: DeviceBackend::Pseudo,
            seed: Some(2024),
            sample_count: 4_096,
            encoding: EncodingPolicy::LastBits,
            ..RunConfig::default()
        };
        let report = run(&config).unwrap();
        assert_eq!(report.bit_count, 4_096 * 8);
        assert_eq!(report.results.len(), report.eligible.len());
        assert!(report.source.starts_with("pseudo:"));
        for (name, timed) in report.eligible.iter().zip(&report.results) {
            assert_eq!(name, &timed.result.name);
        }
    }
}
