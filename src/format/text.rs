//! Console text report formatter

use crate::constants::battery::BATTERY_NAME;
use crate::error::Result;
use crate::format::ReportFormatter;
use crate::pipeline::Report;
use std::fmt::Write;

/// Text formatter - eligible tests, then one PASSED/FAILED line per result
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Console report: eligible tests, then one line per result"
    }

    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(output, "Eligible test from {}:", BATTERY_NAME);
        for name in &report.eligible {
            let _ = writeln!(output, "-{}", name);
        }

        let _ = writeln!(output, "Test results:");
        for timed in &report.results {
            let result = &timed.result;
            let _ = writeln!(
                output,
                "- {} - score: {:.3} - {} - elapsed time: {} ms",
                if result.passed { "PASSED" } else { "FAILED" },
                result.score,
                result.name,
                timed.elapsed_ms
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support::sample_report;

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_report()).unwrap();
        let expected = "\
Eligible test from NIST-SP800-22r1a:
-monobit
-runs
Test results:
- PASSED - score: 0.527 - monobit - elapsed time: 0 ms
- FAILED - score: 0.000 - runs - elapsed time: 12 ms
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_no_results_prints_headers_only() {
        let mut report = sample_report();
        report.eligible.clear();
        report.results.clear();
        let output = TextFormatter.format(&report).unwrap();
        assert_eq!(output, "Eligible test from NIST-SP800-22r1a:\nTest results:\n");
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
