//! JSON output formatter

use crate::error::Result;
use crate::format::ReportFormatter;
use crate::pipeline::Report;

/// JSON formatter - outputs the full report
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support::sample_report;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter.format(&sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["encoding"], "encode_val");
        assert_eq!(parsed["bit_count"], 128);
        assert_eq!(parsed["eligible"][1], "runs");
        assert_eq!(parsed["results"][0]["name"], "monobit");
        assert_eq!(parsed["results"][0]["passed"], true);
        assert_eq!(parsed["results"][1]["elapsed_ms"], 12);
    }

    #[test]
    fn test_json_roundtrip() {
        let output = JsonFormatter.format(&sample_report()).unwrap();
        let report: Report = serde_json::from_str(&output).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.source, "mock:samples.txt");
    }
}
