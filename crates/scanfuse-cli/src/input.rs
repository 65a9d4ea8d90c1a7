//! Scan documents – the JSON files `scanfuse solve` reads.
//!
//! ```json
//! { "scanners": [ { "id": 0, "beacons": [[404, -588, -901], [528, -643, 409]] } ] }
//! ```
//!
//! This is the ingestion boundary: reports are checked here before they ever
//! reach the registration engine.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use scanfuse_types::{ScanError, ScannerReport};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fewest beacons a report may carry.
pub const MIN_BEACONS: usize = 3;

/// A complete scan set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanDocument {
    /// Scanner reports; the first one is the default root frame.
    pub scanners: Vec<ScannerReport>,
}

impl ScanDocument {
    /// Reject empty sets, under-populated reports, repeated ids and beacons
    /// beyond ±[`COORDINATE_LIMIT`](scanfuse_types::COORDINATE_LIMIT).
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.scanners.is_empty() {
            return Err(ScanError::NoReports);
        }
        let mut seen = BTreeSet::new();
        for report in &self.scanners {
            if !seen.insert(report.id()) {
                return Err(ScanError::DuplicateScannerId(report.id()));
            }
            if report.len() < MIN_BEACONS {
                return Err(ScanError::MalformedReport {
                    id: report.id(),
                    reason: format!(
                        "{} distinct beacon(s), at least {} required",
                        report.len(),
                        MIN_BEACONS
                    ),
                });
            }
            report.check_coordinates()?;
        }
        Ok(())
    }
}

/// Parse a scan document from JSON text.
pub fn parse(raw: &str) -> Result<ScanDocument, String> {
    serde_json::from_str(raw).map_err(|e| format!("Failed to parse scan document: {}", e))
}

/// Read, parse and validate the scan document at `path`.
pub fn load(path: &Path) -> Result<ScanDocument, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let doc = parse(&raw)?;
    doc.validate().map_err(|e| e.to_string())?;
    Ok(doc)
}

/// JSON Schema describing [`ScanDocument`].
pub fn schema_json() -> Result<String, String> {
    let schema = schemars::schema_for!(ScanDocument);
    serde_json::to_string_pretty(&schema).map_err(|e| format!("Failed to render schema: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanfuse_types::Point3;

    const DOC: &str = r#"{
        "scanners": [
            { "id": 0, "beacons": [[0,2,0],[4,1,0],[3,3,0]] },
            { "id": 1, "beacons": [[-1,-1,0],[-5,0,0],[-2,1,0],[-5,0,0]] }
        ]
    }"#;

    #[test]
    fn parses_document() {
        let doc = parse(DOC).unwrap();
        assert_eq!(doc.scanners.len(), 2);
        assert_eq!(doc.scanners[1].len(), 3, "duplicate beacon collapses");
        assert!(doc.scanners[0].beacons().contains(&Point3::new(4, 1, 0)));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn rejects_sparse_reports() {
        let doc = parse(r#"{"scanners":[{"id":5,"beacons":[[1,1,1],[2,2,2]]}]}"#).unwrap();
        match doc.validate() {
            Err(ScanError::MalformedReport { id, reason }) => {
                assert_eq!(id, 5);
                assert!(reason.contains("2 distinct"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_coordinates_beyond_the_limit() {
        let raw = format!(
            r#"{{"scanners":[{{"id":3,"beacons":[[0,0,0],[1,1,1],[{},0,0]]}}]}}"#,
            i32::MIN
        );
        let doc = parse(&raw).unwrap();
        match doc.validate() {
            Err(ScanError::MalformedReport { id, reason }) => {
                assert_eq!(id, 3);
                assert!(reason.contains("outside"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let limit = scanfuse_types::COORDINATE_LIMIT;
        let doc = ScanDocument {
            scanners: vec![ScannerReport::new(
                0,
                [Point3::new(limit, 0, 0), Point3::new(-limit, 0, 0), Point3::new(0, limit, -limit)],
            )],
        };
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_ids_and_empty_sets() {
        let doc = ScanDocument {
            scanners: vec![
                ScannerReport::new(2, [Point3::new(0, 0, 0), Point3::new(1, 0, 0), Point3::new(0, 1, 0)]),
                ScannerReport::new(2, [Point3::new(0, 0, 1), Point3::new(1, 0, 1), Point3::new(0, 1, 1)]),
            ],
        };
        assert_eq!(doc.validate(), Err(ScanError::DuplicateScannerId(2)));
        assert_eq!(ScanDocument { scanners: vec![] }.validate(), Err(ScanError::NoReports));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse(r#"{"scanners":[{"id":0,"beacons":[[1,2]]}]}"#).unwrap_err();
        assert!(err.starts_with("Failed to parse scan document"), "{err}");
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("scan.json");
        std::fs::write(&path, DOC).expect("write");
        assert_eq!(load(&path).unwrap().scanners.len(), 2);

        let missing = dir.path().join("missing.json");
        assert!(load(&missing).unwrap_err().contains("Failed to read"));
    }

    #[test]
    fn schema_describes_scanners() {
        let schema = schema_json().unwrap();
        assert!(schema.contains("\"scanners\""));
        assert!(schema.contains("\"beacons\""));
    }
}
