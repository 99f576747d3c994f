//! Reference power curve
//!
//! A static two-column table (wind speed, power) with a header row. It is
//! loaded once when the engine is built and attached unchanged to series and
//! power-curve responses.

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};
use windscope_core::ReferenceCurve;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: expected two numeric columns")]
    BadRow { row: usize },
}

/// Read a reference curve from CSV
pub fn read_reference_curve(reader: impl Read) -> Result<ReferenceCurve, ReferenceError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut curve = ReferenceCurve {
        wind: Vec::new(),
        power: Vec::new(),
    };
    for (index, record) in csv.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let wind = record.get(0).and_then(|v| v.parse::<f64>().ok());
        let power = record.get(1).and_then(|v| v.parse::<f64>().ok());
        match (wind, power) {
            (Some(wind), Some(power)) => {
                curve.wind.push(wind);
                curve.power.push(power);
            }
            // Row numbers count the header as row 1
            _ => return Err(ReferenceError::BadRow { row: index + 2 }),
        }
    }
    Ok(curve)
}

/// Load the configured reference curve; failures are logged and yield `None`
pub fn load_reference_curve(path: &Path) -> Option<ReferenceCurve> {
    let result = std::fs::File::open(path)
        .map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })
        .and_then(read_reference_curve);

    match result {
        Ok(curve) => {
            info!(path = %path.display(), points = curve.wind.len(), "Reference curve loaded");
            Some(curve)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Reference curve unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_curve() {
        let csv = "wind,power\n3.0, 25\n4.5,120.5\n\n5,310\n";
        let curve = read_reference_curve(csv.as_bytes()).unwrap();
        assert_eq!(curve.wind, vec![3.0, 4.5, 5.0]);
        assert_eq!(curve.power, vec![25.0, 120.5, 310.0]);
    }

    #[test]
    fn test_bad_row_rejects_curve() {
        let csv = "wind,power\n3.0,25\n4.5\n";
        assert!(matches!(
            read_reference_curve(csv.as_bytes()),
            Err(ReferenceError::BadRow { row: 3 })
        ));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_reference_curve(&dir.path().join("refpc.csv")).is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ws,p\n10,1800").unwrap();
        let curve = load_reference_curve(file.path()).unwrap();
        assert_eq!(curve.power, vec![1800.0]);
    }
}
