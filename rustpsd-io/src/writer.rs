//! File writers for histogram snapshots.

use crate::{Error, Result};
use rustpsd_core::GridSnapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for detector histogram output.
///
/// Writes (count, weight, weight-squared) snapshot arrays to files in CSV
/// or flat binary form; axis bounds travel in the header so downstream
/// tooling can reconstruct the bin geometry.
pub struct HistogramFileWriter {
    writer: BufWriter<File>,
}

fn check(snapshot: &GridSnapshot) -> Result<()> {
    let cells = snapshot.dims.0 * snapshot.dims.1;
    if snapshot.counts.len() != cells
        || snapshot.weights.len() != cells
        || snapshot.weight_squares.len() != cells
    {
        return Err(Error::MalformedSnapshot(format!(
            "dims {}x{} do not match array length {}",
            snapshot.dims.0,
            snapshot.dims.1,
            snapshot.counts.len()
        )));
    }
    Ok(())
}

impl HistogramFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Propagates file creation failures.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes a snapshot as CSV.
    ///
    /// One row per cell: `column,row,count,weight,weight_sq`, preceded by
    /// a `# bounds` comment carrying the axis limits.
    ///
    /// # Errors
    /// `MalformedSnapshot` on inconsistent dimensions, otherwise I/O.
    pub fn write_csv(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        check(snapshot)?;
        let (columns, rows) = snapshot.dims;
        writeln!(
            self.writer,
            "# bounds x=[{},{}] y=[{},{}]",
            snapshot.x_bounds.0, snapshot.x_bounds.1, snapshot.y_bounds.0, snapshot.y_bounds.1
        )?;
        writeln!(self.writer, "column,row,count,weight,weight_sq")?;

        for row in 0..rows {
            for column in 0..columns {
                let i = column * rows + row;
                writeln!(
                    self.writer,
                    "{},{},{},{},{}",
                    column, row, snapshot.counts[i], snapshot.weights[i], snapshot.weight_squares[i]
                )?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes a snapshot as binary data.
    ///
    /// Format: u64 columns + u64 rows + 4 x f64 axis bounds, then for each
    /// cell u64 (count) + f64 (weight) + f64 (weight_sq), all little-endian.
    ///
    /// # Errors
    /// `MalformedSnapshot` on inconsistent dimensions, otherwise I/O.
    pub fn write_binary(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        check(snapshot)?;
        self.writer
            .write_all(&(snapshot.dims.0 as u64).to_le_bytes())?;
        self.writer
            .write_all(&(snapshot.dims.1 as u64).to_le_bytes())?;
        for bound in [
            snapshot.x_bounds.0,
            snapshot.x_bounds.1,
            snapshot.y_bounds.0,
            snapshot.y_bounds.1,
        ] {
            self.writer.write_all(&bound.to_le_bytes())?;
        }

        for i in 0..snapshot.counts.len() {
            self.writer.write_all(&snapshot.counts[i].to_le_bytes())?;
            self.writer.write_all(&snapshot.weights[i].to_le_bytes())?;
            self.writer
                .write_all(&snapshot.weight_squares[i].to_le_bytes())?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> GridSnapshot {
        GridSnapshot {
            dims: (2, 3),
            x_bounds: (0.0, 2.0),
            y_bounds: (0.0, 3.0),
            counts: vec![1, 0, 2, 0, 0, 5],
            weights: vec![1.0, 0.0, 1.5, 0.0, 0.0, 4.25],
            weight_squares: vec![1.0, 0.0, 1.25, 0.0, 0.0, 3.75],
        }
    }

    #[test]
    fn test_csv_roundtrip_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");

        let mut writer = HistogramFileWriter::create(&path).unwrap();
        writer.write_csv(&snapshot()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("# bounds"));
        assert_eq!(lines[1], "column,row,count,weight,weight_sq");
        assert_eq!(lines.len(), 2 + 6);
        // Cell (1, 2) carries count 5.
        assert!(lines.iter().any(|l| l.starts_with("1,2,5,")));
    }

    #[test]
    fn test_binary_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.dat");

        let mut writer = HistogramFileWriter::create(&path).unwrap();
        writer.write_binary(&snapshot()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // Header: 2 u64 dims + 4 f64 bounds; body: 6 cells x 24 bytes.
        assert_eq!(bytes.len(), 16 + 32 + 6 * 24);
        assert_eq!(u64::from_le_bytes(bytes[0..8].try_into().unwrap()), 2);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 3);
    }

    #[test]
    fn test_malformed_snapshot_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = HistogramFileWriter::create(dir.path().join("bad.csv")).unwrap();

        let mut bad = snapshot();
        bad.counts.pop();
        assert!(writer.write_csv(&bad).is_err());
    }
}
