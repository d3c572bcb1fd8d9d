//! Wireframe export for visualization tooling.
//!
//! Translates per-tube radius, length, orientation, and center into
//! polylines an external viewer can draw. Rendering itself lives outside
//! this workspace; the export is plain geometry.

use crate::Result;
use rustpsd_core::vec3::Vec3;
use rustpsd_detector::TubeGeometry;
use std::f64::consts::TAU;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A connected run of vertices in the array frame.
pub type Polyline = Vec<Vec3>;

/// Wireframe of one tube: an end ring at each end plane and four
/// axis-parallel edges, with `segments` chords per ring.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tube_wireframe(tube: &TubeGeometry, segments: usize) -> Vec<Polyline> {
    let segments = segments.max(3);
    let h = tube.half_length();
    let r = tube.radius;

    let mut polylines = Vec::with_capacity(6);
    for end in [-h, h] {
        let ring: Polyline = (0..=segments)
            .map(|i| {
                let phi = TAU * (i as f64) / (segments as f64);
                tube.from_local([r * phi.cos(), end, r * phi.sin()])
            })
            .collect();
        polylines.push(ring);
    }

    for (x, z) in [(r, 0.0), (-r, 0.0), (0.0, r), (0.0, -r)] {
        polylines.push(vec![
            tube.from_local([x, -h, z]),
            tube.from_local([x, h, z]),
        ]);
    }
    polylines
}

/// Writes the whole array's wireframe as CSV.
///
/// One row per vertex: `tube,polyline,vertex,x,y,z`.
///
/// # Errors
/// Propagates file I/O failures.
pub fn write_wireframe_csv<P: AsRef<Path>>(
    path: P,
    tubes: &[TubeGeometry],
    segments: usize,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "tube,polyline,vertex,x,y,z")?;

    for (tube_index, tube) in tubes.iter().enumerate() {
        for (polyline_index, polyline) in tube_wireframe(tube, segments).iter().enumerate() {
            for (vertex_index, vertex) in polyline.iter().enumerate() {
                writeln!(
                    writer,
                    "{},{},{},{},{},{}",
                    tube_index, polyline_index, vertex_index, vertex[0], vertex[1], vertex[2]
                )?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
