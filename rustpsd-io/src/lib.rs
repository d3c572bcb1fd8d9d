//! rustpsd-io: Persistence collaborators for detector simulations.
//!
//! Consumes raw histogram snapshots and tube geometry; owns the file
//! formats (CSV and flat binary), nothing else.

pub mod error;
pub mod wireframe;
pub mod writer;

pub use error::{Error, Result};
pub use wireframe::{tube_wireframe, write_wireframe_csv, Polyline};
pub use writer::HistogramFileWriter;
