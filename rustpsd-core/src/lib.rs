//! rustpsd-core: Core types for position-sensitive detector tube simulation.
//!
//! This crate provides the foundational types shared by the detector
//! pipeline: 3-vector math, trajectory and event-record abstractions,
//! detector configuration, and concurrency-safe histogram grids.
//!

pub mod config;
pub mod error;
pub mod histogram;
pub mod trajectory;
pub mod vec3;

pub use config::DetectorConfig;
pub use error::{Error, Result};
pub use histogram::{Grid1D, Grid2D, GridSnapshot, HistogramCell};
pub use trajectory::{FieldStore, MapFieldStore, Trajectory};
pub use vec3::Vec3;
