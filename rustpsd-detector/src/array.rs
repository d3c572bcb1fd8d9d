//! Tube array assembly and per-event processing.
//!
//! [`TubeArray::new`] runs the one-time setup pipeline (geometry builder,
//! network builder, overlap validation, field-name resolution); the result
//! is immutable and shared by reference across event workers. Per event,
//! [`TubeArray::process`] runs intersection search, position/efficiency,
//! charge division, and histogram accumulation; [`TubeArray::process_batch`]
//! drives the same path data-parallel over a trajectory slice.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use crate::geometry::{build_geometry, TubeGeometry};
use crate::intersect::first_crossing;
use crate::network::{build_network, TubeNetwork};
use crate::overlap::validate_no_overlap;
use crate::response::{
    dead_zone_factor, divide_charge, fractional_position, gas_absorption_factor, sample_pulse,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustpsd_core::{
    DetectorConfig, Error, FieldStore, Grid1D, Grid2D, GridSnapshot, MapFieldStore, Result,
    Trajectory,
};

/// Per-event seed mixing constant (golden-ratio increment).
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of one processed trajectory.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The trajectory was absorbed in a tube.
    Hit(HitInfo),
    /// No tube was crossed; the trajectory leaves this detector untouched.
    Miss,
}

/// Details of a registered hit.
#[derive(Debug, Clone, PartialEq)]
pub struct HitInfo {
    /// Index of the hit tube.
    pub tube: usize,
    /// Fractional position along the tube, before any series flip.
    pub fractional_position: f64,
    /// Chain-oriented fractional position (flipped on odd tubes in series).
    pub wire_position: f64,
    /// Local pixel in the per-tube grid.
    pub pixel: usize,
    /// Flattened wire pixel, when the 1-D grid is active.
    pub flattened_pixel: Option<usize>,
    /// Simulated total pulse height (channels).
    pub pulse: f64,
    /// Left charge reading (exact complement of the right reading).
    pub left: f64,
    /// Right charge reading (rounded to a whole channel).
    pub right: f64,
    /// Event weight after efficiency corrections, as accumulated.
    pub weight: f64,
    /// Detection time (s).
    pub time: f64,
    /// Readout wire index.
    pub wire_index: i32,
    /// The unchanged trajectory, present when pass-through is configured.
    pub restored: Option<Trajectory>,
}

/// Aggregate statistics of a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchSummary {
    /// Trajectories processed.
    pub events: u64,
    /// Registered hits.
    pub hits: u64,
    /// Misses.
    pub misses: u64,
    /// Accumulated hit weight.
    pub weight: f64,
}

impl BatchSummary {
    /// Combines two partial summaries.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            events: self.events + other.events,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            weight: self.weight + other.weight,
        }
    }
}

/// An immutable, fully derived tube array detector.
#[derive(Debug)]
pub struct TubeArray {
    config: DetectorConfig,
    geometry: Vec<TubeGeometry>,
    network: TubeNetwork,
    field_left: Option<String>,
    field_right: Option<String>,
    field_time: Option<String>,
    field_wire: Option<String>,
    grid_2d: Grid2D,
    grid_1d: Option<Grid1D>,
}

/// Treats unset and empty field names alike.
fn configured(name: Option<&String>) -> Option<String> {
    name.filter(|n| !n.is_empty()).cloned()
}

impl TubeArray {
    /// Builds the detector: geometry, resistive network, overlap
    /// validation, and field-name resolution against the event schema.
    ///
    /// A non-positive tube count produces an empty, always-missing
    /// detector with a warning.
    ///
    /// # Errors
    /// Construction fails on overlapping tubes (unless validation is
    /// disabled), a configured field name missing from the schema, or
    /// inconsistent configuration arrays.
    pub fn new<S: FieldStore>(config: DetectorConfig, schema: &S) -> Result<Self> {
        if config.tube_count <= 0 {
            log::warn!(
                "tube count {} is not positive; detector will never register a hit",
                config.tube_count
            );
        }

        let field_left = configured(config.field_left.as_ref());
        let field_right = configured(config.field_right.as_ref());
        let field_time = configured(config.field_time.as_ref());
        let field_wire = configured(config.field_wire.as_ref());
        for name in [&field_left, &field_right, &field_time, &field_wire]
            .into_iter()
            .flatten()
        {
            if !schema.has_field(name) {
                return Err(Error::UnknownField(name.clone()));
            }
        }

        let geometry = build_geometry(&config)?;
        let network = build_network(&config, &geometry)?;
        if config.skip_overlap_check {
            log::warn!("overlap validation disabled by configuration");
        } else {
            validate_no_overlap(&geometry)?;
        }

        let tubes = geometry.len();
        let grid_2d = Grid2D::new(tubes, config.pixels_per_tube);
        let grid_1d = config
            .flattened_grid_enabled()
            .then(|| Grid1D::new(tubes * config.pixels_per_tube));

        Ok(Self {
            config,
            geometry,
            network,
            field_left,
            field_right,
            field_time,
            field_wire,
            grid_2d,
            grid_1d,
        })
    }

    /// Processes one trajectory end to end.
    ///
    /// Hit and miss are both normal terminal states; histogram cells are
    /// the only state mutated, so `&self` is safe to share across workers.
    pub fn process<S: FieldStore, R: Rng>(
        &self,
        trajectory: &Trajectory,
        fields: &mut S,
        rng: &mut R,
    ) -> Outcome {
        let Some(crossing) = first_crossing(&self.geometry, trajectory) else {
            return Outcome::Miss;
        };
        let tube = crossing.tube;
        let length = self.geometry[tube].length;

        let Some(frac) = fractional_position(&crossing, length) else {
            return Outcome::Miss;
        };

        let mut weight = trajectory.weight;
        weight *= gas_absorption_factor(self.config.pressure, crossing.t_out - crossing.t_in);
        weight *= dead_zone_factor(self.config.dead_length, frac, length);

        // The per-tube grid bins the unflipped position; the chain
        // coordinate flips on odd tubes so a series wire stays monotonic.
        let pixels = self.config.pixels_per_tube;
        let pixel = (pixels as f64 * frac).floor() as usize;
        let wire_position = if self.config.series && tube % 2 == 1 {
            1.0 - frac
        } else {
            frac
        };

        let pulse = sample_pulse(rng, self.config.threshold, self.config.max_level);
        let right_resistance = self.network.chain_offset[tube]
            + self.network.pre_contact[tube]
            + wire_position * self.network.wire_resistance[tube];
        let (left, right) = divide_charge(pulse, right_resistance, self.network.total_resistance[tube]);

        let time = trajectory.time + 0.5 * (crossing.t_in + crossing.t_out) + self.config.tof_offset;
        let wire_index = self.config.wire_base + self.config.wire_step * tube as i32;

        if let Some(name) = &self.field_left {
            fields.set_field(name, left);
        }
        if let Some(name) = &self.field_right {
            fields.set_field(name, right);
        }
        if let Some(name) = &self.field_time {
            fields.set_field(name, time);
        }
        if let Some(name) = &self.field_wire {
            fields.set_field(name, f64::from(wire_index));
        }

        self.grid_2d.record(tube, pixel, weight);
        let flattened_pixel = self.grid_1d.as_ref().map(|grid| {
            let bin = (pixels as f64 * wire_position).floor() as usize + tube * pixels;
            grid.record(bin, weight);
            bin
        });

        Outcome::Hit(HitInfo {
            tube,
            fractional_position: frac,
            wire_position,
            pixel,
            flattened_pixel,
            pulse,
            left,
            right,
            weight,
            time,
            wire_index,
            restored: self.config.restore_trajectory.then_some(*trajectory),
        })
    }

    /// Processes a trajectory slice data-parallel.
    ///
    /// Each event gets its own deterministic RNG stream derived from
    /// `seed` and the event index, and a worker-local field store built
    /// from the configured names, so results are independent of the
    /// parallel split.
    #[must_use]
    pub fn process_batch(&self, trajectories: &[Trajectory], seed: u64) -> BatchSummary {
        trajectories
            .par_iter()
            .enumerate()
            .map_init(
                || self.field_store_template(),
                |fields, (index, trajectory)| {
                    let mut rng =
                        StdRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(SEED_MIX));
                    match self.process(trajectory, fields, &mut rng) {
                        Outcome::Hit(hit) => BatchSummary {
                            events: 1,
                            hits: 1,
                            misses: 0,
                            weight: hit.weight,
                        },
                        Outcome::Miss => BatchSummary {
                            events: 1,
                            hits: 0,
                            misses: 1,
                            weight: 0.0,
                        },
                    }
                },
            )
            .reduce(BatchSummary::default, BatchSummary::merge)
    }

    /// A field store with every configured name declared; used as the
    /// worker-local record in batch mode.
    #[must_use]
    pub fn field_store_template(&self) -> MapFieldStore {
        MapFieldStore::with_fields(
            [
                &self.field_left,
                &self.field_right,
                &self.field_time,
                &self.field_wire,
            ]
            .into_iter()
            .flatten()
            .cloned(),
        )
    }

    /// Detector configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Derived tube geometries (for validation and wireframe export).
    #[must_use]
    pub fn geometry(&self) -> &[TubeGeometry] {
        &self.geometry
    }

    /// Derived resistive network.
    #[must_use]
    pub fn network(&self) -> &TubeNetwork {
        &self.network
    }

    /// Per-tube grid accessor.
    #[must_use]
    pub fn grid_2d(&self) -> &Grid2D {
        &self.grid_2d
    }

    /// Flattened grid accessor, when active.
    #[must_use]
    pub fn grid_1d(&self) -> Option<&Grid1D> {
        self.grid_1d.as_ref()
    }

    /// Snapshot of the per-tube grid for persistence.
    #[must_use]
    pub fn snapshot_2d(&self) -> GridSnapshot {
        self.grid_2d.snapshot()
    }

    /// Snapshot of the flattened grid, when active.
    #[must_use]
    pub fn snapshot_1d(&self) -> Option<GridSnapshot> {
        self.grid_1d.as_ref().map(Grid1D::snapshot)
    }
}
