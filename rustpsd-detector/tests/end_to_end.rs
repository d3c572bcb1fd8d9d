#![allow(clippy::uninlined_format_args)]
//! End-to-end scenarios over a fully assembled tube array.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustpsd_core::{DetectorConfig, MapFieldStore, Trajectory};
use rustpsd_detector::{Outcome, TubeArray};

/// Reference instrument: 3 half-inch tubes, 0.5 m long, linear raster
/// over 0.05 m, series-wired, 100 pixels per tube.
fn reference_config() -> DetectorConfig {
    DetectorConfig::new()
        .with_tube_count(3)
        .with_series(true)
        .with_pixels_per_tube(100)
        .with_radius(0.00625)
        .with_width(0.05)
        .with_height(0.5)
        .with_resistivity(1000.0)
        .with_target_1d("wire.dat")
}

fn reference_array() -> TubeArray {
    TubeArray::new(reference_config(), &MapFieldStore::new()).unwrap()
}

fn process_one(array: &TubeArray, trajectory: Trajectory, seed: u64) -> Outcome {
    let mut fields = MapFieldStore::new();
    let mut rng = StdRng::seed_from_u64(seed);
    array.process(&trajectory, &mut fields, &mut rng)
}

#[test]
fn test_reference_midpoint_hit() {
    let array = reference_array();

    // Enters tube 1 exactly at its midpoint with zero transverse velocity.
    let trajectory = Trajectory::new([0.0, 0.0, -1.0], [0.0, 0.0, 1000.0]);
    let Outcome::Hit(hit) = process_one(&array, trajectory, 1) else {
        panic!("expected a hit on tube 1");
    };

    assert_eq!(hit.tube, 1);
    assert_relative_eq!(hit.fractional_position, 0.5);
    assert_eq!(hit.pixel, 50);
    assert_eq!(hit.flattened_pixel, Some(150));
}

#[test]
fn test_entry_inside_higher_tube_selects_it() {
    let array = reference_array();

    // Starts strictly inside tube 2's volume, outside tubes 0 and 1.
    let trajectory = Trajectory::new([0.01875, 0.0, 0.0], [0.0, 0.0, 1000.0]);
    let Outcome::Hit(hit) = process_one(&array, trajectory, 2) else {
        panic!("expected a hit on tube 2");
    };
    assert_eq!(hit.tube, 2);
}

#[test]
fn test_charge_conservation_over_many_events() {
    let array = reference_array();
    for seed in 0..500u32 {
        let x = -0.02 + 0.00008 * f64::from(seed);
        let trajectory = Trajectory::new([x, 0.0, -1.0], [0.0, 0.0, 800.0]);
        if let Outcome::Hit(hit) = process_one(&array, trajectory, u64::from(seed)) {
            assert_eq!(hit.left + hit.right, hit.pulse);
            assert!(hit.pulse >= array.config().threshold);
            assert!(hit.pulse <= array.config().max_level);
        }
    }
}

#[test]
fn test_series_total_resistance_is_chain_sum() {
    let config = reference_config().with_inter_resistance(25.0);
    let array = TubeArray::new(config, &MapFieldStore::new()).unwrap();
    let network = array.network();

    let chain: f64 = (0..3).map(|i| network.base_resistance(i)).sum();
    for tube in 0..3 {
        assert_relative_eq!(network.total_resistance[tube], chain);
    }
}

#[test]
fn test_zero_pressure_leaves_weight_unchanged() {
    let array = reference_array();
    let trajectory = Trajectory::new([0.0, 0.0, -1.0], [0.0, 0.0, 1000.0]).with_weight(0.75);
    let Outcome::Hit(hit) = process_one(&array, trajectory, 3) else {
        panic!("expected a hit");
    };
    assert_relative_eq!(hit.weight, 0.75);
}

#[test]
fn test_positive_pressure_attenuates_weight() {
    let config = reference_config().with_pressure(5.0);
    let array = TubeArray::new(config, &MapFieldStore::new()).unwrap();
    let trajectory = Trajectory::new([0.0, 0.0, -1.0], [0.0, 0.0, 1000.0]);
    let Outcome::Hit(hit) = process_one(&array, trajectory, 4) else {
        panic!("expected a hit");
    };
    assert!(hit.weight > 0.0 && hit.weight < 1.0);
}

#[test]
fn test_dead_zone_full_weight_at_midpoint() {
    let config = reference_config().with_dead_length(0.05);
    let array = TubeArray::new(config, &MapFieldStore::new()).unwrap();

    let center = Trajectory::new([0.0, 0.0, -1.0], [0.0, 0.0, 1000.0]);
    let Outcome::Hit(hit) = process_one(&array, center, 5) else {
        panic!("expected a hit");
    };
    assert_relative_eq!(hit.weight, 1.0);

    // Near the tube end the ramp suppresses the weight.
    let near_end = Trajectory::new([0.0, 0.24, -1.0], [0.0, 0.0, 1000.0]);
    let Outcome::Hit(hit) = process_one(&array, near_end, 6) else {
        panic!("expected a hit");
    };
    assert!(hit.weight < 1.0);
}

#[test]
fn test_geometry_rebuild_is_deterministic() {
    let config = reference_config().with_curvature(2.5);
    let a = TubeArray::new(config.clone(), &MapFieldStore::new()).unwrap();
    let b = TubeArray::new(config, &MapFieldStore::new()).unwrap();

    assert_eq!(a.geometry(), b.geometry());
    assert_eq!(a.network(), b.network());
}

#[test]
fn test_overlapping_raster_fails_construction() {
    // 10 tubes of the reference radius cannot fit in 0.05 m.
    let config = reference_config().with_tube_count(10);
    assert!(TubeArray::new(config.clone(), &MapFieldStore::new()).is_err());

    // Unless the caller disables validation.
    let mut unchecked = config;
    unchecked.skip_overlap_check = true;
    assert!(TubeArray::new(unchecked, &MapFieldStore::new()).is_ok());
}

#[test]
fn test_parallel_and_serial_accumulation_agree() {
    let trajectories: Vec<_> = (0..300)
        .map(|i| {
            let x = -0.025 + 0.000_166 * f64::from(i);
            Trajectory::new([x, 0.0, -1.0], [0.0, 0.0, 1000.0])
        })
        .collect();

    let parallel = reference_array();
    let summary = parallel.process_batch(&trajectories, 99);

    let serial = reference_array();
    let mut hits = 0;
    for (index, trajectory) in trajectories.iter().enumerate() {
        let mut fields = serial.field_store_template();
        let mut rng = StdRng::seed_from_u64(99 ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        if let Outcome::Hit(_) = serial.process(trajectory, &mut fields, &mut rng) {
            hits += 1;
        }
    }

    assert_eq!(summary.hits, hits);
    assert_eq!(
        parallel.snapshot_2d().counts,
        serial.snapshot_2d().counts,
        "parallel and serial accumulation must agree bin by bin"
    );
}
