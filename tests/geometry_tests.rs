// Beam geometry: grid layout, rotation and placement relative to the observer.

use distance_beam::constants::MAX_BEAM_MARKERS;
use distance_beam::geometry::{beam_origin, direction_to_target, grid_offsets, rotate_xz};
use distance_beam::{generate_beam, generate_beam_into, BeamConfig, GeometryError};
use glam::{DVec2, DVec3};
use rand::prelude::*;

const EPS: f64 = 1e-9;

fn close(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < EPS
}

fn scenario_config() -> BeamConfig {
    BeamConfig {
        beam_size: 2.0,
        particle_spacing: 1.0,
        particle_count: 2,
        center_distance: 10.0,
        target: DVec2::ZERO,
        ..BeamConfig::default()
    }
}

#[test]
fn rotation_preserves_distance_from_center() {
    let offsets = [
        DVec2::new(0.5, 0.0),
        DVec2::new(-0.5, 0.5),
        DVec2::new(1.25, -3.0),
        DVec2::new(0.0, 0.0),
    ];
    for step in 0..720 {
        let angle = step as f64 * 0.0137 - 3.0;
        for offset in offsets {
            let rotated = rotate_xz(offset, angle);
            let before = offset.x * offset.x + offset.y * offset.y;
            let after = rotated.x * rotated.x + rotated.y * rotated.y;
            assert!(
                (before - after).abs() < EPS,
                "angle {angle}: |{offset:?}|^2={before} but rotated {rotated:?} has {after}"
            );
        }
    }
}

#[test]
fn quarter_turn_maps_x_onto_z() {
    let rotated = rotate_xz(DVec2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
    assert!(rotated.x.abs() < EPS);
    assert!((rotated.y - 1.0).abs() < EPS);
}

#[test]
fn scenario_a_two_layers_of_nine_markers() {
    let config = scenario_config();
    let observer = DVec3::new(20.0, 5.0, 0.0);

    let origin = beam_origin(config.target, observer, config.center_distance).unwrap();
    assert!(close(origin, DVec3::new(10.0, 5.0, 0.0)), "origin {origin:?}");

    let points = generate_beam(config.target, observer, 0.0, &config).unwrap();
    assert_eq!(points.len(), 18);

    let mut expected = Vec::new();
    for y in [5.0, 6.0] {
        for x in [9.0, 10.0, 11.0] {
            for z in [-1.0, 0.0, 1.0] {
                expected.push(DVec3::new(x, y, z));
            }
        }
    }
    for (i, (got, want)) in points.iter().zip(&expected).enumerate() {
        assert!(close(*got, *want), "point {i}: got {got:?}, want {want:?}");
    }
}

#[test]
fn origin_sits_on_the_proximity_sphere() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = BeamConfig {
        center_distance: 25.0,
        target: DVec2::new(-12.0, 40.0),
        ..BeamConfig::default()
    };
    for _ in 0..200 {
        let observer = DVec3::new(
            rng.gen_range(-500.0..500.0),
            rng.gen_range(0.0..255.0),
            rng.gen_range(-500.0..500.0),
        );
        let origin = beam_origin(config.target, observer, config.center_distance).unwrap();
        let d = origin.distance(observer);
        assert!(
            (d - config.center_distance).abs() < 1e-9,
            "origin {origin:?} is {d} from observer {observer:?}"
        );
        assert_eq!(origin.y, observer.y, "beam must start at the observer's height");
    }
}

#[test]
fn direction_points_toward_target_horizontally() {
    let dir = direction_to_target(DVec2::new(0.0, 10.0), DVec3::new(0.0, 64.0, 0.0)).unwrap();
    assert!(close(dir, DVec3::new(0.0, 0.0, 1.0)), "dir {dir:?}");
}

#[test]
fn identical_inputs_give_identical_beams() {
    let config = BeamConfig {
        particle_count: 12,
        ..BeamConfig::default()
    };
    let observer = DVec3::new(150.0, 70.0, -80.0);
    let a = generate_beam(config.target, observer, 1.234, &config).unwrap();
    let b = generate_beam(config.target, observer, 1.234, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn observer_on_target_line_is_degenerate() {
    let config = BeamConfig::default();
    let observer = DVec3::new(0.0, 200.0, 0.0);
    let result = generate_beam(config.target, observer, 0.3, &config);
    assert_eq!(result, Err(GeometryError::Degenerate { x: 0.0, z: 0.0 }));
}

#[test]
fn layers_ascend_by_spacing() {
    let config = BeamConfig {
        particle_count: 5,
        ..BeamConfig::default()
    };
    let observer = DVec3::new(300.0, 64.0, 0.0);
    let points = generate_beam(config.target, observer, 0.7, &config).unwrap();
    let per_layer = grid_offsets(config.beam_size, config.particle_spacing)
        .unwrap()
        .len();
    assert_eq!(points.len(), per_layer * 5);
    for (layer, chunk) in points.chunks(per_layer).enumerate() {
        let want_y = 64.0 + layer as f64 * config.particle_spacing;
        for p in chunk {
            assert!((p.y - want_y).abs() < EPS, "layer {layer}: y={}", p.y);
        }
    }
}

#[test]
fn grid_order_is_x_then_z() {
    let offsets = grid_offsets(2.0, 1.0).unwrap();
    let pairs: Vec<(f64, f64)> = offsets.iter().map(|o| (o.x, o.y)).collect();
    let mut sorted = pairs.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(pairs, sorted);
}

#[test]
fn zero_layers_or_zero_size_still_behave() {
    let observer = DVec3::new(300.0, 64.0, 0.0);
    let empty = BeamConfig {
        particle_count: 0,
        ..BeamConfig::default()
    };
    assert!(generate_beam(empty.target, observer, 0.0, &empty)
        .unwrap()
        .is_empty());

    // A zero-size beam is a single column of markers.
    let column = BeamConfig {
        beam_size: 0.0,
        particle_count: 4,
        ..BeamConfig::default()
    };
    let points = generate_beam(column.target, observer, 0.9, &column).unwrap();
    assert_eq!(points.len(), 4);
    for p in &points {
        assert!((p.x - 200.0).abs() < EPS && p.z.abs() < EPS, "{p:?}");
    }
}

#[test]
fn generate_into_appends_after_existing_points() {
    let config = scenario_config();
    let mut out = vec![DVec3::splat(-1.0)];
    let added =
        generate_beam_into(config.target, DVec3::new(20.0, 5.0, 0.0), 0.0, &config, &mut out)
            .unwrap();
    assert_eq!(added, 18);
    assert_eq!(out.len(), 19);
    assert_eq!(out[0], DVec3::splat(-1.0));
}

#[test]
fn oversized_beam_fails_without_allocating() {
    let too_large = Err(GeometryError::TooLarge {
        limit: MAX_BEAM_MARKERS,
    });
    assert_eq!(grid_offsets(1e10, 1.0).map(|o| o.len()), too_large);
    assert_eq!(grid_offsets(1000.0, 0.001).map(|o| o.len()), too_large);

    let config = BeamConfig {
        beam_size: 999.0,
        particle_spacing: 1.0,
        particle_count: 2,
        ..BeamConfig::default()
    };
    let observer = DVec3::new(300.0, 64.0, 0.0);
    let mut out = vec![DVec3::ONE];
    let result = generate_beam_into(config.target, observer, 0.0, &config, &mut out);
    assert_eq!(result, too_large);
    assert_eq!(out, vec![DVec3::ONE]);
}
