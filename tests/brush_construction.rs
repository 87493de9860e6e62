// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brush construction and incremental update tests

use anyhow::Result;
use approx::assert_relative_eq;
use brushwork::geometry::{BoundingBox, DropReason, Plane};
use brushwork::validation::{check_round_trip, check_topology, same_solid};
use brushwork::{Brush, BrushSettings, PlaneSet};
use nalgebra::{Point3, Vector3};

fn unit_cube() -> Result<Brush> {
    Ok(Brush::cuboid(&BoundingBox::cube(1.0), BrushSettings::default())?)
}

fn assert_valid(brush: &Brush) {
    let report = check_topology(brush.geometry(), brush.tolerance());
    assert!(report.is_valid(), "topology problems: {:?}", report.problems);
    assert_eq!(brush.geometry().euler_characteristic(), 2);
}

#[test]
fn test_cube_topology() -> Result<()> {
    let brush = unit_cube()?;
    assert_valid(&brush);
    assert_eq!(brush.vertices().len(), 8);
    assert_eq!(brush.edges().len(), 12);
    assert_eq!(brush.faces().len(), 6);
    assert_relative_eq!(brush.volume(), 8.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_axis_cut_replaces_face() -> Result<()> {
    let mut brush = unit_cube()?;
    brush.add_plane(Plane::axis(0, true, 0.5))?;
    assert_valid(&brush);

    // The cut supersedes x <= 1, which no longer touches the solid
    assert_eq!(brush.planes().len(), 7);
    assert_eq!(brush.faces().len(), 6);
    assert_eq!(brush.vertices().len(), 8);
    assert!(brush.build_report().is_dropped(0));
    assert!(brush.vertices().iter().all(|v| v.position.x <= 0.5 + 1e-9));
    assert_eq!(
        brush
            .vertices()
            .iter()
            .filter(|v| (v.position.x - 0.5).abs() < 1e-9)
            .count(),
        4
    );
    assert_relative_eq!(brush.volume(), 6.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_corner_cut_adds_face() -> Result<()> {
    let mut brush = unit_cube()?;
    brush.add_plane(Plane::new(Vector3::new(1.0, 1.0, 1.0), 1.5)?)?;
    assert_valid(&brush);

    assert_eq!(brush.faces().len(), 7);
    assert_eq!(brush.vertices().len(), 10);
    assert_eq!(brush.edges().len(), 15);
    assert!(!brush.contains_point(&Point3::new(1.0, 1.0, 1.0)));
    assert!(brush.contains_point(&Point3::new(1.0, 1.0, -0.5)));
    Ok(())
}

#[test]
fn test_every_face_loop_is_planar_and_outward() -> Result<()> {
    let mut brush = unit_cube()?;
    brush.add_plane(Plane::new(Vector3::new(1.0, 2.0, -0.5), 1.2)?)?;
    brush.add_plane(Plane::new(Vector3::new(-1.0, 0.3, 1.0), 0.9)?)?;

    for (i, face) in brush.faces().iter().enumerate() {
        let loop_normal = brush.geometry().face_loop_normal(i).unwrap();
        assert!(loop_normal.dot(face.plane.normal()) > 1.0 - 1e-9);
        for p in brush.geometry().face_positions(i) {
            let d = face.plane.normal().dot(&p.coords) - face.plane.offset();
            assert!(d.abs() <= 1e-6);
        }
    }
    Ok(())
}

#[test]
fn test_round_trip_from_face_planes() -> Result<()> {
    let mut brush = unit_cube()?;
    brush.add_plane(Plane::new(Vector3::new(1.0, 1.0, 0.0), 1.0)?)?;
    brush.add_plane(Plane::axis(2, true, 10.0))?;

    let report = check_round_trip(&brush)?;
    assert!(report.matches(brush.tolerance()), "{:?}", report);
    Ok(())
}

#[test]
fn test_plane_order_does_not_matter() -> Result<()> {
    let mut planes = PlaneSet::cuboid(&BoundingBox::cube(2.0)).planes().to_vec();
    planes.push(Plane::new(Vector3::new(1.0, 1.0, 1.0), 3.0)?);
    planes.push(Plane::new(Vector3::new(-1.0, 1.0, 0.0), 2.0)?);

    let forward = Brush::new(planes.clone(), BrushSettings::default())?;
    planes.reverse();
    let backward = Brush::new(planes, BrushSettings::default())?;
    assert!(same_solid(&forward, &backward));
    Ok(())
}

#[test]
fn test_removing_redundant_plane_keeps_topology() -> Result<()> {
    let mut brush = unit_cube()?;
    brush.add_plane(Plane::axis(1, false, -5.0))?;
    let before = brush.clone();
    assert_eq!(
        brush.build_report().dropped[0].reason,
        DropReason::NoVertices
    );

    brush.remove_plane(6)?;
    assert!(same_solid(&before, &brush));
    assert_eq!(brush.build_report().dropped_count(), 0);
    Ok(())
}

#[test]
fn test_undo_by_snapshot() -> Result<()> {
    let mut brush = unit_cube()?;
    let original = brush.snapshot();

    let after_cut = brush.add_plane(Plane::axis(2, true, 0.0))?;
    let after_move = brush.offset_plane(0, 2.0)?;
    assert_relative_eq!(brush.logical_bounds().max.x, 3.0, epsilon = 1e-9);
    assert_relative_eq!(brush.logical_bounds().max.z, 0.0, epsilon = 1e-9);

    brush.restore(after_move)?;
    assert_relative_eq!(brush.logical_bounds().max.x, 1.0, epsilon = 1e-9);
    brush.restore(after_cut)?;
    assert_eq!(brush.planes(), &original);
    assert_relative_eq!(brush.logical_bounds().max.z, 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_invalid_edit_is_rejected_and_brush_kept() -> Result<()> {
    let mut brush = unit_cube()?;
    let before = brush.clone();

    // Opposite of an existing face: the solid would collapse
    let err = brush.add_plane(Plane::axis(0, false, 1.0)).unwrap_err();
    assert!(err.is_invalid_plane_set());
    assert!(same_solid(&before, &brush));
    assert_eq!(brush.planes(), before.planes());
    Ok(())
}

#[test]
fn test_unbounded_planes_are_rejected() {
    let planes = vec![
        Plane::axis(0, true, 1.0),
        Plane::axis(0, false, -1.0),
        Plane::axis(1, true, 1.0),
        Plane::axis(1, false, -1.0),
        Plane::axis(2, true, 1.0),
    ];
    let err = Brush::new(planes, BrushSettings::default()).unwrap_err();
    assert!(err.is_invalid_plane_set());
}
