// Physical properties of the integrator, checked through the public API only.

use approx::assert_relative_eq;
use projectile_core::{ExternalParams, Float, Point, ThrowVector};
use projectile_pointmass::{horizontal_distance, simulate, target_error};

const G: Float = 9.81;

fn still_air(dt: Float) -> ExternalParams {
    ExternalParams { dt, ..ExternalParams::default() }
}

#[test]
fn zero_drag_matches_parabolic_range() {
    let params = still_air(0.001);
    let v0: Float = 30.0;

    for (alpha, beta) in [(0.3_f32, 0.2_f32), (0.7, 1.0), (1.2, 0.5), (0.785, 0.0)] {
        let result = simulate(&ThrowVector::from_angles(v0, alpha, beta), &params).unwrap();
        let landing = result.landing_point();
        let range = v0 * v0 * (2.0 * alpha).sin() / G;

        assert_relative_eq!(horizontal_distance(&landing, &Point::origin()), range, max_relative = 0.01);
        assert_relative_eq!(landing.y, range * beta.cos(), max_relative = 0.01);
        assert_relative_eq!(landing.x, range * beta.sin(), max_relative = 0.01);
    }
}

#[test]
fn recorded_peak_is_the_highest_point() {
    let drag = ExternalParams {
        mu: 0.05,
        wind: ThrowVector::horizontal(4.0, 1.0),
        ..ExternalParams::default()
    };
    let from_cliff = ExternalParams { h0: 10.0, ..ExternalParams::default() };

    let cases = [
        (ThrowVector::from_angles(30.0, 0.8, 0.0), drag),
        (ThrowVector::from_angles(8.0, 0.0, 0.0), from_cliff),
        (ThrowVector::from_angles(8.0, -0.4, 2.0), from_cliff),
    ];
    for (launch, params) in cases {
        let result = simulate(&launch, &params).unwrap();
        let highest = result.points().iter().map(|p| p.z).fold(Float::NEG_INFINITY, Float::max);
        assert_eq!(result.max_height(), highest);
    }
}

#[test]
fn climbs_through_termination_plane_before_landing_on_it() {
    let params = ExternalParams { h_end: 2.0, ..ExternalParams::default() };
    let result = simulate(&ThrowVector::from_angles(10.0, 1.0, 0.3), &params).unwrap();
    let points = result.points();

    assert!(result.max_height() > 2.0);
    let last = points[points.len() - 1];
    let before = points[points.len() - 2];
    assert!(last.z <= 2.0 && last.z > 0.0, "landed at z = {}", last.z);
    assert!(before.z > 2.0);
    // No earlier descent through the plane was treated as landing.
    let first_above = points.iter().position(|p| p.z > 2.0).unwrap();
    assert!(points[first_above..points.len() - 1].iter().all(|p| p.z > 2.0));
}

#[test]
fn never_reaching_the_plane_lands_on_the_ground() {
    let params = ExternalParams { h_end: 2.0, ..ExternalParams::default() };
    let result = simulate(&ThrowVector::from_angles(5.0, 0.5, 0.0), &params).unwrap();

    assert!(result.max_height() < 2.0);
    assert!(result.landing_point().z <= 0.0);
    let points = result.points();
    assert!(points[..points.len() - 1].iter().all(|p| p.z > 0.0));
}

#[test]
fn starting_above_the_plane_lands_on_it() {
    let params = ExternalParams { h0: 5.0, h_end: 2.0, ..ExternalParams::default() };
    let result = simulate(&ThrowVector::from_angles(8.0, 0.0, 0.0), &params).unwrap();
    let landing = result.landing_point();

    assert!(landing.z <= 2.0 && landing.z > 1.5, "landed at z = {}", landing.z);
}

#[test]
fn identical_inputs_give_identical_results() {
    let params = ExternalParams {
        mu: 0.02,
        wind: ThrowVector::horizontal(5.0, 0.4),
        h0: 1.0,
        ..ExternalParams::default()
    };
    let launch = ThrowVector::from_angles(20.0, 0.6, 0.1);

    assert_eq!(simulate(&launch, &params).unwrap(), simulate(&launch, &params).unwrap());
}

#[test]
fn target_error_agrees_with_displayed_trajectory() {
    let params = ExternalParams {
        mu: 0.03,
        wind: ThrowVector::horizontal(3.0, 1.3),
        h_end: 0.5,
        ..ExternalParams::default()
    };
    let (v0, alpha, beta) = (25.0, 0.9, -0.3);
    let target = Point::new(4.0, 20.0, 0.5);

    let shown = simulate(&ThrowVector::from_angles(v0, alpha, beta), &params).unwrap();
    let error = target_error(v0, alpha, beta, &target, &params).unwrap();
    assert_eq!(error, horizontal_distance(&shown.landing_point(), &target));
}

#[test]
fn crosswind_drifts_the_landing_point() {
    let calm = ExternalParams { mu: 0.02, ..ExternalParams::default() };
    let windy = ExternalParams {
        wind: ThrowVector::horizontal(5.0, projectile_core::FRAC_PI_2),
        ..calm
    };
    let launch = ThrowVector::from_angles(20.0, 0.6, 0.0);

    let drift_calm = simulate(&launch, &calm).unwrap().landing_point().x;
    let drift_windy = simulate(&launch, &windy).unwrap().landing_point().x;
    assert!(drift_calm.abs() < 1e-6);
    assert!(drift_windy > 1.0, "drift = {drift_windy}");

    // Drag shortens the shot compared to vacuum.
    let vacuum = simulate(&launch, &ExternalParams::default()).unwrap().landing_point().y;
    let dragged = simulate(&launch, &calm).unwrap().landing_point().y;
    assert!(dragged < vacuum);
}
