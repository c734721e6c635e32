// End-to-end aiming scenarios against the real flight model.

use std::ops::ControlFlow;

use approx::assert_relative_eq;
use projectile_aim::{optimize, AimGuess, AngleGrid, GradParams, Outcome};
use projectile_core::{ExternalParams, Float, Point, FRAC_PI_2};
use projectile_pointmass::target_error;

const FRAC_PI_8: Float = core::f32::consts::FRAC_PI_8;

fn keep_going(_: u8) -> ControlFlow<()> {
    ControlFlow::Continue(())
}

#[test]
fn flat_shot_is_raised_onto_a_target_downrange() {
    let params = ExternalParams::default();
    let target = Point::new(0.0, 5.0, 0.0);
    let guess = AimGuess { v0: 10.0, alpha: 0.2, beta: 0.0 };

    let before = target_error(guess.v0, guess.alpha, guess.beta, &target, &params).unwrap();
    let result = optimize(&GradParams::default(), &guess, &target, &params, keep_going).unwrap();

    assert_eq!(result.outcome, Outcome::Converged);
    assert!(result.func_value < 0.1, "error = {}", result.func_value);
    assert!(result.func_value < before);
    assert!(result.iterations < 100);
    assert!(result.alpha > guess.alpha);

    // The reported error is the error of the reported angles.
    let check = target_error(guess.v0, result.alpha, result.beta, &target, &params).unwrap();
    assert_eq!(check, result.func_value);
}

#[test]
fn huge_steps_stay_inside_the_angle_bounds() {
    let params = ExternalParams::default();
    let target = Point::new(0.0, 5.0, 0.0);
    let grad = GradParams { step_a: 50.0, step_b: 50.0, max_iter: 30, ..GradParams::default() };
    let guess = AimGuess { v0: 10.0, alpha: 3.0, beta: -4.0 };

    let mut seen = 0;
    let result = optimize(&grad, &guess, &target, &params, |_| {
        seen += 1;
        ControlFlow::Continue(())
    })
    .unwrap();

    assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&result.alpha));
    assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&result.beta));
    assert!(result.func_value.is_finite());
    assert_eq!(seen, result.iterations);
}

#[test]
fn unreachable_target_reports_the_nearest_miss() {
    let params = ExternalParams::default();
    let target = Point::new(0.0, 100.0, 0.0);
    let grad = GradParams { max_iter: 50, ..GradParams::default() };
    let guess = AimGuess { v0: 10.0, alpha: 0.2, beta: 0.0 };

    let result = optimize(&grad, &guess, &target, &params, keep_going).unwrap();
    let vacuum_range = 10.0 * 10.0 / 9.81;

    assert_eq!(result.outcome, Outcome::Exhausted);
    assert!(result.func_value >= 100.0 - vacuum_range - 0.5);
    assert!(result.func_value < target_error(10.0, 0.2, 0.0, &target, &params).unwrap());
}

#[test]
fn grid_walks_alpha_outer_beta_inner() {
    let params = ExternalParams::default();
    let target = Point::new(0.0, 5.0, 0.0);
    let grid = AngleGrid::new(0.0, core::f32::consts::FRAC_PI_4, 0.0, FRAC_PI_2, FRAC_PI_8).unwrap();

    assert_eq!(grid.shape(), (2, 4));
    let samples = grid.sample(10.0, &target, &params).unwrap();
    assert_eq!(samples.len(), 8);

    let expected_alpha = [0.0, FRAC_PI_8];
    let expected_beta = [0.0, FRAC_PI_8, 2.0 * FRAC_PI_8, 3.0 * FRAC_PI_8];
    for (i, s) in samples.iter().enumerate() {
        assert_relative_eq!(s.alpha, expected_alpha[i / 4], epsilon = 1e-6);
        assert_relative_eq!(s.beta, expected_beta[i % 4], epsilon = 1e-6);
        assert_eq!(s.error, target_error(10.0, s.alpha, s.beta, &target, &params).unwrap());

        let p = Point::from(*s);
        assert_eq!((p.x, p.y, p.z), (s.alpha, s.error, s.beta));
    }
}

#[test]
fn grid_propagates_flight_configuration_errors() {
    let bad = ExternalParams { dt: 0.0, ..ExternalParams::default() };
    let grid = AngleGrid::new(0.0, 0.5, 0.0, 0.5, 0.25).unwrap();
    assert!(grid.sample(10.0, &Point::origin(), &bad).is_err());
}
