//! projectile-pointmass
//!
//! Point-mass trajectory solver with RK4 integration.
//! - Acceleration comes from an [`AccelerationModel`]; flights built from
//!   [`ExternalParams`] use [`QuadraticDrag`] (gravity + drag against the wind).
//! - Position and velocity are advanced jointly; the position derivative at each
//!   stage is that stage's velocity estimate.
//! - [`simulate`] records every step, [`target_error`] only keeps the landing
//!   point. Both run the same flight loop, so a displayed trajectory and an
//!   optimized one land in exactly the same place.
//!
//! Termination (bounce plane at `h_end`), checked after every step:
//!   above |= z > h_end
//!   keep flying while z > 0 && (z > h_end || !above)
//!
//! A launch below `h_end` therefore has to climb through the plane once before
//! a descent through it counts as landing; if it never gets there it lands at z <= 0.

use projectile_core::{Displacement, Error, ExternalParams, Float, Point, Result, ThrowVector};
use projectile_drag::{AccelerationModel, QuadraticDrag};
use tracing::{debug, trace, warn};

/// Sampled trajectory of one flight, one point per integration step.
///
/// The launch point itself is not part of the sequence, so it is never empty.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationResult {
    points: Vec<Point>,
    max_height: Float,
    final_velocity: Displacement,
}

/// Scalars shown next to a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlightSummary {
    pub landing: Point,
    pub flight_time: Float,     // steps * dt
    pub distance: Float,        // horizontal, from the launch site
    pub max_height: Float,
    pub impact_speed: Float,
    pub impact_angle: Float,    // rad below the horizontal
}

impl SimulationResult {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn max_height(&self) -> Float {
        self.max_height
    }

    pub fn final_velocity(&self) -> Displacement {
        self.final_velocity
    }

    pub fn landing_point(&self) -> Point {
        self.points.last().copied().unwrap_or_else(Point::origin)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn flight_time(&self, dt: Float) -> Float {
        self.points.len() as Float * dt
    }

    /// asin(|v_z| / |v|) of the final velocity.
    pub fn impact_angle(&self) -> Float {
        let speed = self.final_velocity.norm();
        if speed > 0.0 {
            (self.final_velocity.z.abs() / speed).asin()
        } else {
            0.0
        }
    }

    pub fn summary(&self, dt: Float) -> FlightSummary {
        let landing = self.landing_point();
        FlightSummary {
            landing,
            flight_time: self.flight_time(dt),
            distance: horizontal_distance(&landing, &Point::origin()),
            max_height: self.max_height,
            impact_speed: self.final_velocity.norm(),
            impact_angle: self.impact_angle(),
        }
    }
}

/// Integrate one flight from `(0, 0, h0)` with the launch velocity `launch`.
pub fn simulate(launch: &ThrowVector, params: &ExternalParams) -> Result<SimulationResult> {
    params.validate()?;
    let model = QuadraticDrag::from(params);

    let mut points = Vec::new();
    let mut max_height = Float::NEG_INFINITY;
    let end = fly(&model, launch, params, |s| {
        points.push(s.pos);
        max_height = max_height.max(s.pos.z);
    })?;

    debug!(steps = points.len(), max_height, "trajectory simulated");
    Ok(SimulationResult {
        points,
        max_height,
        final_velocity: end.vel,
    })
}

/// Final position of a flight, without recording the path.
pub fn landing_point(launch: &ThrowVector, params: &ExternalParams) -> Result<Point> {
    params.validate()?;
    let model = QuadraticDrag::from(params);
    fly(&model, launch, params, |_| {}).map(|s| s.pos)
}

/// Horizontal (x–y) distance between where a launch of speed `v0` at angles
/// (`alpha`, `beta`) lands and `target`. This is the objective the aim search minimizes.
pub fn target_error(
    v0: Float,
    alpha: Float,
    beta: Float,
    target: &Point,
    params: &ExternalParams,
) -> Result<Float> {
    projectile_core::ensure_finite("v0", v0)?;
    projectile_core::ensure_finite("alpha", alpha)?;
    projectile_core::ensure_finite("beta", beta)?;
    let end = landing_point(&ThrowVector::from_angles(v0, alpha, beta), params)?;
    Ok(horizontal_distance(&end, target))
}

pub fn horizontal_distance(a: &Point, b: &Point) -> Float {
    (a.x - b.x).hypot(a.y - b.y)
}

/* ------------------------------- internals ------------------------------- */

#[derive(Clone, Copy, Debug)]
struct State {
    pos: Point,
    vel: Displacement,
}

/// Bounce-plane termination rule.
#[derive(Clone, Copy, Debug)]
struct Landing {
    h_end: Float,
    above_plane: bool,
}

impl Landing {
    fn new(h_end: Float) -> Self {
        Self { h_end, above_plane: false }
    }

    /// Feed the height reached after a step; `false` once the flight is over.
    fn keep_flying(&mut self, z: Float) -> bool {
        if z > self.h_end {
            self.above_plane = true;
        }
        z > 0.0 && (z > self.h_end || !self.above_plane)
    }
}

// Step until the landing rule fires. `on_step` sees every accepted state.
fn fly<M, F>(model: &M, launch: &ThrowVector, params: &ExternalParams, mut on_step: F) -> Result<State>
where
    M: AccelerationModel,
    F: FnMut(&State),
{
    let mut s = State {
        pos: Point::new(0.0, 0.0, params.h0),
        vel: launch.to_displacement(),
    };
    let mut landing = Landing::new(params.h_end);

    for step in 1..=params.max_steps {
        s = rk4_step(model, s, params.dt);
        on_step(&s);
        if !landing.keep_flying(s.pos.z) {
            trace!(steps = step, x = s.pos.x, y = s.pos.y, z = s.pos.z, "landed");
            return Ok(s);
        }
    }

    warn!(max_steps = params.max_steps, "trajectory never reached its landing plane");
    Err(Error::StepLimitExceeded(params.max_steps))
}

fn rk4_step<M: AccelerationModel>(model: &M, s: State, dt: Float) -> State {
    let half = 0.5 * dt;

    let k1 = model.acceleration(&s.vel);
    let v2 = s.vel + k1 * half;
    let k2 = model.acceleration(&v2);
    let v3 = s.vel + k2 * half;
    let k3 = model.acceleration(&v3);
    let v4 = s.vel + k3 * dt;
    let k4 = model.acceleration(&v4);

    let w = dt / 6.0;
    State {
        pos: s.pos + (s.vel + v2 * 2.0 + v3 * 2.0 + v4) * w,
        vel: s.vel + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * w,
    }
}

/* ----------------------------------- tests ---------------------------------- */
