//! projectile-aim
//!
//! Choosing launch angles for a fixed launch speed.
//! - [`optimize`]: gradient descent on the target error. Partial derivatives
//!   come from forward differences, steps are fixed multiples of the gradient,
//!   both angles are clamped to [-π/2, π/2] after every update, and the search
//!   stops as soon as the error drops below the tolerance.
//! - [`AngleGrid`]: the same objective sampled over a rectangular (α, β) grid,
//!   for plotting the response surface.
//!
//! The objective is [`projectile_pointmass::target_error`], so every evaluation
//! is a full RK4 flight with the caller's [`ExternalParams`].

use std::ops::ControlFlow;

use projectile_core::{ensure_finite, Error, ExternalParams, Float, Point, Result, FRAC_PI_2};
use projectile_pointmass::target_error;
use tracing::{debug, trace, warn};

/// -------------------------
/// Gradient descent
/// -------------------------

/// Optimizer settings.
///
/// Defaults: `da = db = 0.001`, `step_a = step_b = 0.01`, 2000 iterations,
/// stop once the landing point is within 0.1 of the target.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GradParams {
    /// Finite-difference step for α [rad]
    pub da: Float,
    /// Finite-difference step for β [rad]
    pub db: Float,
    /// Descent step size for α
    pub step_a: Float,
    /// Descent step size for β
    pub step_b: Float,
    pub max_iter: usize,
    /// Early-stop threshold on the target error [distance]
    pub tolerance: Float,
}

impl Default for GradParams {
    fn default() -> Self {
        Self {
            da: 0.001,
            db: 0.001,
            step_a: 0.01,
            step_b: 0.01,
            max_iter: 2000,
            tolerance: 0.1,
        }
    }
}

impl GradParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("da", self.da), ("db", self.db)] {
            if value == 0.0 || !value.is_finite() {
                return Err(Error::InvalidDifferenceStep { name, value });
            }
        }
        ensure_finite("step_a", self.step_a)?;
        ensure_finite("step_b", self.step_b)?;
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidTolerance(self.tolerance));
        }
        if self.max_iter == 0 {
            return Err(Error::ZeroIterations);
        }
        Ok(())
    }
}

/// Starting point of the search. `v0` stays fixed, the angles are refined.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AimGuess {
    pub v0: Float,
    pub alpha: Float,
    pub beta: Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Error dropped below the tolerance.
    Converged,
    /// `max_iter` used up; the best candidate is a near miss the caller has to judge.
    Exhausted,
    /// The progress callback asked to stop.
    Cancelled,
}

/// Best angles found and their target error.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradResult {
    pub alpha: Float,
    pub beta: Float,
    pub func_value: Float,
    pub iterations: usize,
    pub outcome: Outcome,
}

impl GradResult {
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

/// Minimize the horizontal miss distance to `target` over (α, β).
///
/// `progress` is called once per iteration with `floor(100 * i / max_iter)`;
/// returning [`ControlFlow::Break`] ends the search and yields the best
/// candidate so far. Invalid settings are rejected before the first flight.
pub fn optimize<F>(
    grad: &GradParams,
    guess: &AimGuess,
    target: &Point,
    params: &ExternalParams,
    mut progress: F,
) -> Result<GradResult>
where
    F: FnMut(u8) -> ControlFlow<()>,
{
    grad.validate()?;
    params.validate()?;
    ensure_finite("v0", guess.v0)?;
    ensure_finite("alpha", guess.alpha)?;
    ensure_finite("beta", guess.beta)?;
    ensure_finite("target.x", target.x)?;
    ensure_finite("target.y", target.y)?;

    let error = |alpha: Float, beta: Float| target_error(guess.v0, alpha, beta, target, params);

    let mut alpha = clamp_angle(guess.alpha);
    let mut beta = clamp_angle(guess.beta);
    let mut best = GradResult {
        alpha,
        beta,
        func_value: Float::INFINITY,
        iterations: 0,
        outcome: Outcome::Exhausted,
    };

    for i in 0..grad.max_iter {
        let i0 = error(alpha, beta)?;
        best.iterations = i + 1;
        if i0 < best.func_value {
            best.alpha = alpha;
            best.beta = beta;
            best.func_value = i0;
        }

        let percent = percent_done(i, grad.max_iter);
        if i0 < grad.tolerance {
            // Finished either way, so a Break here changes nothing.
            let _ = progress(percent);
            debug!(iterations = i + 1, alpha, beta, error = i0, "aim converged");
            return Ok(GradResult { outcome: Outcome::Converged, ..best });
        }

        let d_alpha = (error(alpha + grad.da, beta)? - i0) / grad.da;
        let d_beta = (error(alpha, beta + grad.db)? - i0) / grad.db;
        alpha = clamp_angle(alpha - grad.step_a * d_alpha);
        beta = clamp_angle(beta - grad.step_b * d_beta);
        trace!(iteration = i, error = i0, d_alpha, d_beta, alpha, beta, "descent step");

        if progress(percent).is_break() {
            debug!(iterations = i + 1, error = best.func_value, "aim cancelled");
            return Ok(GradResult { outcome: Outcome::Cancelled, ..best });
        }
    }

    warn!(
        max_iter = grad.max_iter,
        error = best.func_value,
        tolerance = grad.tolerance,
        "aim did not converge, returning best candidate"
    );
    Ok(best)
}

fn clamp_angle(angle: Float) -> Float {
    angle.clamp(-FRAC_PI_2, FRAC_PI_2)
}

fn percent_done(i: usize, max_iter: usize) -> u8 {
    u8::try_from(i.saturating_mul(100) / max_iter).unwrap_or(100)
}

/// -------------------------
/// Response surface
/// -------------------------

/// One evaluation of the objective.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSample {
    pub alpha: Float,
    pub error: Float,
    pub beta: Float,
}

/// Plot layout: α on x, error on the vertical axis, β on z.
impl From<GridSample> for Point {
    fn from(s: GridSample) -> Self {
        Point::new(s.alpha, s.error, s.beta)
    }
}

/// Half-open angle ranges `[min, max)` walked with a uniform step.
///
/// Each axis visits `min + k * step` while the value is below `max`, so a step
/// that does not divide the range still gets its last partial row/column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleGrid {
    alpha: (Float, Float),
    beta: (Float, Float),
    step: Float,
}

impl AngleGrid {
    pub fn new(
        alpha_min: Float,
        alpha_max: Float,
        beta_min: Float,
        beta_max: Float,
        step: Float,
    ) -> Result<Self> {
        for (name, value) in [
            ("alpha_min", alpha_min),
            ("alpha_max", alpha_max),
            ("beta_min", beta_min),
            ("beta_max", beta_max),
        ] {
            ensure_finite(name, value)?;
        }
        // The step must actually move both axes.
        if !step.is_finite() || step <= 0.0 || alpha_min + step == alpha_min || beta_min + step == beta_min {
            return Err(Error::InvalidAngleStep(step));
        }
        Ok(Self {
            alpha: (alpha_min, alpha_max),
            beta: (beta_min, beta_max),
            step,
        })
    }

    pub fn alphas(&self) -> impl Iterator<Item = Float> {
        axis(self.alpha, self.step)
    }

    pub fn betas(&self) -> impl Iterator<Item = Float> {
        axis(self.beta, self.step)
    }

    /// (rows, columns) = (α values, β values).
    pub fn shape(&self) -> (usize, usize) {
        (self.alphas().count(), self.betas().count())
    }

    /// Evaluate the target error at every grid node, α outer, β inner.
    pub fn sample(&self, v0: Float, target: &Point, params: &ExternalParams) -> Result<Vec<GridSample>> {
        params.validate()?;
        let (rows, cols) = self.shape();
        let mut out = Vec::with_capacity(rows * cols);
        for alpha in self.alphas() {
            for beta in self.betas() {
                let error = target_error(v0, alpha, beta, target, params)?;
                out.push(GridSample { alpha, error, beta });
            }
        }
        debug!(rows, cols, "response surface sampled");
        Ok(out)
    }
}

#[allow(clippy::cast_precision_loss)]
fn axis((min, max): (Float, Float), step: Float) -> impl Iterator<Item = Float> {
    (0_u32..)
        .map(move |k| min + k as Float * step)
        .take_while(move |&a| a < max)
}

/* -------------------------------- tests -------------------------------- */
