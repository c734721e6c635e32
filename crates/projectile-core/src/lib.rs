//! Core projectile math utilities
//!
//! Includes:
//! - Scalar type & angle conversions
//! - Points, displacement vectors and launch ("throw") vectors
//! - Gravity and the external parameter bundle shared by every solver
//! - The workspace error type
//! - The compact launch profile string `h0;v0;α°;β°;u;γ°;μ;m;dt`
//!
//! Conventions:
//! - x and y are horizontal, z is height.
//! - α is the vertical (elevation) angle, β the horizontal angle measured from
//!   +y towards +x. Angles are radians everywhere except the profile string.

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uom::si::angle::{degree, radian};
use uom::si::f32::Angle;

/// Scalar type used by every computation in the workspace.
pub type Float = f32;

/// A position in space.
pub type Point = nalgebra::Point3<Float>;

/// A free vector: velocity, acceleration or a position delta.
pub type Displacement = nalgebra::Vector3<Float>;

/// Bound for both aim angles, in radians.
pub const FRAC_PI_2: Float = core::f32::consts::FRAC_PI_2;

/// -------------------------
/// Units & Conversions
/// -------------------------

pub fn deg_to_rad(deg: Float) -> Float {
    Angle::new::<degree>(deg).get::<radian>()
}

pub fn rad_to_deg(rad: Float) -> Float {
    Angle::new::<radian>(rad).get::<degree>()
}

/// -------------------------
/// Throw vectors
/// -------------------------

/// A directed vector between two points.
///
/// Used for the launch velocity and for the wind. Built either from explicit
/// endpoints or from a magnitude and two angles (see [`ThrowVector::from_angles`]).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrowVector {
    pub start: Point,
    pub end: Point,
}

impl ThrowVector {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn zero() -> Self {
        Self::new(Point::origin(), Point::origin())
    }

    /// Spherical constructor anchored at the origin.
    ///
    /// * `alpha` - vertical angle above the horizontal plane [rad]
    /// * `beta` - horizontal angle from +y towards +x [rad]
    pub fn from_angles(magnitude: Float, alpha: Float, beta: Float) -> Self {
        let (sin_a, cos_a) = alpha.sin_cos();
        let (sin_b, cos_b) = beta.sin_cos();
        let end = Point::new(
            magnitude * cos_a * sin_b,
            magnitude * cos_a * cos_b,
            magnitude * sin_a,
        );
        Self::new(Point::origin(), end)
    }

    /// Horizontal vector, e.g. wind of `speed` blowing along `direction` [rad].
    pub fn horizontal(speed: Float, direction: Float) -> Self {
        Self::from_angles(speed, 0.0, direction)
    }

    pub fn to_displacement(&self) -> Displacement {
        self.end - self.start
    }

    pub fn length(&self) -> Float {
        self.to_displacement().norm()
    }

    /// Same start point, end moved so the vector is `k` times as long.
    pub fn scaled(&self, k: Float) -> Self {
        Self::new(self.start, self.start + self.to_displacement() * k)
    }
}

impl fmt::Display for ThrowVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (s, e) = (self.start, self.end);
        write!(f, "({} {} {}), ({} {} {})", s.x, s.y, s.z, e.x, e.y, e.z)
    }
}

/// -------------------------
/// Gravity & external parameters
/// -------------------------

/// Downward gravitational acceleration magnitude [length/time²].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    pub g: Float,
}

impl Gravity {
    pub const STANDARD: Self = Self { g: 9.81 };

    /// Acceleration vector pointing down the height axis.
    pub fn vector(self) -> Displacement {
        Displacement::new(0.0, 0.0, -self.g)
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Everything about a flight except the launch itself.
///
/// Defaults: no wind, no drag, unit mass, `dt = 0.01`, launch and termination
/// heights at 0, standard gravity, at most one million integration steps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalParams {
    pub wind: ThrowVector,
    /// Quadratic drag coefficient μ
    pub mu: Float,
    pub mass: Float,
    /// Integration time step
    pub dt: Float,
    /// Launch height
    pub h0: Float,
    /// Termination ("bounce") plane height
    pub h_end: Float,
    pub gravity: Gravity,
    /// Integrator safety bound
    pub max_steps: usize,
}

impl Default for ExternalParams {
    fn default() -> Self {
        Self {
            wind: ThrowVector::zero(),
            mu: 0.0,
            mass: 1.0,
            dt: 0.01,
            h0: 0.0,
            h_end: 0.0,
            gravity: Gravity::STANDARD,
            max_steps: 1_000_000,
        }
    }
}

impl ExternalParams {
    /// Reject configurations that would make the integrator produce NaN/∞ or never stop.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidTimeStep(self.dt));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidMass(self.mass));
        }
        if !self.mu.is_finite() || self.mu < 0.0 {
            return Err(Error::InvalidDrag(self.mu));
        }
        if !self.gravity.g.is_finite() {
            return Err(Error::InvalidGravity(self.gravity.g));
        }
        if self.max_steps == 0 {
            return Err(Error::ZeroStepLimit);
        }
        ensure_finite("h0", self.h0)?;
        ensure_finite("h_end", self.h_end)?;
        for (name, value) in ["wind.x", "wind.y", "wind.z"]
            .into_iter()
            .zip(self.wind.to_displacement().iter().copied())
        {
            ensure_finite(name, value)?;
        }
        Ok(())
    }
}

/// Shared finiteness check for named scalar inputs.
pub fn ensure_finite(name: &'static str, value: Float) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite { name, value })
    }
}

/// -------------------------
/// Errors
/// -------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(Float),
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(Float),
    #[error("drag coefficient must be non-negative and finite, got {0}")]
    InvalidDrag(Float),
    #[error("gravity must be finite, got {0}")]
    InvalidGravity(Float),
    #[error("integration step limit must be at least 1")]
    ZeroStepLimit,
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: Float },
    #[error("finite-difference step {name} must be non-zero and finite, got {value}")]
    InvalidDifferenceStep { name: &'static str, value: Float },
    #[error("convergence tolerance must be positive, got {0}")]
    InvalidTolerance(Float),
    #[error("optimizer needs at least one iteration")]
    ZeroIterations,
    #[error("grid angle step must be positive and finite, got {0}")]
    InvalidAngleStep(Float),
    #[error("trajectory did not terminate within {0} steps")]
    StepLimitExceeded(usize),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("expected {expected} fields separated by ';', found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// -------------------------
/// Launch profile string
/// -------------------------

const PROFILE_FIELDS: [&str; 9] = [
    "h0",
    "v0",
    "alpha",
    "beta",
    "wind_speed",
    "wind_direction",
    "mu",
    "mass",
    "dt",
];

/// The nine scalar launch inputs, persisted as `h0;v0;α°;β°;u;γ°;μ;m;dt`.
///
/// Angles are stored in degrees, as the operator typed them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchProfile {
    pub h0: Float,
    pub v0: Float,
    pub alpha_deg: Float,
    pub beta_deg: Float,
    pub wind_speed: Float,
    pub wind_direction_deg: Float,
    pub mu: Float,
    pub mass: Float,
    pub dt: Float,
}

impl LaunchProfile {
    pub fn launch(&self) -> ThrowVector {
        ThrowVector::from_angles(self.v0, deg_to_rad(self.alpha_deg), deg_to_rad(self.beta_deg))
    }

    pub fn wind(&self) -> ThrowVector {
        ThrowVector::horizontal(self.wind_speed, deg_to_rad(self.wind_direction_deg))
    }

    /// Environment for this profile; everything not in the string keeps its default.
    pub fn external_params(&self, h_end: Float) -> ExternalParams {
        ExternalParams {
            wind: self.wind(),
            mu: self.mu,
            mass: self.mass,
            dt: self.dt,
            h0: self.h0,
            h_end,
            ..ExternalParams::default()
        }
    }

    /// Copy with the aim angles replaced (radians in, degrees stored).
    pub fn with_angles(self, alpha: Float, beta: Float) -> Self {
        Self {
            alpha_deg: rad_to_deg(alpha),
            beta_deg: rad_to_deg(beta),
            ..self
        }
    }

    fn fields(&self) -> [Float; 9] {
        [
            self.h0,
            self.v0,
            self.alpha_deg,
            self.beta_deg,
            self.wind_speed,
            self.wind_direction_deg,
            self.mu,
            self.mass,
            self.dt,
        ]
    }
}

impl FromStr for LaunchProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: Vec<&str> = s.trim().split(';').map(str::trim).collect();
        if raw.len() != PROFILE_FIELDS.len() {
            return Err(ProfileError::FieldCount {
                expected: PROFILE_FIELDS.len(),
                found: raw.len(),
            });
        }

        let mut v = [0.0; 9];
        for ((slot, text), field) in v.iter_mut().zip(&raw).zip(PROFILE_FIELDS) {
            *slot = text.parse().map_err(|source| ProfileError::InvalidNumber {
                field,
                value: (*text).to_string(),
                source,
            })?;
        }

        Ok(Self {
            h0: v[0],
            v0: v[1],
            alpha_deg: v[2],
            beta_deg: v[3],
            wind_speed: v[4],
            wind_direction_deg: v[5],
            mu: v[6],
            mass: v[7],
            dt: v[8],
        })
    }
}

impl fmt::Display for LaunchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = ryu::Buffer::new();
        for (i, value) in self.fields().into_iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            f.write_str(buf.format(value))?;
        }
        Ok(())
    }
}

/* -------------------------------- tests -------------------------------- */
