//! projectile-drag
//!
//! Acceleration of a point mass under gravity and quadratic air drag. Drag acts
//! against the velocity **relative to the wind**:
//!
//!   a = g + v_rel * (-μ * |v_rel| / m),   v_rel = v - w
//!
//! The law is available as the plain function [`acceleration`] and as
//! [`QuadraticDrag`], the [`AccelerationModel`] the integrators are generic over.
//! Gravity is always passed in, never read from a global.

use projectile_core::{Displacement, ExternalParams, Float, Gravity};

/// Velocity -> acceleration. Implemented by every force law an integrator can step.
pub trait AccelerationModel {
    fn acceleration(&self, velocity: &Displacement) -> Displacement;
}

/// Gravity plus quadratic drag against the wind-relative velocity.
#[inline]
pub fn acceleration(
    velocity: &Displacement,
    wind: &Displacement,
    mu: Float,
    mass: Float,
    gravity: Gravity,
) -> Displacement {
    let relative = velocity - wind;
    gravity.vector() + relative * (-mu * relative.norm() / mass)
}

/// The drag law with its parameters frozen for one flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticDrag {
    pub wind: Displacement,
    pub mu: Float,
    pub mass: Float,
    pub gravity: Gravity,
}

impl QuadraticDrag {
    pub fn new(wind: Displacement, mu: Float, mass: Float, gravity: Gravity) -> Self {
        Self { wind, mu, mass, gravity }
    }
}

impl From<&ExternalParams> for QuadraticDrag {
    fn from(p: &ExternalParams) -> Self {
        Self::new(p.wind.to_displacement(), p.mu, p.mass, p.gravity)
    }
}

impl AccelerationModel for QuadraticDrag {
    #[inline]
    fn acceleration(&self, velocity: &Displacement) -> Displacement {
        acceleration(velocity, &self.wind, self.mu, self.mass, self.gravity)
    }
}

/* -------------------------------- tests -------------------------------- */
