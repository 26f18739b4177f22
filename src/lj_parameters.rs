// -- lennard jones potential and force
use crate::constants::{BOLTZMANNS_CONSTANT, POTENTIAL_SHIFT_AT_CUTOFF};
use crate::error::{Result, SimulationError};

/// 2^(1/6), the ratio between the potential-well minimum and sigma.
pub const MINIMUM_FORCE_DISTANCE_RATIO: f64 = 1.122462048309373;

/// Lennard-Jones potential for one (sigma, epsilon) pair, in SI-flavoured units:
/// sigma is a distance (picometers in practice), epsilon is in Kelvin and is
/// multiplied by the Boltzmann constant before use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LjPotentialCalculator {
    sigma: f64,
    epsilon: f64,
    epsilon_for_calcs: f64,
}

impl LjPotentialCalculator {
    pub fn new(sigma: f64, epsilon: f64) -> Result<Self> {
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(SimulationError::InvalidSigma { sigma });
        }
        if epsilon < 0.0 || !epsilon.is_finite() {
            return Err(SimulationError::InvalidEpsilon { epsilon });
        }
        Ok(LjPotentialCalculator {
            sigma,
            epsilon,
            epsilon_for_calcs: epsilon * BOLTZMANNS_CONSTANT,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_sigma(&mut self, sigma: f64) -> Result<()> {
        *self = LjPotentialCalculator::new(sigma, self.epsilon)?;
        Ok(())
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        *self = LjPotentialCalculator::new(self.sigma, epsilon)?;
        Ok(())
    }

    pub fn potential(&self, distance: f64) -> f64 {
        let distance_ratio = self.sigma / distance;
        4.0 * self.epsilon_for_calcs * (distance_ratio.powi(12) - distance_ratio.powi(6))
    }

    pub fn repulsive_force(&self, distance: f64) -> f64 {
        48.0 * self.epsilon_for_calcs * self.sigma.powi(12) / distance.powi(13)
    }

    pub fn attractive_force(&self, distance: f64) -> f64 {
        24.0 * self.epsilon_for_calcs * self.sigma.powi(6) / distance.powi(7)
    }

    /// Distance at the bottom of the potential well.
    pub fn minimum_force_distance(&self) -> f64 {
        self.sigma * MINIMUM_FORCE_DISTANCE_RATIO
    }

    /// Potential measured from the bottom of the well, so it is zero at the
    /// minimum and positive everywhere else.
    pub fn potential_energy(&self, distance: f64) -> f64 {
        self.potential(distance) - self.potential(self.minimum_force_distance())
    }
}

/*
Reduced-unit kernels used by the integrators. Distances are in units of sigma,
so the potential collapses to 4 * eps * (r^-12 - r^-6). Both kernels take the
squared distance, which the callers have already clamped away from zero.
 */

/// Scalar `s` such that the force on molecule i from j is `s * (r_i - r_j)`.
#[inline]
pub fn lj_force_scalar(distance_sqrd: f64, epsilon: f64) -> f64 {
    let r2inv = 1.0 / distance_sqrd;
    let r6inv = r2inv * r2inv * r2inv;
    48.0 * epsilon * r2inv * r6inv * (r6inv - 0.5)
}

/// Same as [`lj_force_scalar`] with the repulsive term scaled, used to stiffen
/// the oxygen-oxygen contact of frozen water.
#[inline]
pub fn scaled_repulsion_force_scalar(distance_sqrd: f64, repulsive_scaling: f64) -> f64 {
    let r2inv = 1.0 / distance_sqrd;
    let r6inv = r2inv * r2inv * r2inv;
    48.0 * r2inv * r6inv * (r6inv * repulsive_scaling - 0.5)
}

/// Pair potential shifted so that it vanishes at the interaction cutoff.
#[inline]
pub fn lj_pair_potential(distance_sqrd: f64, epsilon: f64) -> f64 {
    let r2inv = 1.0 / distance_sqrd;
    let r6inv = r2inv * r2inv * r2inv;
    epsilon * (4.0 * r6inv * (r6inv - 1.0) + POTENTIAL_SHIFT_AT_CUTOFF)
}

/// Force pushing a molecule away from a wall it is `distance` away from.
#[inline]
pub fn wall_force(distance: f64) -> f64 {
    48.0 / distance.powi(13) - 24.0 / distance.powi(7)
}

/// Wall potential, zero at the edge of the wall's reach.
#[inline]
pub fn wall_potential(distance: f64) -> f64 {
    4.0 / distance.powi(12) - 4.0 / distance.powi(6) + 1.0
}
