use std::f64::consts::PI;

use rand::Rng;

use crate::phase_state::PhaseStateChange;

// wide enough that two molecules cannot overlap at any orientation
pub const MIN_INITIAL_DIAMETER_DISTANCE: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiatomicPhaseStateChanger;

impl PhaseStateChange for DiatomicPhaseStateChanger {
    fn min_inter_molecule_distance(&self) -> f64 {
        MIN_INITIAL_DIAMETER_DISTANCE
    }

    fn crystal_rotation_angle<R: Rng>(&self, _row: usize, _column: usize, rng: &mut R) -> f64 {
        rng.random::<f64>() * 2.0 * PI
    }
}
