use rand::Rng;

use crate::phase_state::PhaseStateChange;

pub const MIN_INITIAL_INTER_PARTICLE_DISTANCE: f64 = 1.12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonatomicPhaseStateChanger;

impl PhaseStateChange for MonatomicPhaseStateChanger {
    fn min_inter_molecule_distance(&self) -> f64 {
        MIN_INITIAL_INTER_PARTICLE_DISTANCE
    }

    fn crystal_rotation_angle<R: Rng>(&self, _row: usize, _column: usize, _rng: &mut R) -> f64 {
        0.0
    }

    fn is_multi_atom(&self) -> bool {
        false
    }
}
