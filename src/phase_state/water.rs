use std::f64::consts::PI;

use rand::Rng;

use crate::phase_state::PhaseStateChange;

pub const MIN_INITIAL_DIAMETER_DISTANCE: f64 = 1.4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaterPhaseStateChanger;

impl PhaseStateChange for WaterPhaseStateChanger {
    fn min_inter_molecule_distance(&self) -> f64 {
        MIN_INITIAL_DIAMETER_DISTANCE
    }

    /// Neighbours point their hydrogens in opposite directions, which is the
    /// pattern the frozen-water charges hold together.
    fn crystal_rotation_angle<R: Rng>(&self, row: usize, column: usize, _rng: &mut R) -> f64 {
        if (row + column) % 2 == 0 {
            0.0
        } else {
            PI
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn neighbours_alternate() {
        let mut rng = StdRng::seed_from_u64(0);
        let changer = WaterPhaseStateChanger;
        assert_eq!(changer.crystal_rotation_angle(0, 0, &mut rng), 0.0);
        assert_eq!(changer.crystal_rotation_angle(0, 1, &mut rng), PI);
        assert_eq!(changer.crystal_rotation_angle(1, 0, &mut rng), PI);
    }
}
