use crate::config::SimulationConfig;
use crate::lj_parameters::{lj_force_scalar, lj_pair_potential};
use crate::molecule::MoleculeDataSet;
use crate::verlet::{separation, InterMoleculeForces, StepEnvironment, VerletState};

/// Single-atom molecules. The interaction strength is the only tunable here,
/// in units where the default substances sit at 1.
#[derive(Clone, Debug)]
pub struct MonatomicVerlet {
    epsilon: f64,
    state: VerletState,
}

impl Default for MonatomicVerlet {
    fn default() -> Self {
        MonatomicVerlet {
            epsilon: 1.0,
            state: VerletState::default(),
        }
    }
}

impl MonatomicVerlet {
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }
}

impl InterMoleculeForces for MonatomicVerlet {
    fn accumulate_inter_molecule_forces(
        &mut self,
        data: &mut MoleculeDataSet,
        _env: &StepEnvironment,
        config: &SimulationConfig,
    ) -> f64 {
        let number_of_safe_molecules = data.number_of_safe_molecules();
        let mut potential_energy = 0.0;

        for i in 0..number_of_safe_molecules {
            for j in (i + 1)..number_of_safe_molecules {
                let (delta, distance_sqrd) = separation(
                    &data.molecule_center_of_mass_positions[i],
                    &data.molecule_center_of_mass_positions[j],
                    config.min_distance_squared,
                );
                if distance_sqrd >= config.interaction_distance_thresh_sqrd {
                    continue;
                }
                let force = delta * lj_force_scalar(distance_sqrd, self.epsilon);
                data.next_molecule_forces[i] += force;
                data.next_molecule_forces[j] -= force;
                potential_energy += lj_pair_potential(distance_sqrd, self.epsilon);
            }
        }
        potential_energy
    }

    fn state(&self) -> &VerletState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VerletState {
        &mut self.state
    }
}
