use itertools::iproduct;

use crate::config::SimulationConfig;
use crate::lj_parameters::{lj_force_scalar, lj_pair_potential};
use crate::molecule::MoleculeDataSet;
use crate::verlet::{separation, InterMoleculeForces, StepEnvironment, VerletState};

/// Two-atom rigid molecules. Every atom of one molecule interacts with every
/// atom of the other; the force lands on the center of mass and the lever arm
/// of each atom turns it into torque.
#[derive(Clone, Debug, Default)]
pub struct DiatomicVerlet {
    state: VerletState,
}

impl InterMoleculeForces for DiatomicVerlet {
    fn accumulate_inter_molecule_forces(
        &mut self,
        data: &mut MoleculeDataSet,
        _env: &StepEnvironment,
        config: &SimulationConfig,
    ) -> f64 {
        let number_of_safe_molecules = data.number_of_safe_molecules();
        let apm = data.atoms_per_molecule();
        let mut potential_energy = 0.0;

        for i in 0..number_of_safe_molecules {
            let center_i = data.molecule_center_of_mass_positions[i];
            for j in (i + 1)..number_of_safe_molecules {
                let center_j = data.molecule_center_of_mass_positions[j];
                // center pre-check, atom pairs only for neighbours
                if (center_i - center_j).norm_squared() >= config.interaction_distance_thresh_sqrd {
                    continue;
                }
                for (ii, jj) in iproduct!(0..apm, 0..apm) {
                    let atom_i = data.atom_positions[i * apm + ii];
                    let atom_j = data.atom_positions[j * apm + jj];
                    let (delta, distance_sqrd) = separation(&atom_i, &atom_j, config.min_distance_squared);
                    if distance_sqrd >= config.interaction_distance_thresh_sqrd {
                        continue;
                    }
                    let force = delta * lj_force_scalar(distance_sqrd, 1.0);
                    data.next_molecule_forces[i] += force;
                    data.next_molecule_forces[j] -= force;
                    data.next_molecule_torques[i] += (atom_i - center_i).perp(&force);
                    data.next_molecule_torques[j] -= (atom_j - center_j).perp(&force);
                    potential_energy += lj_pair_potential(distance_sqrd, 1.0);
                }
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
