/*
Water gets a hand-tuned interaction instead of a physical one.

Oxygens interact through LJ with a stiffened repulsive term, and on top of that
every atom pair of two neighbouring molecules feels a Coulomb-like term between
partial charges (-2q on oxygen, +q on each hydrogen). Both the charge and the
repulsion stiffening depend on the set point:

    set point <= FROZEN   : strong charges, stiff repulsion -> open hexagonal ice
    set point >= MELTED   : weak charges, plain LJ          -> ordinary liquid
    in between            : linear blend

Odd-indexed molecules carry lopsided hydrogen charges.
 */
use itertools::iproduct;
use nalgebra::Vector2;

use crate::config::SimulationConfig;
use crate::lj_parameters::{lj_pair_potential, scaled_repulsion_force_scalar};
use crate::molecule::MoleculeDataSet;
use crate::verlet::{separation, InterMoleculeForces, StepEnvironment, VerletState};

pub const WATER_FULLY_FROZEN_TEMPERATURE: f64 = 0.22;
pub const WATER_FULLY_MELTED_TEMPERATURE: f64 = 0.30;
pub const WATER_FULLY_FROZEN_ELECTROSTATIC_FORCE: f64 = 4.0;
pub const WATER_FULLY_MELTED_ELECTROSTATIC_FORCE: f64 = 1.0;
pub const MAX_REPULSIVE_SCALING_FACTOR_FOR_WATER: f64 = 3.0;
pub const MIN_REPULSIVE_SCALING_FACTOR_FOR_WATER: f64 = 1.0;

#[derive(Clone, Debug, Default)]
pub struct WaterVerlet {
    state: VerletState,
}

/// Charge magnitude and repulsion scaling for a given set point.
pub fn temperature_band(temperature_set_point: f64) -> (f64, f64) {
    if temperature_set_point <= WATER_FULLY_FROZEN_TEMPERATURE {
        (
            WATER_FULLY_FROZEN_ELECTROSTATIC_FORCE,
            MAX_REPULSIVE_SCALING_FACTOR_FOR_WATER,
        )
    } else if temperature_set_point >= WATER_FULLY_MELTED_TEMPERATURE {
        (
            WATER_FULLY_MELTED_ELECTROSTATIC_FORCE,
            MIN_REPULSIVE_SCALING_FACTOR_FOR_WATER,
        )
    } else {
        let melted_fraction = (temperature_set_point - WATER_FULLY_FROZEN_TEMPERATURE)
            / (WATER_FULLY_MELTED_TEMPERATURE - WATER_FULLY_FROZEN_TEMPERATURE);
        let charge = WATER_FULLY_FROZEN_ELECTROSTATIC_FORCE
            - (WATER_FULLY_FROZEN_ELECTROSTATIC_FORCE - WATER_FULLY_MELTED_ELECTROSTATIC_FORCE)
                * melted_fraction;
        let scaling = MAX_REPULSIVE_SCALING_FACTOR_FOR_WATER
            - (MAX_REPULSIVE_SCALING_FACTOR_FOR_WATER - MIN_REPULSIVE_SCALING_FACTOR_FOR_WATER)
                * melted_fraction;
        (charge, scaling)
    }
}

fn charges_for(molecule: usize, q0: f64) -> [f64; 3] {
    if molecule % 2 == 1 {
        [-2.0 * q0, 1.67 * q0, 0.33 * q0]
    } else {
        [-2.0 * q0, q0, q0]
    }
}

impl InterMoleculeForces for WaterVerlet {
    fn accumulate_inter_molecule_forces(
        &mut self,
        data: &mut MoleculeDataSet,
        env: &StepEnvironment,
        config: &SimulationConfig,
    ) -> f64 {
        let number_of_safe_molecules = data.number_of_safe_molecules();
        let (q0, repulsive_scaling) = temperature_band(env.temperature_set_point);
        let mut potential_energy = 0.0;

        for i in 0..number_of_safe_molecules {
            let center_i = data.molecule_center_of_mass_positions[i];
            let charges_i = charges_for(i, q0);
            for j in (i + 1)..number_of_safe_molecules {
                let center_j = data.molecule_center_of_mass_positions[j];
                let (delta, distance_sqrd) = separation(&center_i, &center_j, config.min_distance_squared);
                if distance_sqrd >= config.interaction_distance_thresh_sqrd {
                    continue;
                }

                // oxygen-oxygen LJ acts through the centers
                let force = delta * scaled_repulsion_force_scalar(distance_sqrd, repulsive_scaling);
                data.next_molecule_forces[i] += force;
                data.next_molecule_forces[j] -= force;
                potential_energy += lj_pair_potential(distance_sqrd, 1.0);

                let charges_j = charges_for(j, q0);
                for (ii, jj) in iproduct!(0..3, 0..3) {
                    let atom_i = data.atom_positions[3 * i + ii];
                    let atom_j = data.atom_positions[3 * j + jj];
                    let (delta, distance_sqrd) = separation(&atom_i, &atom_j, config.min_distance_squared);
                    let r2inv = 1.0 / distance_sqrd;
                    let force: Vector2<f64> = delta * (charges_i[ii] * charges_j[jj] * r2inv * r2inv);
                    data.next_molecule_forces[i] += force;
                    data.next_molecule_forces[j] -= force;
                    data.next_molecule_torques[i] += (atom_i - center_i).perp(&force);
                    data.next_molecule_torques[j] -= (atom_j - center_j).perp(&force);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::AtomPositionUpdater;
    use approx::assert_relative_eq;

    #[test]
    fn band_interpolates_between_frozen_and_melted() {
        assert_eq!(temperature_band(0.1), (4.0, 3.0));
        assert_eq!(temperature_band(0.5), (1.0, 1.0));
        let (charge, scaling) = temperature_band(0.26);
        assert_relative_eq!(charge, 2.5, epsilon = 1e-12);
        assert_relative_eq!(scaling, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn molecules_stay_neutral() {
        for molecule in 0..2 {
            let total: f64 = charges_for(molecule, 1.0).iter().sum();
            assert_relative_eq!(total, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn forces_are_equal_and_opposite() {
        let config = SimulationConfig::default();
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Water, 9);
        data.add_molecule(Vector2::new(5.0, 5.0), Vector2::zeros(), 0.0, 0.0, true);
        data.add_molecule(Vector2::new(6.1, 5.3), Vector2::zeros(), 2.0, 0.0, true);
        data.clear_forces();

        let env = StepEnvironment {
            gravitational_acceleration: 0.0,
            temperature_set_point: 0.15,
        };
        let mut verlet = WaterVerlet::default();
        let energy = verlet.accumulate_inter_molecule_forces(&mut data, &env, &config);
        assert!(energy.is_finite());
        let total = data.next_molecule_forces[0] + data.next_molecule_forces[1];
        assert_relative_eq!(total.norm(), 0.0, epsilon = 1e-9);
    }
}
