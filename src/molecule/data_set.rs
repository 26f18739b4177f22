/*
Structure-of-arrays storage for the whole ensemble.

Every array is allocated to full capacity up front and only the first
`number_of_molecules()` entries (or `number_of_atoms` for the atom array) are
live. Molecules `0..number_of_safe_molecules` are the safe partition, the rest
were injected recently and are still waiting to be promoted.
 */
use nalgebra::Vector2;

use crate::molecule::position_updater::AtomPositionUpdater;

#[derive(Clone, Debug)]
pub struct MoleculeDataSet {
    pub(crate) atom_positions: Vec<Vector2<f64>>,

    pub(crate) molecule_center_of_mass_positions: Vec<Vector2<f64>>,
    pub(crate) molecule_velocities: Vec<Vector2<f64>>,
    pub(crate) molecule_forces: Vec<Vector2<f64>>,
    pub(crate) next_molecule_forces: Vec<Vector2<f64>>,

    pub(crate) molecule_rotation_angles: Vec<f64>,
    pub(crate) molecule_rotation_rates: Vec<f64>,
    pub(crate) molecule_torques: Vec<f64>,
    pub(crate) next_molecule_torques: Vec<f64>,

    atoms_per_molecule: usize,
    max_molecules: usize,
    position_updater: AtomPositionUpdater,
    molecule_mass: f64,
    molecule_rotational_inertia: f64,
    number_of_atoms: usize,
    number_of_safe_molecules: usize,
}

impl MoleculeDataSet {
    pub fn new(position_updater: AtomPositionUpdater, max_num_atoms: usize) -> Self {
        let atoms_per_molecule = position_updater.atoms_per_molecule();
        let max_molecules = max_num_atoms / atoms_per_molecule;
        MoleculeDataSet {
            atom_positions: vec![Vector2::zeros(); max_molecules * atoms_per_molecule],
            molecule_center_of_mass_positions: vec![Vector2::zeros(); max_molecules],
            molecule_velocities: vec![Vector2::zeros(); max_molecules],
            molecule_forces: vec![Vector2::zeros(); max_molecules],
            next_molecule_forces: vec![Vector2::zeros(); max_molecules],
            molecule_rotation_angles: vec![0.0; max_molecules],
            molecule_rotation_rates: vec![0.0; max_molecules],
            molecule_torques: vec![0.0; max_molecules],
            next_molecule_torques: vec![0.0; max_molecules],
            atoms_per_molecule,
            max_molecules,
            position_updater,
            molecule_mass: position_updater.molecule_mass(),
            molecule_rotational_inertia: position_updater.rotational_inertia(),
            number_of_atoms: 0,
            number_of_safe_molecules: 0,
        }
    }

    pub fn atoms_per_molecule(&self) -> usize {
        self.atoms_per_molecule
    }

    pub fn position_updater(&self) -> AtomPositionUpdater {
        self.position_updater
    }

    pub fn molecule_mass(&self) -> f64 {
        self.molecule_mass
    }

    pub fn molecule_rotational_inertia(&self) -> f64 {
        self.molecule_rotational_inertia
    }

    pub fn number_of_atoms(&self) -> usize {
        self.number_of_atoms
    }

    pub fn number_of_molecules(&self) -> usize {
        self.number_of_atoms / self.atoms_per_molecule
    }

    pub fn number_of_safe_molecules(&self) -> usize {
        self.number_of_safe_molecules
    }

    pub fn max_molecules(&self) -> usize {
        self.max_molecules
    }

    pub fn remaining_slots(&self) -> usize {
        self.max_molecules - self.number_of_molecules()
    }

    pub fn atom_positions(&self) -> &[Vector2<f64>] {
        &self.atom_positions[..self.number_of_atoms]
    }

    pub fn center_of_mass_positions(&self) -> &[Vector2<f64>] {
        &self.molecule_center_of_mass_positions[..self.number_of_molecules()]
    }

    pub fn velocities(&self) -> &[Vector2<f64>] {
        &self.molecule_velocities[..self.number_of_molecules()]
    }

    pub fn forces(&self) -> &[Vector2<f64>] {
        &self.molecule_forces[..self.number_of_molecules()]
    }

    pub fn rotation_angles(&self) -> &[f64] {
        &self.molecule_rotation_angles[..self.number_of_molecules()]
    }

    pub fn rotation_rates(&self) -> &[f64] {
        &self.molecule_rotation_rates[..self.number_of_molecules()]
    }

    /// Appends a molecule and lays out its atoms. A safe molecule is swapped
    /// into the first unsafe slot so the safe partition stays contiguous.
    /// Returns false, leaving the ensemble untouched, when capacity is exhausted.
    pub fn add_molecule(
        &mut self,
        center_of_mass: Vector2<f64>,
        velocity: Vector2<f64>,
        rotation_angle: f64,
        rotation_rate: f64,
        is_safe: bool,
    ) -> bool {
        let index = self.number_of_molecules();
        if index >= self.max_molecules {
            return false;
        }

        self.molecule_center_of_mass_positions[index] = center_of_mass;
        self.molecule_velocities[index] = velocity;
        self.molecule_forces[index] = Vector2::zeros();
        self.next_molecule_forces[index] = Vector2::zeros();
        self.molecule_rotation_angles[index] = rotation_angle;
        self.molecule_rotation_rates[index] = rotation_rate;
        self.molecule_torques[index] = 0.0;
        self.next_molecule_torques[index] = 0.0;

        let start = index * self.atoms_per_molecule;
        self.position_updater.place_atoms(
            center_of_mass,
            rotation_angle,
            &mut self.atom_positions[start..start + self.atoms_per_molecule],
        );
        self.number_of_atoms += self.atoms_per_molecule;

        if is_safe {
            if index > self.number_of_safe_molecules {
                self.swap_molecules(index, self.number_of_safe_molecules);
            }
            self.number_of_safe_molecules += 1;
        }
        true
    }

    /// Removes one molecule, shifting everything after it down a slot so the
    /// safe partition keeps its order.
    pub fn remove_molecule(&mut self, index: usize) {
        let number_of_molecules = self.number_of_molecules();
        if index >= number_of_molecules {
            log::warn!("Ignoring removal of molecule {index}, only {number_of_molecules} present");
            return;
        }

        let tail = index + 1..number_of_molecules;
        self.molecule_center_of_mass_positions.copy_within(tail.clone(), index);
        self.molecule_velocities.copy_within(tail.clone(), index);
        self.molecule_forces.copy_within(tail.clone(), index);
        self.next_molecule_forces.copy_within(tail.clone(), index);
        self.molecule_rotation_angles.copy_within(tail.clone(), index);
        self.molecule_rotation_rates.copy_within(tail.clone(), index);
        self.molecule_torques.copy_within(tail.clone(), index);
        self.next_molecule_torques.copy_within(tail, index);

        let apm = self.atoms_per_molecule;
        self.atom_positions
            .copy_within((index + 1) * apm..self.number_of_atoms, index * apm);

        self.number_of_atoms -= apm;
        if index < self.number_of_safe_molecules {
            self.number_of_safe_molecules -= 1;
        }
    }

    /// Drops every molecule while keeping the allocation.
    pub fn clear(&mut self) {
        self.number_of_atoms = 0;
        self.number_of_safe_molecules = 0;
    }

    /// Exchanges the complete state of two molecules, atoms included.
    pub fn swap_molecules(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.molecule_center_of_mass_positions.swap(a, b);
        self.molecule_velocities.swap(a, b);
        self.molecule_forces.swap(a, b);
        self.next_molecule_forces.swap(a, b);
        self.molecule_rotation_angles.swap(a, b);
        self.molecule_rotation_rates.swap(a, b);
        self.molecule_torques.swap(a, b);
        self.next_molecule_torques.swap(a, b);
        for k in 0..self.atoms_per_molecule {
            self.atom_positions
                .swap(a * self.atoms_per_molecule + k, b * self.atoms_per_molecule + k);
        }
    }

    pub fn set_number_of_safe_molecules(&mut self, number_of_safe_molecules: usize) {
        self.number_of_safe_molecules = number_of_safe_molecules.min(self.number_of_molecules());
    }

    pub fn sync_atom_positions(&mut self) {
        let updater = self.position_updater;
        updater.update_atom_positions(self);
    }

    /// (translational, rotational) kinetic energy summed over the ensemble.
    pub fn kinetic_energies(&self) -> (f64, f64) {
        let translational: f64 = self
            .velocities()
            .iter()
            .map(|v| 0.5 * self.molecule_mass * v.norm_squared())
            .sum();
        let rotational: f64 = self
            .rotation_rates()
            .iter()
            .map(|w| 0.5 * self.molecule_rotational_inertia * w * w)
            .sum();
        (translational, rotational)
    }

    /// Temperature in model units; multi-atom molecules carry the extra
    /// rotational degree of freedom.
    pub fn measured_temperature(&self) -> f64 {
        let number_of_molecules = self.number_of_molecules();
        if number_of_molecules == 0 {
            return 0.0;
        }
        let (translational, rotational) = self.kinetic_energies();
        (translational + rotational) / number_of_molecules as f64 / self.degrees_of_freedom_factor()
    }

    pub(crate) fn degrees_of_freedom_factor(&self) -> f64 {
        if self.atoms_per_molecule == 1 {
            1.0
        } else {
            1.5
        }
    }

    pub fn clear_forces(&mut self) {
        self.molecule_forces.fill(Vector2::zeros());
        self.next_molecule_forces.fill(Vector2::zeros());
        self.molecule_torques.fill(0.0);
        self.next_molecule_torques.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_invariants(data: &MoleculeDataSet) {
        assert_eq!(
            data.number_of_atoms(),
            data.atoms_per_molecule() * data.number_of_molecules()
        );
        assert!(data.number_of_safe_molecules() <= data.number_of_molecules());
        assert!(data.number_of_atoms() <= 500);
    }

    #[test]
    fn capacity_depends_on_arity() {
        assert_eq!(MoleculeDataSet::new(AtomPositionUpdater::Monatomic, 500).max_molecules(), 500);
        assert_eq!(MoleculeDataSet::new(AtomPositionUpdater::Diatomic, 500).max_molecules(), 250);
        assert_eq!(MoleculeDataSet::new(AtomPositionUpdater::Water, 500).max_molecules(), 166);
    }

    #[test]
    fn add_fails_when_full() {
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Water, 9);
        for i in 0..3 {
            assert!(data.add_molecule(Vector2::new(i as f64, 0.0), Vector2::zeros(), 0.0, 0.0, true));
        }
        assert_eq!(data.remaining_slots(), 0);
        assert!(!data.add_molecule(Vector2::zeros(), Vector2::zeros(), 0.0, 0.0, false));
        assert_eq!(data.number_of_atoms(), 9);
        check_invariants(&data);
    }

    #[test]
    fn safe_molecule_joins_safe_partition() {
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Diatomic, 20);
        data.add_molecule(Vector2::new(1.0, 1.0), Vector2::zeros(), 0.0, 0.0, true);
        data.add_molecule(Vector2::new(2.0, 2.0), Vector2::zeros(), 0.0, 0.0, false);
        data.add_molecule(Vector2::new(3.0, 3.0), Vector2::zeros(), 0.0, 0.0, true);

        assert_eq!(data.number_of_safe_molecules(), 2);
        assert_eq!(data.center_of_mass_positions()[1], Vector2::new(3.0, 3.0));
        assert_eq!(data.center_of_mass_positions()[2], Vector2::new(2.0, 2.0));
        // atoms moved along with their molecule
        assert_relative_eq!(data.atom_positions()[2], Vector2::new(3.45, 3.0), epsilon = 1e-12);
        check_invariants(&data);
    }

    #[test]
    fn removal_keeps_partition_consistent() {
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Monatomic, 10);
        for i in 0..4 {
            data.add_molecule(Vector2::new(i as f64, 0.0), Vector2::zeros(), 0.0, 0.0, i < 2);
        }
        data.remove_molecule(0);
        assert_eq!(data.number_of_molecules(), 3);
        assert_eq!(data.number_of_safe_molecules(), 1);
        assert_eq!(data.center_of_mass_positions()[0], Vector2::new(1.0, 0.0));
        assert_eq!(data.atom_positions()[2], Vector2::new(3.0, 0.0));

        data.remove_molecule(2);
        assert_eq!(data.number_of_safe_molecules(), 1);
        data.remove_molecule(7);
        assert_eq!(data.number_of_molecules(), 2);
        check_invariants(&data);
    }

    #[test]
    fn temperature_counts_rotation_for_polyatomics() {
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Diatomic, 10);
        data.add_molecule(Vector2::zeros(), Vector2::new(1.0, 0.0), 0.0, 2.0, true);
        let (translational, rotational) = data.kinetic_energies();
        assert_relative_eq!(translational, 1.0);
        assert_relative_eq!(rotational, 0.5 * 0.405 * 4.0, epsilon = 1e-12);
        assert_relative_eq!(
            data.measured_temperature(),
            (translational + rotational) / 1.5,
            epsilon = 1e-12
        );
    }
}
