use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::molecule::atom::AtomType;

/// Substances the simulation knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoleculeType {
    Neon,
    Argon,
    /// Diatomic O2.
    Oxygen,
    /// Triatomic H2O.
    Water,
    /// Monatomic substance with user-controlled sigma and epsilon.
    Adjustable,
    /// Atom built from arbitrary parameters; not driven by the interactive model.
    UserDefined,
}

impl MoleculeType {
    pub const DEFAULT: MoleculeType = MoleculeType::Neon;

    pub fn atoms_per_molecule(self) -> usize {
        self.atom_types().len()
    }

    /// Atom types in the order the position updater lays them out.
    pub fn atom_types(self) -> &'static [AtomType] {
        match self {
            MoleculeType::Neon => &[AtomType::Neon],
            MoleculeType::Argon => &[AtomType::Argon],
            MoleculeType::Oxygen => &[AtomType::Oxygen, AtomType::Oxygen],
            MoleculeType::Water => &[AtomType::Oxygen, AtomType::Hydrogen, AtomType::Hydrogen],
            MoleculeType::Adjustable | MoleculeType::UserDefined => &[AtomType::Adjustable],
        }
    }

    pub fn is_supported(self) -> bool {
        self != MoleculeType::UserDefined
    }

    /// Particle diameter in picometers; one model distance unit.
    pub fn default_sigma(self) -> f64 {
        match self {
            MoleculeType::Neon => 308.0,
            MoleculeType::Argon => 362.0,
            MoleculeType::Oxygen => 324.0,
            MoleculeType::Water => 316.0,
            MoleculeType::Adjustable | MoleculeType::UserDefined => DEFAULT_ADJUSTABLE_SIGMA,
        }
    }

    /// Interaction strength in Kelvin.
    pub fn default_epsilon(self) -> f64 {
        match self {
            MoleculeType::Neon => 32.8,
            MoleculeType::Argon => 111.84,
            MoleculeType::Oxygen => 113.0,
            MoleculeType::Water => 200.0,
            MoleculeType::Adjustable | MoleculeType::UserDefined => DEFAULT_ADJUSTABLE_EPSILON,
        }
    }

    /// (triple point, critical point) in Kelvin.
    pub fn kelvin_reference_points(self, epsilon: f64) -> (f64, f64) {
        match self {
            MoleculeType::Neon => (24.57, 44.49),
            MoleculeType::Argon => (83.8, 150.7),
            MoleculeType::Oxygen => (54.36, 154.59),
            MoleculeType::Water => (273.16, 647.1),
            MoleculeType::Adjustable | MoleculeType::UserDefined => (
                epsilon * ADJUSTABLE_TRIPLE_POINT_PER_EPSILON,
                epsilon * ADJUSTABLE_CRITICAL_POINT_PER_EPSILON,
            ),
        }
    }

    /// (triple point, critical point) in model temperature units.
    pub fn model_reference_points(self) -> (f64, f64) {
        match self.atoms_per_molecule() {
            1 => (
                TRIPLE_POINT_MONATOMIC_MODEL_TEMPERATURE,
                CRITICAL_POINT_MONATOMIC_MODEL_TEMPERATURE,
            ),
            2 => (
                TRIPLE_POINT_DIATOMIC_MODEL_TEMPERATURE,
                CRITICAL_POINT_DIATOMIC_MODEL_TEMPERATURE,
            ),
            _ => (
                TRIPLE_POINT_WATER_MODEL_TEMPERATURE,
                CRITICAL_POINT_WATER_MODEL_TEMPERATURE,
            ),
        }
    }

    /// Molecule count whose solid, packed into a square, spans about a third
    /// of the container width.
    pub fn initial_number_of_molecules(self, sigma: f64, container_width: f64, max_num_atoms: usize) -> usize {
        let atoms_per_side = (container_width / (sigma * 1.05 * 3.0)).round() as usize;
        let number_of_atoms = (atoms_per_side * atoms_per_side).min(max_num_atoms);
        number_of_atoms / self.atoms_per_molecule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_matches_atom_table() {
        assert_eq!(MoleculeType::Neon.atoms_per_molecule(), 1);
        assert_eq!(MoleculeType::Oxygen.atoms_per_molecule(), 2);
        assert_eq!(MoleculeType::Water.atoms_per_molecule(), 3);
        assert_eq!(MoleculeType::Water.atom_types()[0], AtomType::Oxygen);
    }

    #[test]
    fn initial_counts_fill_a_third_of_the_width() {
        assert_eq!(
            MoleculeType::Neon.initial_number_of_molecules(308.0, CONTAINER_WIDTH, MAX_NUM_ATOMS),
            100
        );
        assert_eq!(
            MoleculeType::Oxygen.initial_number_of_molecules(324.0, CONTAINER_WIDTH, MAX_NUM_ATOMS),
            50
        );
        assert_eq!(
            MoleculeType::Water.initial_number_of_molecules(316.0, CONTAINER_WIDTH, MAX_NUM_ATOMS),
            33
        );
        // the smallest sigma would overflow the ensemble without the cap
        let tiny = MoleculeType::Adjustable.initial_number_of_molecules(MIN_SIGMA, CONTAINER_WIDTH, MAX_NUM_ATOMS);
        assert!(tiny <= MAX_NUM_ATOMS);
    }

    #[test]
    fn adjustable_reference_points_follow_epsilon() {
        let (triple, critical) = MoleculeType::Adjustable.kelvin_reference_points(100.0);
        assert!((triple - 75.0).abs() < 1e-12);
        assert!((critical - 135.0).abs() < 1e-12);
        assert!(!MoleculeType::UserDefined.is_supported());
    }
}
