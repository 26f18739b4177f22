/*
Atom positions are never integrated directly. Each molecule is a rigid body
described by its center of mass and a rotation angle; the updaters below
re-derive the atom positions from those two quantities.

    monatomic : atom = center of mass
    diatomic  : two atoms at +/- half the bond length along the molecule axis
    water     : oxygen plus two hydrogens at the H-O-H angle, all offset from the
                (oxygen-heavy) center of mass and rotated by the molecule angle
 */
use nalgebra::{Rotation2, Vector2};

use crate::molecule::data_set::MoleculeDataSet;

pub const DIATOMIC_BOND_LENGTH: f64 = 0.9;
pub const WATER_OXYGEN_HYDROGEN_DISTANCE: f64 = 1.0 / 3.12;
// wider than real water, chosen because it packs into a nicer looking ice
pub const WATER_HOH_ANGLE: f64 = 120.0 * std::f64::consts::PI / 180.0;
pub const WATER_OXYGEN_MASS: f64 = 1.0;
pub const WATER_HYDROGEN_MASS: f64 = 0.25;

pub const MAX_ATOMS_PER_MOLECULE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomPositionUpdater {
    Monatomic,
    Diatomic,
    Water,
}

impl AtomPositionUpdater {
    pub fn for_atoms_per_molecule(atoms_per_molecule: usize) -> Self {
        match atoms_per_molecule {
            1 => AtomPositionUpdater::Monatomic,
            2 => AtomPositionUpdater::Diatomic,
            _ => AtomPositionUpdater::Water,
        }
    }

    pub fn atoms_per_molecule(self) -> usize {
        match self {
            AtomPositionUpdater::Monatomic => 1,
            AtomPositionUpdater::Diatomic => 2,
            AtomPositionUpdater::Water => 3,
        }
    }

    fn atom_masses(self) -> [f64; MAX_ATOMS_PER_MOLECULE] {
        match self {
            AtomPositionUpdater::Monatomic => [1.0, 0.0, 0.0],
            AtomPositionUpdater::Diatomic => [1.0, 1.0, 0.0],
            AtomPositionUpdater::Water => [WATER_OXYGEN_MASS, WATER_HYDROGEN_MASS, WATER_HYDROGEN_MASS],
        }
    }

    /// Offsets of each atom from the center of mass at rotation angle zero.
    /// Slots past `atoms_per_molecule()` are zero.
    pub fn reference_offsets(self) -> [Vector2<f64>; MAX_ATOMS_PER_MOLECULE] {
        match self {
            AtomPositionUpdater::Monatomic => [Vector2::zeros(); MAX_ATOMS_PER_MOLECULE],
            AtomPositionUpdater::Diatomic => {
                let half_bond = DIATOMIC_BOND_LENGTH / 2.0;
                [
                    Vector2::new(half_bond, 0.0),
                    Vector2::new(-half_bond, 0.0),
                    Vector2::zeros(),
                ]
            }
            AtomPositionUpdater::Water => {
                let half_angle = WATER_HOH_ANGLE / 2.0;
                let oxygen = Vector2::zeros();
                let hydrogen_1 = Vector2::new(
                    WATER_OXYGEN_HYDROGEN_DISTANCE * half_angle.sin(),
                    WATER_OXYGEN_HYDROGEN_DISTANCE * half_angle.cos(),
                );
                let hydrogen_2 = Vector2::new(-hydrogen_1.x, hydrogen_1.y);
                let center_of_mass = (oxygen * WATER_OXYGEN_MASS
                    + (hydrogen_1 + hydrogen_2) * WATER_HYDROGEN_MASS)
                    / self.molecule_mass();
                [
                    oxygen - center_of_mass,
                    hydrogen_1 - center_of_mass,
                    hydrogen_2 - center_of_mass,
                ]
            }
        }
    }

    pub fn molecule_mass(self) -> f64 {
        self.atom_masses().iter().sum()
    }

    /// Moment of inertia about the center of mass; zero for a point particle.
    pub fn rotational_inertia(self) -> f64 {
        self.reference_offsets()
            .iter()
            .zip(self.atom_masses().iter())
            .map(|(offset, mass)| mass * offset.norm_squared())
            .sum()
    }

    /// Writes the atoms of one molecule into `atoms`, which must hold exactly
    /// `atoms_per_molecule()` entries.
    #[inline]
    pub fn place_atoms(self, center_of_mass: Vector2<f64>, angle: f64, atoms: &mut [Vector2<f64>]) {
        match self {
            AtomPositionUpdater::Monatomic => atoms[0] = center_of_mass,
            _ => {
                let rotation = Rotation2::new(angle);
                let offsets = self.reference_offsets();
                for (atom, offset) in atoms.iter_mut().zip(offsets.iter()) {
                    *atom = center_of_mass + rotation * offset;
                }
            }
        }
    }

    pub fn update_atom_positions(self, data: &mut MoleculeDataSet) {
        let atoms_per_molecule = self.atoms_per_molecule();
        let number_of_molecules = data.number_of_molecules();
        for i in 0..number_of_molecules {
            let start = i * atoms_per_molecule;
            self.place_atoms(
                data.molecule_center_of_mass_positions[i],
                data.molecule_rotation_angles[i],
                &mut data.atom_positions[start..start + atoms_per_molecule],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn offsets_are_centred_on_mass() {
        for updater in [
            AtomPositionUpdater::Monatomic,
            AtomPositionUpdater::Diatomic,
            AtomPositionUpdater::Water,
        ] {
            let masses = updater.atom_masses();
            let weighted: Vector2<f64> = updater
                .reference_offsets()
                .iter()
                .zip(masses.iter())
                .map(|(offset, mass)| offset * *mass)
                .sum();
            assert_relative_eq!(weighted.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rigid_body_parameters() {
        assert_relative_eq!(AtomPositionUpdater::Monatomic.rotational_inertia(), 0.0);
        assert_relative_eq!(AtomPositionUpdater::Diatomic.molecule_mass(), 2.0);
        assert_relative_eq!(AtomPositionUpdater::Diatomic.rotational_inertia(), 0.405, epsilon = 1e-12);
        assert_relative_eq!(AtomPositionUpdater::Water.molecule_mass(), 1.5);
        assert!(AtomPositionUpdater::Water.rotational_inertia() > 0.0);
    }

    #[test]
    fn diatomic_atoms_follow_rotation() {
        let mut atoms = [Vector2::zeros(); 2];
        let center = Vector2::new(3.0, 4.0);
        AtomPositionUpdater::Diatomic.place_atoms(center, std::f64::consts::FRAC_PI_2, &mut atoms);
        assert_relative_eq!(atoms[0].x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(atoms[0].y, 4.45, epsilon = 1e-12);
        assert_relative_eq!(atoms[1].y, 3.55, epsilon = 1e-12);
        assert_relative_eq!((atoms[0] - atoms[1]).norm(), DIATOMIC_BOND_LENGTH, epsilon = 1e-12);
    }

    #[test]
    fn water_keeps_its_shape() {
        let mut atoms = [Vector2::zeros(); 3];
        AtomPositionUpdater::Water.place_atoms(Vector2::new(1.0, 1.0), 0.7, &mut atoms);
        assert_relative_eq!((atoms[1] - atoms[0]).norm(), WATER_OXYGEN_HYDROGEN_DISTANCE, epsilon = 1e-12);
        assert_relative_eq!((atoms[2] - atoms[0]).norm(), WATER_OXYGEN_HYDROGEN_DISTANCE, epsilon = 1e-12);
        let cos_hoh = (atoms[1] - atoms[0]).normalize().dot(&(atoms[2] - atoms[0]).normalize());
        assert_relative_eq!(cos_hoh, WATER_HOH_ANGLE.cos(), epsilon = 1e-12);
    }
}
