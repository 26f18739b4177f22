/*
Molecules are rigid: one, two or three atoms held at fixed offsets from a
center of mass. The ensemble (`MoleculeDataSet`) stores the molecule state as
parallel arrays and derives the atom positions from it; `Atom` is only the
per-frame record handed to whoever draws the particles.
 */
pub mod atom;
pub mod data_set;
pub mod position_updater;
pub mod substance;

pub use atom::{Atom, AtomType};
pub use data_set::MoleculeDataSet;
pub use position_updater::AtomPositionUpdater;
pub use substance::MoleculeType;
