use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomType {
    Neon,
    Argon,
    Oxygen,
    Hydrogen,
    /// Atom whose diameter and interaction strength the user controls.
    Adjustable,
}

impl AtomType {
    /// Radius in picometers. The adjustable atom takes its radius from the
    /// current sigma instead, this is only its starting value.
    pub fn default_radius(self) -> f64 {
        match self {
            AtomType::Neon => 154.0,
            AtomType::Argon => 181.0,
            AtomType::Oxygen => 162.0,
            AtomType::Hydrogen => 120.0,
            AtomType::Adjustable => crate::constants::DEFAULT_ADJUSTABLE_SIGMA / 2.0,
        }
    }

    /// Mass in atomic mass units.
    pub fn mass(self) -> f64 {
        match self {
            AtomType::Neon => 20.1797,
            AtomType::Argon => 39.948,
            AtomType::Oxygen => 15.9994,
            AtomType::Hydrogen => 1.00794,
            AtomType::Adjustable => 25.0,
        }
    }
}

/// One atom as the view sees it: picometer position, kinematics of the owning
/// molecule, radius and mass. Rebuilt from the ensemble after every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Atom {
    atom_type: AtomType,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub acceleration: Vector2<f64>,
    pub radius: f64,
    pub mass: f64,
}

impl Atom {
    pub fn new(atom_type: AtomType, radius: f64) -> Self {
        Atom {
            atom_type,
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            radius,
            mass: atom_type.mass(),
        }
    }

    pub fn atom_type(&self) -> AtomType {
        self.atom_type
    }
}
