/*

=========================================================
 States of Matter: 2D Lennard-Jones phase simulation (Rust)
=========================================================

Small numbers of particles interacting through a Lennard-Jones potential,
kept in a box with a movable lid, heated and cooled until they melt, boil or
blow the lid off. Visual plausibility beats physical accuracy throughout.

🧪 Molecules
------------
- Neon, Argon (one atom), Oxygen (two atoms), Water (three atoms) and an
  adjustable atom whose sigma/epsilon the user controls.
- Molecules are rigid bodies: center of mass + rotation angle, atoms follow.
- State lives in one structure-of-arrays ensemble (`MoleculeDataSet`).

🧮 Integration
--------------
- Position Verlet with a fixed time step, several sub-steps per frame.
- Reduced units: distances in particle diameters, LJ cutoff at 2.5.
- Soft LJ walls; wall force in the bottom half of the box feeds a smoothed
  pressure. Too much pressure and the container explodes (one-way latch).
- Water adds temperature dependent partial charges for a crystalline ice.

🌡️ Temperature
--------------
- Isokinetic velocity rescale:
    λ = sqrt(T_target / T_current)
- Andersen-style stochastic relaxation at steady state.
- Model temperature maps to Kelvin through each substance's triple and
  critical point.

🧊 Phases
---------
- Solid: hexagonal lattice. Liquid: concentric rings. Gas: random positions
  with neighbour rejection. Each placement settles for a few sub-steps.

=========================================================
*/
pub mod config;
pub mod constants;
pub mod error;
pub mod lj_parameters;
pub mod model;
pub mod molecule;
pub mod phase_state;
pub mod thermostat_barostat;
pub mod verlet;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use model::{ModelSnapshot, SimulationModel, StepReport};
pub use molecule::{Atom, AtomType, MoleculeType};
pub use phase_state::Phase;
pub use thermostat_barostat::ThermostatKind;

pub mod units {
    /*
    Conversions at the boundary between model units and what the view shows.

    Temperature is piecewise linear through two anchor points per substance,
    the triple point and the critical point, so that a model solid reads as a
    solid in Kelvin too:

        T_model <= triple         : proportional to the triple point
        triple < T_model <= crit  : linear between the two anchors
        T_model > crit            : proportional to the critical point
     */
    use crate::molecule::MoleculeType;

    pub fn model_temperature_to_kelvin(temperature: f64, molecule_type: MoleculeType, epsilon: f64) -> f64 {
        let (triple_kelvin, critical_kelvin) = molecule_type.kelvin_reference_points(epsilon);
        let (triple_model, critical_model) = molecule_type.model_reference_points();

        if temperature <= triple_model {
            temperature * triple_kelvin / triple_model
        } else if temperature <= critical_model {
            let slope = (critical_kelvin - triple_kelvin) / (critical_model - triple_model);
            triple_kelvin + (temperature - triple_model) * slope
        } else {
            temperature * critical_kelvin / critical_model
        }
    }

    pub fn model_pressure_to_atmospheres(pressure: f64, pressure_to_atmospheres: f64) -> f64 {
        pressure * pressure_to_atmospheres
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kelvin_conversion_hits_anchor_points() {
        let neon = MoleculeType::Neon;
        assert_relative_eq!(units::model_temperature_to_kelvin(0.26, neon, 32.8), 24.57, epsilon = 1e-9);
        assert_relative_eq!(units::model_temperature_to_kelvin(0.8, neon, 32.8), 44.49, epsilon = 1e-9);
        assert_relative_eq!(units::model_temperature_to_kelvin(0.0, neon, 32.8), 0.0);
        assert_relative_eq!(units::model_temperature_to_kelvin(1.6, neon, 32.8), 88.98, epsilon = 1e-9);
    }

    #[test]
    fn kelvin_conversion_is_monotonic() {
        for molecule_type in [
            MoleculeType::Argon,
            MoleculeType::Oxygen,
            MoleculeType::Water,
            MoleculeType::Adjustable,
        ] {
            let mut previous = -1.0;
            for k in 0..300 {
                let kelvin = units::model_temperature_to_kelvin(k as f64 * 0.01, molecule_type, 100.0);
                assert!(kelvin > previous);
                previous = kelvin;
            }
        }
    }

    #[test]
    fn atmospheres_scale_linearly() {
        assert_relative_eq!(units::model_pressure_to_atmospheres(0.01, 200.0), 2.0);
    }
}
