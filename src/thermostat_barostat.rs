/*
Thermostats act once per frame, after the Verlet sub-steps.

    Isokinetic : exact velocity rescale, snaps onto the target
    Andersen   : stochastic relaxation, keeps a Maxwell-like spread
    Adaptive   : isokinetic while the temperature is being pushed around
                 (heating, cooling or far from target), Andersen otherwise
 */
pub mod andersen;
pub mod isokinetic;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::molecule::MoleculeDataSet;

pub use andersen::AndersenThermostat;
pub use isokinetic::IsokineticThermostat;

/// Relative mismatch between measured and target temperature above which the
/// adaptive thermostat keeps rescaling.
pub const ADAPTIVE_TEMPERATURE_TOLERANCE: f64 = 0.10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermostatKind {
    NoThermostat,
    Isokinetic,
    Andersen,
    Adaptive,
}

impl ThermostatKind {
    /// Picks the concrete thermostat for this frame. Only `Adaptive` depends
    /// on the ensemble state.
    pub fn resolve(self, temperature_is_driven: bool, measured_temperature: f64, target_temperature: f64) -> Self {
        match self {
            ThermostatKind::Adaptive => {
                let far_from_target = (measured_temperature - target_temperature).abs()
                    > ADAPTIVE_TEMPERATURE_TOLERANCE * target_temperature;
                if temperature_is_driven || far_from_target {
                    ThermostatKind::Isokinetic
                } else {
                    ThermostatKind::Andersen
                }
            }
            other => other,
        }
    }
}

/// Runs one thermostat pass and returns the kind that actually ran.
pub fn apply_thermostat<R: Rng>(
    kind: ThermostatKind,
    data: &mut MoleculeDataSet,
    temperature_is_driven: bool,
    target_temperature: f64,
    min_model_temperature: f64,
    rng: &mut R,
) -> ThermostatKind {
    let resolved = kind.resolve(temperature_is_driven, data.measured_temperature(), target_temperature);
    match resolved {
        ThermostatKind::NoThermostat => {}
        ThermostatKind::Andersen => {
            AndersenThermostat::new(target_temperature, min_model_temperature).adjust_temperature(data, rng)
        }
        ThermostatKind::Isokinetic | ThermostatKind::Adaptive => {
            IsokineticThermostat::new(target_temperature, min_model_temperature).adjust_temperature(data);
        }
    }
    resolved
}
