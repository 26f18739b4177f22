/*
Every tunable number of the engine lives here, defaulted from `constants`.

The values were tuned for visual plausibility rather than physical accuracy, so
most users never touch them; the demo binary can still load an override from a
JSON file, e.g.

    { "verlet_calculations_per_frame": 4, "seed": 7, "thermostat": "Isokinetic" }

Any field missing from the file keeps its default.
 */
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimulationError};
use crate::thermostat_barostat::ThermostatKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time_step: f64,
    pub verlet_calculations_per_frame: usize,
    pub max_num_atoms: usize,

    // container, picometers
    pub container_width: f64,
    pub container_initial_height: f64,
    pub min_container_height: f64,

    // wall and pair interaction, model units
    pub wall_distance_threshold: f64,
    pub safe_inter_molecule_distance: f64,
    pub interaction_distance_thresh_sqrd: f64,
    pub min_distance_squared: f64,

    pub pressure_calc_weighting: f64,
    pub explosion_pressure: f64,
    pub pressure_to_atmospheres: f64,

    /// Gravity at start-up and after a reset, keeps condensed phases on the floor.
    pub initial_gravitational_accel: f64,
    pub max_gravitational_accel: f64,
    pub temperature_below_which_gravity_increases: f64,
    pub low_temperature_gravity_increase_rate: f64,

    pub solid_temperature: f64,
    pub liquid_temperature: f64,
    pub gas_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,

    pub max_temperature_change_per_adjustment: f64,
    pub ticks_per_temp_adjustment: usize,

    pub min_sigma: f64,
    pub max_sigma: f64,
    pub min_epsilon: f64,
    pub max_epsilon: f64,

    pub min_injected_molecule_speed: f64,
    pub max_injected_molecule_speed: f64,
    pub max_injected_molecule_angle: f64,

    pub thermostat: ThermostatKind,
    /// Fixed seed for reproducible runs; entropy from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time_step: TIME_STEP,
            verlet_calculations_per_frame: VERLET_CALCULATIONS_PER_FRAME,
            max_num_atoms: MAX_NUM_ATOMS,
            container_width: CONTAINER_WIDTH,
            container_initial_height: CONTAINER_INITIAL_HEIGHT,
            min_container_height: MIN_CONTAINER_HEIGHT,
            wall_distance_threshold: WALL_DISTANCE_THRESHOLD,
            safe_inter_molecule_distance: SAFE_INTER_MOLECULE_DISTANCE,
            interaction_distance_thresh_sqrd: PARTICLE_INTERACTION_DISTANCE_THRESH_SQRD,
            min_distance_squared: MIN_DISTANCE_SQUARED,
            pressure_calc_weighting: PRESSURE_CALC_WEIGHTING,
            explosion_pressure: EXPLOSION_PRESSURE,
            pressure_to_atmospheres: PRESSURE_TO_ATMOSPHERES,
            initial_gravitational_accel: INITIAL_GRAVITATIONAL_ACCEL,
            max_gravitational_accel: MAX_GRAVITATIONAL_ACCEL,
            temperature_below_which_gravity_increases: TEMPERATURE_BELOW_WHICH_GRAVITY_INCREASES,
            low_temperature_gravity_increase_rate: LOW_TEMPERATURE_GRAVITY_INCREASE_RATE,
            solid_temperature: SOLID_TEMPERATURE,
            liquid_temperature: LIQUID_TEMPERATURE,
            gas_temperature: GAS_TEMPERATURE,
            min_temperature: MIN_TEMPERATURE,
            max_temperature: MAX_TEMPERATURE,
            max_temperature_change_per_adjustment: MAX_TEMPERATURE_CHANGE_PER_ADJUSTMENT,
            ticks_per_temp_adjustment: TICKS_PER_TEMP_ADJUSTMENT,
            min_sigma: MIN_SIGMA,
            max_sigma: MAX_SIGMA,
            min_epsilon: MIN_EPSILON,
            max_epsilon: MAX_EPSILON,
            min_injected_molecule_speed: MIN_INJECTED_MOLECULE_SPEED,
            max_injected_molecule_speed: MAX_INJECTED_MOLECULE_SPEED,
            max_injected_molecule_angle: MAX_INJECTED_MOLECULE_ANGLE,
            thermostat: ThermostatKind::Adaptive,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| SimulationError::ConfigRead {
            path: path_str.clone(),
            source,
        })?;
        let config: SimulationConfig =
            serde_json::from_str(&text).map_err(|source| SimulationError::ConfigParse {
                path: path_str,
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(SimulationError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return fail("time_step must be finite and > 0");
        }
        if self.verlet_calculations_per_frame == 0 {
            return fail("verlet_calculations_per_frame must be at least 1");
        }
        // three atoms is the smallest ensemble that can hold one water molecule
        if self.max_num_atoms < 3 || self.max_num_atoms > MAX_NUM_ATOMS {
            return fail("max_num_atoms must lie in 3..=500");
        }
        if !(self.container_width > 0.0 && self.container_initial_height > 0.0) {
            return fail("container dimensions must be > 0");
        }
        if !(self.min_container_height > 0.0
            && self.min_container_height <= self.container_initial_height)
        {
            return fail("min_container_height must lie in (0, container_initial_height]");
        }
        if self.min_distance_squared <= 0.0
            || self.min_distance_squared >= self.interaction_distance_thresh_sqrd
        {
            return fail("min_distance_squared must lie in (0, interaction_distance_thresh_sqrd)");
        }
        if !(0.0..1.0).contains(&self.pressure_calc_weighting) {
            return fail("pressure_calc_weighting must lie in [0, 1)");
        }
        if !(self.initial_gravitational_accel >= 0.0
            && self.initial_gravitational_accel <= self.max_gravitational_accel)
        {
            return fail("initial_gravitational_accel must lie in [0, max_gravitational_accel]");
        }
        if self.min_sigma <= 0.0 || self.min_sigma > self.max_sigma {
            return fail("sigma range is empty or non-positive");
        }
        if self.min_epsilon < 0.0 || self.min_epsilon > self.max_epsilon {
            return fail("epsilon range is empty or negative");
        }
        if self.min_temperature <= 0.0 || self.min_temperature >= self.max_temperature {
            return fail("temperature range is empty or non-positive");
        }
        if self.min_injected_molecule_speed > self.max_injected_molecule_speed {
            return fail("injected molecule speed range is inverted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "seed": 11, "verlet_calculations_per_frame": 4 }"#).unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.verlet_calculations_per_frame, 4);
        assert_eq!(config.max_num_atoms, MAX_NUM_ATOMS);
        assert_eq!(config.thermostat, ThermostatKind::Adaptive);
    }

    #[test]
    fn rejects_oversized_ensemble() {
        let config = SimulationConfig {
            max_num_atoms: 900,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_initial_gravity_above_maximum() {
        let config = SimulationConfig {
            initial_gravitational_accel: 1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = SimulationConfig::from_json_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, SimulationError::ConfigRead { .. }));
    }
}
