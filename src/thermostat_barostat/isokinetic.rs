use crate::molecule::MoleculeDataSet;

/// Velocity rescaling thermostat: every velocity and rotation rate is scaled by
/// the same factor so the measured temperature lands exactly on the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsokineticThermostat {
    pub target_temperature: f64,
    pub min_model_temperature: f64,
}

impl IsokineticThermostat {
    pub fn new(target_temperature: f64, min_model_temperature: f64) -> Self {
        IsokineticThermostat {
            target_temperature,
            min_model_temperature,
        }
    }

    /// Rescales the ensemble and returns the temperature measured before the
    /// rescale.
    pub fn adjust_temperature(&self, data: &mut MoleculeDataSet) -> f64 {
        let measured_temperature = data.measured_temperature();

        /*
        lambda = sqrt(T_target / T_current)

        At or below the floor everything is frozen in place. A motionless
        ensemble above the floor has nothing to scale, it stays as it is.
         */
        let lambda = if self.target_temperature <= self.min_model_temperature {
            0.0
        } else if measured_temperature == 0.0 {
            return measured_temperature;
        } else {
            (self.target_temperature / measured_temperature).sqrt()
        };

        let number_of_molecules = data.number_of_molecules();
        for velocity in &mut data.molecule_velocities[..number_of_molecules] {
            *velocity *= lambda;
        }
        for rate in &mut data.molecule_rotation_rates[..number_of_molecules] {
            *rate *= lambda;
        }

        log::trace!(
            "Isokinetic rescale: measured {measured_temperature:.4}, target {:.4}, lambda {lambda:.4}",
            self.target_temperature
        );
        measured_temperature
    }
}
