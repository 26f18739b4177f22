use rand::Rng;
use rand_distr::StandardNormal;

use crate::molecule::MoleculeDataSet;

/// Memory of the previous velocity kept by each collision.
pub const ANDERSEN_GAMMA: f64 = 0.9999;

/// Stochastic thermostat: each velocity component and rotation rate keeps a
/// fraction `gamma` of its value and picks up Gaussian noise sized so that the
/// ensemble relaxes towards the target temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AndersenThermostat {
    pub target_temperature: f64,
    pub min_model_temperature: f64,
    pub gamma: f64,
}

impl AndersenThermostat {
    pub fn new(target_temperature: f64, min_model_temperature: f64) -> Self {
        AndersenThermostat {
            target_temperature,
            min_model_temperature,
            gamma: ANDERSEN_GAMMA,
        }
    }

    pub fn adjust_temperature<R: Rng>(&self, data: &mut MoleculeDataSet, rng: &mut R) {
        let number_of_molecules = data.number_of_molecules();

        if self.target_temperature <= self.min_model_temperature {
            data.molecule_velocities[..number_of_molecules].fill(nalgebra::Vector2::zeros());
            data.molecule_rotation_rates[..number_of_molecules].fill(0.0);
            return;
        }

        /*
        v <- gamma * v + N(0, 1) * sqrt(T * (1 - gamma^2) / m)

        Same update for the rotation rate with the rotational inertia in place
        of the mass.
         */
        let noise_weight = self.target_temperature * (1.0 - self.gamma * self.gamma);
        let velocity_scaling = (noise_weight / data.molecule_mass()).sqrt();
        let inertia = data.molecule_rotational_inertia();
        let rotation_scaling = if inertia > 0.0 {
            (noise_weight / inertia).sqrt()
        } else {
            0.0
        };

        for i in 0..number_of_molecules {
            let vx: f64 = rng.sample(StandardNormal);
            let vy: f64 = rng.sample(StandardNormal);
            let velocity = &mut data.molecule_velocities[i];
            velocity.x = self.gamma * velocity.x + vx * velocity_scaling;
            velocity.y = self.gamma * velocity.y + vy * velocity_scaling;

            if inertia > 0.0 {
                let w: f64 = rng.sample(StandardNormal);
                data.molecule_rotation_rates[i] =
                    self.gamma * data.molecule_rotation_rates[i] + w * rotation_scaling;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::AtomPositionUpdater;
    use nalgebra::Vector2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ensemble(velocity: f64) -> MoleculeDataSet {
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Diatomic, 400);
        for i in 0..200 {
            let angle = i as f64;
            data.add_molecule(
                Vector2::new(i as f64, 0.0),
                Vector2::new(velocity * angle.cos(), velocity * angle.sin()),
                0.0,
                0.0,
                true,
            );
        }
        data
    }

    #[test]
    fn relaxes_towards_target() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut data = ensemble(0.0);
        let thermostat = AndersenThermostat::new(0.5, 1e-5);
        for _ in 0..30_000 {
            thermostat.adjust_temperature(&mut data, &mut rng);
        }
        let measured = data.measured_temperature();
        assert!((measured - 0.5).abs() < 0.1, "measured {measured}");
    }

    #[test]
    fn floor_target_zeroes_motion() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut data = ensemble(1.0);
        AndersenThermostat::new(0.0, 1e-5).adjust_temperature(&mut data, &mut rng);
        assert!(data.velocities().iter().all(|v| *v == Vector2::zeros()));
        assert!(data.rotation_rates().iter().all(|w| *w == 0.0));
    }
}
