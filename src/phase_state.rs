/*
One-shot placement of every molecule into a solid, liquid or gas arrangement.

    solid  : hexagonal lattice, rows offset by half a spacing, centred
             horizontally and resting on the floor
    liquid : concentric rings around a point a quarter of the way up
    gas    : uniform random positions with rejection of close neighbours

Placement is followed by a phase dependent number of settling sub-steps, each
one followed by an isokinetic rescale at the new set point. The molecule count
never changes here; only the state of the existing molecules is rewritten.

Liquid ring angles and the gas fallback of accepting the last candidate are
tuned by eye.
 */
pub mod diatomic;
pub mod monatomic;
pub mod water;

use std::f64::consts::PI;

use nalgebra::Vector2;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::constants::{LIQUID_SPACING_FACTOR, MAX_PLACEMENT_ATTEMPTS, MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE};
use crate::molecule::{AtomPositionUpdater, MoleculeDataSet};
use crate::thermostat_barostat::IsokineticThermostat;
use crate::verlet::{Container, StepEnvironment, StepOutcome, VerletAlgorithm};

pub use diatomic::DiatomicPhaseStateChanger;
pub use monatomic::MonatomicPhaseStateChanger;
pub use water::WaterPhaseStateChanger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Solid,
    Liquid,
    Gas,
}

impl Phase {
    /// Canonical set point for the phase, in model units.
    pub fn temperature(self, config: &SimulationConfig) -> f64 {
        match self {
            Phase::Solid => config.solid_temperature,
            Phase::Liquid => config.liquid_temperature,
            Phase::Gas => config.gas_temperature,
        }
    }

    /// Integrator sub-steps run after placement.
    pub fn settling_steps(self) -> usize {
        match self {
            Phase::Solid => 0,
            Phase::Liquid => 100,
            Phase::Gas => 20,
        }
    }
}

/// Arity specific knobs of the placement algorithms. The algorithms themselves
/// are provided methods shared by every variant.
pub trait PhaseStateChange {
    /// Closest two molecule centers may be placed.
    fn min_inter_molecule_distance(&self) -> f64;

    /// Rotation angle of a molecule sitting at (row, column) of the crystal.
    fn crystal_rotation_angle<R: Rng>(&self, row: usize, column: usize, rng: &mut R) -> f64;

    fn is_multi_atom(&self) -> bool {
        true
    }

    /// Gaussian velocities scaled by sqrt(T), plus random spin for molecules
    /// that can rotate.
    fn assign_thermal_motion<R: Rng>(&self, data: &mut MoleculeDataSet, temperature: f64, rng: &mut R) {
        let temperature_sqrt = temperature.sqrt();
        for i in 0..data.number_of_molecules() {
            let vx: f64 = rng.sample(StandardNormal);
            let vy: f64 = rng.sample(StandardNormal);
            data.molecule_velocities[i] = Vector2::new(vx, vy) * temperature_sqrt;
            data.molecule_rotation_rates[i] = if self.is_multi_atom() {
                let spin: f64 = rng.sample(StandardNormal);
                spin * temperature_sqrt
            } else {
                0.0
            };
        }
    }

    fn form_crystal<R: Rng>(&self, data: &mut MoleculeDataSet, container: &Container, temperature: f64, rng: &mut R) {
        self.assign_thermal_motion(data, temperature, rng);

        let number_of_molecules = data.number_of_molecules();
        if number_of_molecules == 0 {
            return;
        }
        let spacing = self.min_inter_molecule_distance();
        let row_spacing = spacing * 3f64.sqrt() / 2.0;
        let molecules_per_layer = ((number_of_molecules as f64).sqrt().floor() as usize).max(1);
        let crystal_width = (molecules_per_layer - 1) as f64 * spacing;
        let starting_x = container.width / 2.0 - crystal_width / 2.0;
        let starting_y = spacing;

        for i in 0..number_of_molecules {
            let row = i / molecules_per_layer;
            let column = i % molecules_per_layer;
            let mut x = starting_x + column as f64 * spacing;
            if row % 2 == 1 {
                x += spacing / 2.0;
            }
            let y = starting_y + row as f64 * row_spacing;
            data.molecule_center_of_mass_positions[i] = Vector2::new(x, y);
            data.molecule_rotation_angles[i] = self.crystal_rotation_angle(row, column, rng);
        }
    }

    fn form_liquid<R: Rng>(&self, data: &mut MoleculeDataSet, container: &Container, temperature: f64, rng: &mut R) {
        self.assign_thermal_motion(data, temperature, rng);

        let center = Vector2::new(container.width / 2.0, container.height / 4.0);
        let ring_spacing = self.min_inter_molecule_distance() * LIQUID_SPACING_FACTOR;
        let margin = MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE;
        let in_bounds = |p: &Vector2<f64>| {
            p.x > margin && p.x < container.width - margin && p.y > margin && p.y < container.height - margin
        };

        let mut current_layer = 0usize;
        let mut on_current_layer = 0usize;
        let mut fit_on_current_layer = 1usize;

        for i in 0..data.number_of_molecules() {
            let mut candidate = center;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let distance_from_center = current_layer as f64 * ring_spacing;
                let angle = on_current_layer as f64 / fit_on_current_layer as f64 * 2.0 * PI
                    + fit_on_current_layer as f64 / (4.0 * PI);
                candidate = center + Vector2::new(angle.cos(), angle.sin()) * distance_from_center;

                on_current_layer += 1;
                if on_current_layer >= fit_on_current_layer {
                    current_layer += 1;
                    fit_on_current_layer =
                        ((current_layer as f64 * 2.0 * PI / LIQUID_SPACING_FACTOR).floor() as usize).max(1);
                    on_current_layer = 0;
                }

                if in_bounds(&candidate) {
                    break;
                }
            }
            if !in_bounds(&candidate) {
                candidate = clamp_inside(candidate, container, margin);
            }
            data.molecule_center_of_mass_positions[i] = candidate;
            data.molecule_rotation_angles[i] = rng.random::<f64>() * 2.0 * PI;
        }
    }

    fn form_gas<R: Rng>(&self, data: &mut MoleculeDataSet, container: &Container, temperature: f64, rng: &mut R) {
        self.assign_thermal_motion(data, temperature, rng);

        let margin = MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE;
        let range = Vector2::new(container.width - 2.0 * margin, container.height - 2.0 * margin);
        let min_distance_sqrd = self.min_inter_molecule_distance().powi(2);

        for i in 0..data.number_of_molecules() {
            let mut candidate = Vector2::new(margin, margin);
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                candidate = Vector2::new(
                    margin + rng.random::<f64>() * range.x,
                    margin + rng.random::<f64>() * range.y,
                );
                let too_close = data.molecule_center_of_mass_positions[..i]
                    .iter()
                    .any(|placed| (candidate - placed).norm_squared() < min_distance_sqrd);
                if !too_close {
                    break;
                }
            }
            // after the last attempt the candidate is taken as is
            data.molecule_center_of_mass_positions[i] = candidate;
            data.molecule_rotation_angles[i] = rng.random::<f64>() * 2.0 * PI;
        }
    }
}

fn clamp_inside(position: Vector2<f64>, container: &Container, margin: f64) -> Vector2<f64> {
    let x_max = (container.width - margin).max(margin);
    let y_max = (container.height - margin).max(margin);
    Vector2::new(position.x.clamp(margin, x_max), position.y.clamp(margin, y_max))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStateChanger {
    Monatomic(MonatomicPhaseStateChanger),
    Diatomic(DiatomicPhaseStateChanger),
    Water(WaterPhaseStateChanger),
}

/// Everything placement needs besides the ensemble itself.
pub struct PhaseChangeContext<'a, R: Rng> {
    pub verlet: &'a mut VerletAlgorithm,
    pub container: &'a mut Container,
    pub gravitational_acceleration: f64,
    pub config: &'a SimulationConfig,
    pub rng: &'a mut R,
}

impl PhaseStateChanger {
    pub fn for_position_updater(updater: AtomPositionUpdater) -> Self {
        match updater {
            AtomPositionUpdater::Monatomic => PhaseStateChanger::Monatomic(MonatomicPhaseStateChanger),
            AtomPositionUpdater::Diatomic => PhaseStateChanger::Diatomic(DiatomicPhaseStateChanger),
            AtomPositionUpdater::Water => PhaseStateChanger::Water(WaterPhaseStateChanger),
        }
    }

    /// Rearranges the ensemble into `phase` and settles it. Returns the new
    /// temperature set point together with anything the settling steps changed.
    pub fn set_phase<R: Rng>(
        &self,
        phase: Phase,
        data: &mut MoleculeDataSet,
        ctx: PhaseChangeContext<'_, R>,
    ) -> (f64, StepOutcome) {
        let temperature = phase.temperature(ctx.config);
        match self {
            PhaseStateChanger::Monatomic(c) => place(c, phase, data, ctx.container, temperature, ctx.rng),
            PhaseStateChanger::Diatomic(c) => place(c, phase, data, ctx.container, temperature, ctx.rng),
            PhaseStateChanger::Water(c) => place(c, phase, data, ctx.container, temperature, ctx.rng),
        }

        let number_of_molecules = data.number_of_molecules();
        data.set_number_of_safe_molecules(number_of_molecules);
        data.sync_atom_positions();
        data.clear_forces();

        let env = StepEnvironment {
            gravitational_acceleration: ctx.gravitational_acceleration,
            temperature_set_point: temperature,
        };
        let thermostat = IsokineticThermostat::new(temperature, ctx.config.min_temperature);
        let mut outcome = StepOutcome::default();
        for _ in 0..phase.settling_steps() {
            outcome.merge(ctx.verlet.update_forces_and_motion(data, ctx.container, &env, ctx.config));
            thermostat.adjust_temperature(data);
        }

        log::info!("Placed {number_of_molecules} molecules as {phase:?} at set point {temperature}");
        (temperature, outcome)
    }
}

fn place<C: PhaseStateChange, R: Rng>(
    changer: &C,
    phase: Phase,
    data: &mut MoleculeDataSet,
    container: &Container,
    temperature: f64,
    rng: &mut R,
) {
    match phase {
        Phase::Solid => changer.form_crystal(data, container, temperature, rng),
        Phase::Liquid => changer.form_liquid(data, container, temperature, rng),
        Phase::Gas => changer.form_gas(data, container, temperature, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn filled(updater: AtomPositionUpdater, count: usize) -> MoleculeDataSet {
        let mut data = MoleculeDataSet::new(updater, 500);
        for _ in 0..count {
            data.add_molecule(Vector2::zeros(), Vector2::zeros(), 0.0, 0.0, false);
        }
        data
    }

    fn run(updater: AtomPositionUpdater, phase: Phase, data: &mut MoleculeDataSet, seed: u64) -> f64 {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut verlet = VerletAlgorithm::for_position_updater(updater);
        let mut container = Container::new(10000.0 / 308.0, 10000.0 / 308.0);
        let changer = PhaseStateChanger::for_position_updater(updater);
        let (set_point, _) = changer.set_phase(
            phase,
            data,
            PhaseChangeContext {
                verlet: &mut verlet,
                container: &mut container,
                gravitational_acceleration: 0.0,
                config: &config,
                rng: &mut rng,
            },
        );
        set_point
    }

    #[test]
    fn atoms_follow_placed_molecules() {
        for updater in [
            AtomPositionUpdater::Monatomic,
            AtomPositionUpdater::Diatomic,
            AtomPositionUpdater::Water,
        ] {
            for phase in [Phase::Solid, Phase::Liquid, Phase::Gas] {
                let mut data = filled(updater, 30);
                run(updater, phase, &mut data, 9);
                let apm = data.atoms_per_molecule();
                let mut expected = vec![Vector2::zeros(); apm];
                for i in 0..data.number_of_molecules() {
                    updater.place_atoms(
                        data.center_of_mass_positions()[i],
                        data.rotation_angles()[i],
                        &mut expected,
                    );
                    for k in 0..apm {
                        assert_relative_eq!(data.atom_positions()[i * apm + k], expected[k], epsilon = 1e-12);
                    }
                }
                assert_eq!(data.number_of_safe_molecules(), 30);
            }
        }
    }

    #[test]
    fn solid_twice_is_stable() {
        let mut data = filled(AtomPositionUpdater::Monatomic, 100);
        let first = run(AtomPositionUpdater::Monatomic, Phase::Solid, &mut data, 1);
        let second = run(AtomPositionUpdater::Monatomic, Phase::Solid, &mut data, 2);
        assert_eq!(first, second);
        assert_eq!(data.number_of_molecules(), 100);
    }

    #[test]
    fn crystal_is_hexagonal_and_centred() {
        let mut data = filled(AtomPositionUpdater::Monatomic, 100);
        run(AtomPositionUpdater::Monatomic, Phase::Solid, &mut data, 4);
        let positions = data.center_of_mass_positions();
        let spacing = MonatomicPhaseStateChanger.min_inter_molecule_distance();
        assert_relative_eq!(positions[1].x - positions[0].x, spacing, epsilon = 1e-12);
        // second row sits half a spacing over
        assert_relative_eq!(positions[10].x - positions[0].x, spacing / 2.0, epsilon = 1e-12);
        let width = 10000.0 / 308.0;
        let row_centre = (positions[0].x + positions[9].x) / 2.0;
        assert_relative_eq!(row_centre, width / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn gas_stays_inside_margins() {
        let mut data = filled(AtomPositionUpdater::Diatomic, 50);
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let container = Container::new(30.0, 30.0);
        DiatomicPhaseStateChanger.form_gas(&mut data, &container, config.gas_temperature, &mut rng);
        for p in data.center_of_mass_positions() {
            assert!(p.x >= MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE && p.x <= 30.0 - MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE);
            assert!(p.y >= MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE && p.y <= 30.0 - MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE);
        }
    }

    #[test]
    fn crowded_gas_keeps_every_molecule_inside() {
        let mut data = filled(AtomPositionUpdater::Diatomic, 60);
        let mut rng = StdRng::seed_from_u64(7);
        let container = Container::new(8.0, 8.0);
        DiatomicPhaseStateChanger.form_gas(&mut data, &container, 1.0, &mut rng);
        assert_eq!(data.number_of_molecules(), 60);
        let (low, high) = (MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE, 8.0 - MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE);
        for p in data.center_of_mass_positions() {
            assert!(p.x >= low && p.x <= high, "x {}", p.x);
            assert!(p.y >= low && p.y <= high, "y {}", p.y);
        }
    }

    #[test]
    fn liquid_outside_the_margins_is_clamped_in() {
        // the ring centre itself (4, 2) is below the floor margin
        let mut data = filled(AtomPositionUpdater::Monatomic, 20);
        let mut rng = StdRng::seed_from_u64(8);
        let container = Container::new(8.0, 8.0);
        MonatomicPhaseStateChanger.form_liquid(&mut data, &container, 0.34, &mut rng);
        assert_eq!(data.number_of_molecules(), 20);
        let (low, high) = (MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE, 8.0 - MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE);
        for p in data.center_of_mass_positions() {
            assert!(p.x >= low && p.x <= high, "x {}", p.x);
            assert!(p.y >= low && p.y <= high, "y {}", p.y);
        }
    }

    #[test]
    fn liquid_clusters_around_lower_centre() {
        let mut data = filled(AtomPositionUpdater::Monatomic, 40);
        let mut rng = StdRng::seed_from_u64(6);
        let container = Container::new(32.0, 32.0);
        MonatomicPhaseStateChanger.form_liquid(&mut data, &container, 0.34, &mut rng);
        assert_eq!(data.center_of_mass_positions()[0], Vector2::new(16.0, 8.0));
        for p in data.center_of_mass_positions() {
            assert!((p - Vector2::new(16.0, 8.0)).norm() < 6.0);
        }
    }
}
