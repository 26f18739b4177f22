/*
Position Verlet integrators for the rigid-molecule ensemble.

One call to `update_forces_and_motion` is one sub-step of `time_step`:

    1. advance center of mass (and rotation) with the current force (and torque)
    2. re-derive atom positions
    3. wall forces, summed into the pressure zone
    4. gravity, boosted when the set point is very low
    5. smoothed pressure, which can blow the lid off
    6. promote injected molecules that have drifted clear of the others
    7. pair forces between safe molecules (variant specific)
    8. velocity half-step with the average of old and new forces
    9. temperature from kinetic energy, next forces become current

The variants only differ in step 7, which is what `InterMoleculeForces` covers;
the rest is shared and monomorphised per variant.
 */
pub mod diatomic;
pub mod monatomic;
pub mod water;

use nalgebra::Vector2;

use crate::config::SimulationConfig;
use crate::lj_parameters::{wall_force, wall_potential};
use crate::molecule::{AtomPositionUpdater, MoleculeDataSet};

pub use diatomic::DiatomicVerlet;
pub use monatomic::MonatomicVerlet;
pub use water::WaterVerlet;

/// Container geometry in model units (particle diameters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Container {
    pub width: f64,
    pub height: f64,
    pub initial_height: f64,
    exploded: bool,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Container {
            width,
            height,
            initial_height: height,
            exploded: false,
        }
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    /// Latches the exploded state. Returns true only on the transition.
    pub fn explode(&mut self) -> bool {
        if self.exploded {
            return false;
        }
        self.exploded = true;
        log::info!("Container exploded");
        true
    }

    /// Puts the lid back at its initial height.
    pub fn restore(&mut self) {
        self.exploded = false;
        self.height = self.initial_height;
    }

    /// Molecules whose center of mass lies in the bottom half feed the pressure.
    fn in_pressure_zone(&self, position: &Vector2<f64>) -> bool {
        position.y < self.height / 2.0
    }
}

/// Per-frame inputs the integrator reads but never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepEnvironment {
    pub gravitational_acceleration: f64,
    pub temperature_set_point: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerletState {
    pub pressure: f64,
    pub temperature: f64,
    pub potential_energy: f64,
}

impl VerletState {
    /// Exponentially smoothed pressure from this sub-step's wall force.
    /// Returns true if the update blew the lid off.
    pub fn update_pressure(
        &mut self,
        pressure_zone_wall_force: f64,
        container: &mut Container,
        config: &SimulationConfig,
    ) -> bool {
        let weighting = config.pressure_calc_weighting;
        let instantaneous = pressure_zone_wall_force / (container.width + container.height);
        self.pressure = (1.0 - weighting) * instantaneous + weighting * self.pressure;

        if self.pressure > config.explosion_pressure && !container.is_exploded() {
            log::debug!("Pressure {:.4} above explosion threshold", self.pressure);
            return container.explode();
        }
        false
    }
}

/// What a sub-step changed that the model has to react to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub explosion_occurred: bool,
    pub newly_safe_molecules: usize,
}

impl StepOutcome {
    pub fn merge(&mut self, other: StepOutcome) {
        self.explosion_occurred |= other.explosion_occurred;
        self.newly_safe_molecules += other.newly_safe_molecules;
    }
}

/// Pairwise interaction between safe molecules, the only part of the step
/// that differs between molecule arities.
pub trait InterMoleculeForces {
    /// Adds pair forces and torques into `next_molecule_forces` and
    /// `next_molecule_torques`. Returns the pair potential energy.
    fn accumulate_inter_molecule_forces(
        &mut self,
        data: &mut MoleculeDataSet,
        env: &StepEnvironment,
        config: &SimulationConfig,
    ) -> f64;

    fn state(&self) -> &VerletState;

    fn state_mut(&mut self) -> &mut VerletState;
}

#[derive(Clone, Debug)]
pub enum VerletAlgorithm {
    Monatomic(MonatomicVerlet),
    Diatomic(DiatomicVerlet),
    Water(WaterVerlet),
}

impl VerletAlgorithm {
    pub fn for_position_updater(updater: AtomPositionUpdater) -> Self {
        match updater {
            AtomPositionUpdater::Monatomic => VerletAlgorithm::Monatomic(MonatomicVerlet::default()),
            AtomPositionUpdater::Diatomic => VerletAlgorithm::Diatomic(DiatomicVerlet::default()),
            AtomPositionUpdater::Water => VerletAlgorithm::Water(WaterVerlet::default()),
        }
    }

    pub fn update_forces_and_motion(
        &mut self,
        data: &mut MoleculeDataSet,
        container: &mut Container,
        env: &StepEnvironment,
        config: &SimulationConfig,
    ) -> StepOutcome {
        match self {
            VerletAlgorithm::Monatomic(v) => advance(v, data, container, env, config),
            VerletAlgorithm::Diatomic(v) => advance(v, data, container, env, config),
            VerletAlgorithm::Water(v) => advance(v, data, container, env, config),
        }
    }

    fn state(&self) -> &VerletState {
        match self {
            VerletAlgorithm::Monatomic(v) => v.state(),
            VerletAlgorithm::Diatomic(v) => v.state(),
            VerletAlgorithm::Water(v) => v.state(),
        }
    }

    fn state_mut(&mut self) -> &mut VerletState {
        match self {
            VerletAlgorithm::Monatomic(v) => v.state_mut(),
            VerletAlgorithm::Diatomic(v) => v.state_mut(),
            VerletAlgorithm::Water(v) => v.state_mut(),
        }
    }

    pub fn pressure(&self) -> f64 {
        self.state().pressure
    }

    pub fn temperature(&self) -> f64 {
        self.state().temperature
    }

    pub fn potential_energy(&self) -> f64 {
        self.state().potential_energy
    }

    pub fn reset_pressure(&mut self) {
        self.state_mut().pressure = 0.0;
    }

    /// Only the monatomic integrator has a tunable interaction strength.
    pub fn set_scaled_epsilon(&mut self, scaled_epsilon: f64) {
        match self {
            VerletAlgorithm::Monatomic(v) => v.set_epsilon(scaled_epsilon),
            _ => log::warn!("Interaction strength is fixed for multi-atom molecules"),
        }
    }
}

fn advance<F: InterMoleculeForces>(
    forces: &mut F,
    data: &mut MoleculeDataSet,
    container: &mut Container,
    env: &StepEnvironment,
    config: &SimulationConfig,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let number_of_molecules = data.number_of_molecules();
    let dt = config.time_step;
    let mass = data.molecule_mass();
    let inertia = data.molecule_rotational_inertia();

    // 1. + 2.
    update_positions(data, dt);
    data.sync_atom_positions();

    // 3. + 4.
    let gravity = effective_gravity(env, config) * mass;
    let mut potential_energy = 0.0;
    let mut pressure_zone_wall_force = 0.0;
    for i in 0..number_of_molecules {
        let position = data.molecule_center_of_mass_positions[i];
        let (mut force, wall_energy) = calculate_wall_force(&position, container, config, &mut outcome);
        if container.in_pressure_zone(&position) {
            pressure_zone_wall_force += force.norm();
        }
        potential_energy += wall_energy;
        force.y -= gravity;
        data.next_molecule_forces[i] = force;
        data.next_molecule_torques[i] = 0.0;
    }

    // 5.
    if forces
        .state_mut()
        .update_pressure(pressure_zone_wall_force, container, config)
    {
        outcome.explosion_occurred = true;
    }

    // 6. + 7.
    outcome.newly_safe_molecules = update_molecule_safety(data, config);
    potential_energy += forces.accumulate_inter_molecule_forces(data, env, config);

    // 8. + 9.
    let mut kinetic_energy = 0.0;
    for i in 0..number_of_molecules {
        let average_force = data.molecule_forces[i] + data.next_molecule_forces[i];
        data.molecule_velocities[i] += average_force * (0.5 * dt / mass);
        kinetic_energy += 0.5 * mass * data.molecule_velocities[i].norm_squared();

        if inertia > 0.0 {
            let average_torque = data.molecule_torques[i] + data.next_molecule_torques[i];
            data.molecule_rotation_rates[i] += average_torque * 0.5 * dt / inertia;
            kinetic_energy += 0.5 * inertia * data.molecule_rotation_rates[i].powi(2);
        }

        data.molecule_forces[i] = data.next_molecule_forces[i];
        data.molecule_torques[i] = data.next_molecule_torques[i];
    }

    let state = forces.state_mut();
    state.potential_energy = potential_energy;
    state.temperature = if number_of_molecules > 0 {
        kinetic_energy / number_of_molecules as f64 / data.degrees_of_freedom_factor()
    } else {
        0.0
    };
    outcome
}

fn update_positions(data: &mut MoleculeDataSet, dt: f64) {
    let half_dt_sqrd = 0.5 * dt * dt;
    let mass = data.molecule_mass();
    let inertia = data.molecule_rotational_inertia();
    for i in 0..data.number_of_molecules() {
        let acceleration = data.molecule_forces[i] / mass;
        data.molecule_center_of_mass_positions[i] +=
            data.molecule_velocities[i] * dt + acceleration * half_dt_sqrd;

        if inertia > 0.0 {
            let angular_acceleration = data.molecule_torques[i] / inertia;
            data.molecule_rotation_angles[i] +=
                data.molecule_rotation_rates[i] * dt + angular_acceleration * half_dt_sqrd;
        }
    }
}

/// Gravity scaled up below a low set point, where the thermostat otherwise
/// slows falling molecules enough to leave them hanging in mid-air.
pub fn effective_gravity(env: &StepEnvironment, config: &SimulationConfig) -> f64 {
    let threshold = config.temperature_below_which_gravity_increases;
    if env.temperature_set_point < threshold {
        env.gravitational_acceleration
            * ((threshold - env.temperature_set_point) * config.low_temperature_gravity_increase_rate + 1.0)
    } else {
        env.gravitational_acceleration
    }
}

/// Soft LJ-style push away from each wall within reach. Returns the force and
/// the wall potential energy. A molecule found outside the left, right or
/// bottom wall of an intact container blows the lid off.
pub fn calculate_wall_force(
    position: &Vector2<f64>,
    container: &mut Container,
    config: &SimulationConfig,
    outcome: &mut StepOutcome,
) -> (Vector2<f64>, f64) {
    let threshold = config.wall_distance_threshold;
    let min_distance = threshold * 0.8;
    let mut force = Vector2::zeros();
    let mut potential_energy = 0.0;

    let mut wall_push = |distance: f64, container: &mut Container, outcome: &mut StepOutcome| -> Option<f64> {
        if distance >= threshold {
            return None;
        }
        if distance < 0.0 {
            if container.is_exploded() {
                return None;
            }
            outcome.explosion_occurred |= container.explode();
            return None;
        }
        let distance = distance.max(min_distance);
        potential_energy += wall_potential(distance);
        Some(wall_force(distance))
    };

    // side walls stop at the top of the container
    if position.y < container.height {
        if let Some(f) = wall_push(position.x, container, outcome) {
            force.x += f;
        } else if let Some(f) = wall_push(container.width - position.x, container, outcome) {
            force.x -= f;
        }
    }

    if let Some(f) = wall_push(position.y, container, outcome) {
        force.y += f;
    }

    if !container.is_exploded() {
        let distance_to_lid = container.height - position.y;
        if distance_to_lid < threshold {
            // the lid can be pushed down onto molecules, so it never explodes
            let distance = distance_to_lid.max(min_distance);
            potential_energy += wall_potential(distance);
            force.y -= wall_force(distance);
        }
    }

    (force, potential_energy)
}

/// Promotes unsafe molecules that are clear of every safe one by swapping them
/// into the first unsafe slot. Returns how many were promoted.
pub fn update_molecule_safety(data: &mut MoleculeDataSet, config: &SimulationConfig) -> usize {
    let number_of_molecules = data.number_of_molecules();
    let mut number_of_safe_molecules = data.number_of_safe_molecules();
    if number_of_molecules == number_of_safe_molecules {
        return 0;
    }

    let safe_distance_sqrd = config.safe_inter_molecule_distance.powi(2);
    let mut promoted = 0;
    for i in number_of_safe_molecules..number_of_molecules {
        let candidate = data.molecule_center_of_mass_positions[i];
        let is_clear = data.molecule_center_of_mass_positions[..number_of_safe_molecules]
            .iter()
            .all(|safe| (candidate - safe).norm_squared() >= safe_distance_sqrd);
        if is_clear {
            data.swap_molecules(i, number_of_safe_molecules);
            number_of_safe_molecules += 1;
            data.set_number_of_safe_molecules(number_of_safe_molecules);
            promoted += 1;
        }
    }
    if promoted > 0 {
        log::debug!("{promoted} molecule(s) promoted to safe");
    }
    promoted
}

/// Separation vector and clamped squared distance between two points.
/// Coincident points are treated as sitting at the minimum distance along the
/// diagonal so they get pushed apart.
#[inline]
pub(crate) fn separation(a: &Vector2<f64>, b: &Vector2<f64>, min_distance_sqrd: f64) -> (Vector2<f64>, f64) {
    let delta = a - b;
    let distance_sqrd = delta.norm_squared();
    if distance_sqrd == 0.0 {
        let offset = (min_distance_sqrd / 2.0).sqrt();
        return (Vector2::new(offset, offset), min_distance_sqrd);
    }
    (delta, distance_sqrd.max(min_distance_sqrd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn env() -> StepEnvironment {
        StepEnvironment {
            gravitational_acceleration: 0.0,
            temperature_set_point: 0.5,
        }
    }

    #[test]
    fn wall_force_pushes_inward() {
        let config = SimulationConfig::default();
        let mut container = Container::new(20.0, 20.0);
        let mut outcome = StepOutcome::default();

        let (left, _) = calculate_wall_force(&Vector2::new(1.0, 10.0), &mut container, &config, &mut outcome);
        assert!(left.x > 0.0);
        let (right, _) = calculate_wall_force(&Vector2::new(19.0, 10.0), &mut container, &config, &mut outcome);
        assert!(right.x < 0.0);
        let (top, _) = calculate_wall_force(&Vector2::new(10.0, 19.0), &mut container, &config, &mut outcome);
        assert!(top.y < 0.0);
        let (middle, energy) = calculate_wall_force(&Vector2::new(10.0, 10.0), &mut container, &config, &mut outcome);
        assert_eq!(middle, Vector2::zeros());
        assert_eq!(energy, 0.0);
        assert!(!outcome.explosion_occurred);
    }

    #[test]
    fn wall_penetration_explodes_once() {
        let config = SimulationConfig::default();
        let mut container = Container::new(20.0, 20.0);
        let mut outcome = StepOutcome::default();

        let (force, _) = calculate_wall_force(&Vector2::new(-0.5, 5.0), &mut container, &config, &mut outcome);
        assert!(container.is_exploded());
        assert!(outcome.explosion_occurred);
        assert_eq!(force.x, 0.0);

        let mut second = StepOutcome::default();
        calculate_wall_force(&Vector2::new(-0.5, 5.0), &mut container, &config, &mut second);
        assert!(!second.explosion_occurred);
    }

    #[test]
    fn exploded_container_has_no_lid() {
        let config = SimulationConfig::default();
        let mut container = Container::new(20.0, 20.0);
        container.explode();
        let mut outcome = StepOutcome::default();
        let (force, _) = calculate_wall_force(&Vector2::new(10.0, 19.5), &mut container, &config, &mut outcome);
        assert_eq!(force, Vector2::zeros());
    }

    #[test]
    fn gravity_grows_when_cold() {
        let config = SimulationConfig::default();
        let warm = StepEnvironment {
            gravitational_acceleration: 0.1,
            temperature_set_point: 0.5,
        };
        let cold = StepEnvironment {
            temperature_set_point: 0.0,
            ..warm
        };
        assert_relative_eq!(effective_gravity(&warm, &config), 0.1);
        assert_relative_eq!(effective_gravity(&cold, &config), 0.1 * 6.0, epsilon = 1e-12);
    }

    #[test]
    fn sustained_pressure_explodes_exactly_once() {
        let config = SimulationConfig::default();
        let mut container = Container::new(10.0, 10.0);
        let mut state = VerletState::default();
        let mut transitions = 0;
        for _ in 0..20_000 {
            if state.update_pressure(500.0, &mut container, &config) {
                transitions += 1;
            }
        }
        assert!(container.is_exploded());
        assert_eq!(transitions, 1);
    }

    #[test]
    fn pressure_is_exponentially_smoothed() {
        let config = SimulationConfig::default();
        let w = config.pressure_calc_weighting;
        let mut container = Container::new(20.0, 10.0);
        let mut state = VerletState {
            pressure: 0.2,
            ..VerletState::default()
        };
        state.update_pressure(6.0, &mut container, &config);
        assert_relative_eq!(state.pressure, (1.0 - w) * 6.0 / 30.0 + w * 0.2, epsilon = 1e-15);
        assert!(!container.is_exploded());
    }

    fn pressure_after_one_step(y: f64) -> f64 {
        let config = SimulationConfig::default();
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Monatomic, 10);
        data.add_molecule(Vector2::new(10.0, y), Vector2::zeros(), 0.0, 0.0, true);
        let mut container = Container::new(20.0, 20.0);
        let mut verlet = VerletAlgorithm::for_position_updater(AtomPositionUpdater::Monatomic);
        verlet.update_forces_and_motion(&mut data, &mut container, &env(), &config);
        verlet.pressure()
    }

    #[test]
    fn only_the_bottom_half_feeds_the_pressure() {
        // both sit one unit inside a wall, only the floor counts
        assert_eq!(pressure_after_one_step(19.0), 0.0);
        assert!(pressure_after_one_step(1.0) > 0.0);
    }

    #[test]
    fn isolated_injected_molecule_is_promoted() {
        let config = SimulationConfig::default();
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Monatomic, 10);
        data.add_molecule(Vector2::new(5.0, 5.0), Vector2::zeros(), 0.0, 0.0, true);
        data.add_molecule(Vector2::new(5.5, 5.0), Vector2::zeros(), 0.0, 0.0, false);
        data.add_molecule(Vector2::new(9.0, 5.0), Vector2::zeros(), 0.0, 0.0, false);

        assert_eq!(update_molecule_safety(&mut data, &config), 1);
        assert_eq!(data.number_of_safe_molecules(), 2);
        assert_eq!(data.center_of_mass_positions()[1], Vector2::new(9.0, 5.0));
        assert_eq!(data.center_of_mass_positions()[2], Vector2::new(5.5, 5.0));
    }

    #[test]
    fn tiny_container_never_produces_nan() {
        let config = SimulationConfig::default();
        for updater in [
            AtomPositionUpdater::Monatomic,
            AtomPositionUpdater::Diatomic,
            AtomPositionUpdater::Water,
        ] {
            let mut data = MoleculeDataSet::new(updater, 60);
            for i in 0..data.max_molecules() {
                let x = 1.0 + (i % 6) as f64 * 1.2;
                let y = 1.0 + (i / 6) as f64 * 1.2;
                data.add_molecule(Vector2::new(x, y), Vector2::new(0.3, -0.2), 0.1 * i as f64, 0.5, true);
            }
            let mut container = Container::new(10.0, 10.0);
            container.height = 0.01;
            let mut verlet = VerletAlgorithm::for_position_updater(updater);
            let env = StepEnvironment {
                gravitational_acceleration: 0.4,
                temperature_set_point: 0.05,
            };
            for _ in 0..100 {
                verlet.update_forces_and_motion(&mut data, &mut container, &env, &config);
            }
            for (p, v) in data.center_of_mass_positions().iter().zip(data.velocities()) {
                assert!(p.x.is_finite() && p.y.is_finite());
                assert!(v.x.is_finite() && v.y.is_finite());
            }
            assert!(data.rotation_rates().iter().all(|w| w.is_finite()));
            assert!(verlet.pressure().is_finite());
        }
    }

    #[test]
    fn free_molecule_moves_in_a_straight_line() {
        let config = SimulationConfig::default();
        let mut data = MoleculeDataSet::new(AtomPositionUpdater::Diatomic, 4);
        data.add_molecule(Vector2::new(10.0, 10.0), Vector2::new(1.0, 0.5), 0.0, 0.25, true);
        let mut container = Container::new(20.0, 20.0);
        let mut verlet = VerletAlgorithm::for_position_updater(AtomPositionUpdater::Diatomic);
        verlet.update_forces_and_motion(&mut data, &mut container, &env(), &config);

        let dt = config.time_step;
        assert_relative_eq!(data.center_of_mass_positions()[0], Vector2::new(10.0 + dt, 10.0 + 0.5 * dt), epsilon = 1e-12);
        assert_relative_eq!(data.rotation_angles()[0], 0.25 * dt, epsilon = 1e-12);
        assert_relative_eq!(
            verlet.temperature(),
            data.measured_temperature(),
            epsilon = 1e-12
        );
    }
}
