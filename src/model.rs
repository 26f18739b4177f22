/*
The simulation model owns the ensemble and everything that acts on it.

Each molecule type picks a matching integrator and phase state changer when
it is selected; both are swapped out together with a freshly sized ensemble.
The view layer only talks to this type:

    inputs  : molecule type, phase, molecule count, heating/cooling, gravity,
              container height, adjustable sigma/epsilon, inject, return lid, reset
    outputs : temperature, pressure, exploded flag, atoms, type and phase

A frame (`step`) runs the heating schedule, a fixed number of Verlet
sub-steps and one thermostat pass, and reports what changed.

Lengths cross the boundary in picometers and are divided by the particle
diameter (sigma) on the way in.
 */
use std::f64::consts::PI;

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::constants::{
    INJECTION_POINT_VERT_PROPORTION, INJECTION_WALL_MARGIN, LOW_TEMPERATURE_COOLING_FACTOR,
};
use crate::error::{Result, SimulationError};
use crate::lj_parameters::LjPotentialCalculator;
use crate::molecule::{Atom, AtomPositionUpdater, MoleculeDataSet, MoleculeType};
use crate::phase_state::{Phase, PhaseChangeContext, PhaseStateChanger};
use crate::thermostat_barostat::apply_thermostat;
use crate::units;
use crate::verlet::{Container, StepEnvironment, StepOutcome, VerletAlgorithm};

/// What one frame changed. Replaces change listeners: the caller inspects the
/// flags it cares about after every `step`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub temperature: f64,
    pub pressure: f64,
    pub temperature_set_point: f64,
    pub temperature_set_point_changed: bool,
    pub exploded: bool,
    pub explosion_occurred: bool,
    pub number_of_molecules: usize,
    pub newly_safe_molecules: usize,
}

/// Everything the view reads between frames.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub molecule_type: MoleculeType,
    pub phase: Phase,
    pub temperature: f64,
    pub temperature_in_kelvin: f64,
    pub pressure: f64,
    pub pressure_in_atmospheres: f64,
    pub exploded: bool,
    pub container_height: f64,
    pub atoms: Vec<Atom>,
}

pub struct SimulationModel {
    config: SimulationConfig,
    rng: StdRng,

    molecule_type: MoleculeType,
    phase: Phase,
    lj_calculator: LjPotentialCalculator,

    data: MoleculeDataSet,
    verlet: VerletAlgorithm,
    phase_state_changer: PhaseStateChanger,

    container: Container,
    container_height: f64, // picometers

    gravitational_acceleration: f64,
    heating_cooling_amount: f64,
    temperature_set_point: f64,
    // set point as of the last report, catches changes made between frames
    last_reported_set_point: f64,
    ticks_since_temperature_adjustment: usize,
    pending_outcome: StepOutcome,
}

impl SimulationModel {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let molecule_type = MoleculeType::DEFAULT;
        let lj_calculator =
            LjPotentialCalculator::new(molecule_type.default_sigma(), molecule_type.default_epsilon())?;
        let updater = AtomPositionUpdater::for_atoms_per_molecule(molecule_type.atoms_per_molecule());
        let sigma = lj_calculator.sigma();

        let mut model = SimulationModel {
            rng,
            molecule_type,
            phase: Phase::Solid,
            lj_calculator,
            data: MoleculeDataSet::new(updater, config.max_num_atoms),
            verlet: VerletAlgorithm::for_position_updater(updater),
            phase_state_changer: PhaseStateChanger::for_position_updater(updater),
            container: Container::new(
                config.container_width / sigma,
                config.container_initial_height / sigma,
            ),
            container_height: config.container_initial_height,
            gravitational_acceleration: config.initial_gravitational_accel,
            heating_cooling_amount: 0.0,
            temperature_set_point: config.solid_temperature,
            last_reported_set_point: config.solid_temperature,
            ticks_since_temperature_adjustment: 0,
            pending_outcome: StepOutcome::default(),
            config,
        };
        model.initialize_molecule_type(molecule_type)?;
        model.last_reported_set_point = model.temperature_set_point;
        Ok(model)
    }

    /*
    Builds the ensemble, integrator and phase state changer for a molecule type
    and lays the default number of molecules out as a solid.
     */
    fn initialize_molecule_type(&mut self, molecule_type: MoleculeType) -> Result<()> {
        self.lj_calculator =
            LjPotentialCalculator::new(molecule_type.default_sigma(), molecule_type.default_epsilon())?;
        let updater = AtomPositionUpdater::for_atoms_per_molecule(molecule_type.atoms_per_molecule());

        self.molecule_type = molecule_type;
        self.data = MoleculeDataSet::new(updater, self.config.max_num_atoms);
        self.verlet = VerletAlgorithm::for_position_updater(updater);
        self.phase_state_changer = PhaseStateChanger::for_position_updater(updater);
        if molecule_type == MoleculeType::Adjustable {
            self.verlet.set_scaled_epsilon(self.scaled_epsilon());
        }
        self.normalize_container();

        let number_of_molecules = molecule_type
            .initial_number_of_molecules(
                self.lj_calculator.sigma(),
                self.config.container_width,
                self.config.max_num_atoms,
            )
            .min(self.data.max_molecules());
        self.add_placeholder_molecules(number_of_molecules);
        self.set_phase(Phase::Solid);
        Ok(())
    }

    /// Container size in model units follows the particle diameter.
    fn normalize_container(&mut self) {
        let sigma = self.lj_calculator.sigma();
        self.container.width = self.config.container_width / sigma;
        self.container.initial_height = self.config.container_initial_height / sigma;
        self.container.height = self.container_height / sigma;
    }

    fn add_placeholder_molecules(&mut self, count: usize) {
        for _ in 0..count {
            if !self
                .data
                .add_molecule(Vector2::zeros(), Vector2::zeros(), 0.0, 0.0, false)
            {
                break;
            }
        }
    }

    /// Interaction strength handed to the monatomic integrator, 1 at half the
    /// maximum epsilon.
    fn scaled_epsilon(&self) -> f64 {
        self.lj_calculator.epsilon() / (self.config.max_epsilon / 2.0)
    }

    // -- inputs

    pub fn set_molecule_type(&mut self, molecule_type: MoleculeType) -> Result<()> {
        if !molecule_type.is_supported() {
            log::warn!("Molecule type {molecule_type:?} is not supported, keeping {:?}", self.molecule_type);
            return Err(SimulationError::UnsupportedMoleculeType { molecule_type });
        }
        log::info!("Molecule type changed from {:?} to {molecule_type:?}", self.molecule_type);
        self.initialize_molecule_type(molecule_type)
    }

    pub fn set_phase(&mut self, phase: Phase) {
        let (set_point, outcome) = self.phase_state_changer.set_phase(
            phase,
            &mut self.data,
            PhaseChangeContext {
                verlet: &mut self.verlet,
                container: &mut self.container,
                gravitational_acceleration: self.gravitational_acceleration,
                config: &self.config,
                rng: &mut self.rng,
            },
        );
        self.phase = phase;
        self.temperature_set_point = set_point;
        self.pending_outcome.merge(outcome);
    }

    /// Grows or shrinks the ensemble. Growing re-applies the current phase so
    /// the new molecules get a proper place.
    pub fn set_target_molecule_count(&mut self, target: usize) {
        let max_molecules = self.data.max_molecules();
        if target > max_molecules {
            log::warn!("Molecule count {target} clamped to capacity {max_molecules}");
        }
        let target = target.min(max_molecules);
        let current = self.data.number_of_molecules();

        if target < current {
            for index in (target..current).rev() {
                self.data.remove_molecule(index);
            }
            log::info!("Removed {} molecules", current - target);
        } else if target > current {
            self.add_placeholder_molecules(target - current);
            self.set_phase(self.phase);
            log::info!("Added {} molecules", target - current);
        }
    }

    pub fn set_heating_cooling_amount(&mut self, amount: f64) {
        if !amount.is_finite() {
            log::warn!("Ignoring non-finite heating/cooling amount {amount}");
            return;
        }
        if !(-1.0..=1.0).contains(&amount) {
            log::warn!("Heating/cooling amount {amount} clamped to [-1, 1]");
        }
        self.heating_cooling_amount = amount.clamp(-1.0, 1.0);
    }

    pub fn set_gravitational_acceleration(&mut self, acceleration: f64) {
        if !acceleration.is_finite() {
            log::warn!("Ignoring non-finite gravitational acceleration {acceleration}");
            return;
        }
        let max = self.config.max_gravitational_accel;
        if !(0.0..=max).contains(&acceleration) {
            log::warn!("Gravitational acceleration {acceleration} clamped to [0, {max}]");
        }
        self.gravitational_acceleration = acceleration.clamp(0.0, max);
    }

    /// Moves the lid, in picometers. Ignored once the lid is gone.
    pub fn set_container_height(&mut self, height: f64) {
        if self.container.is_exploded() {
            log::warn!("Container has exploded, ignoring height change");
            return;
        }
        if !height.is_finite() {
            log::warn!("Ignoring non-finite container height {height}");
            return;
        }
        let min = self.config.min_container_height;
        let max = self.config.container_initial_height;
        if !(height > min && height <= max) {
            log::warn!("Container height {height} clamped to [{min}, {max}]");
        }
        self.container_height = height.clamp(min, max);
        self.container.height = self.container_height / self.lj_calculator.sigma();
    }

    /// Particle diameter of the adjustable atom, in picometers.
    pub fn set_sigma(&mut self, sigma: f64) {
        if self.molecule_type != MoleculeType::Adjustable {
            log::warn!("Sigma can only be changed for the adjustable atom");
            return;
        }
        let clamped = sigma.clamp(self.config.min_sigma, self.config.max_sigma);
        if clamped != sigma {
            log::warn!("Sigma {sigma} clamped to {clamped}");
        }
        if let Err(err) = self.lj_calculator.set_sigma(clamped) {
            log::warn!("{err}");
            return;
        }
        self.normalize_container();
        self.set_phase(self.phase);
    }

    /// Interaction strength of the adjustable atom, in Kelvin.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        if self.molecule_type != MoleculeType::Adjustable {
            log::warn!("Epsilon can only be changed for the adjustable atom");
            return;
        }
        let clamped = epsilon.clamp(self.config.min_epsilon, self.config.max_epsilon);
        if clamped != epsilon {
            log::warn!("Epsilon {epsilon} clamped to {clamped}");
        }
        if let Err(err) = self.lj_calculator.set_epsilon(clamped) {
            log::warn!("{err}");
            return;
        }
        self.verlet.set_scaled_epsilon(self.scaled_epsilon());
    }

    /// Shoots one molecule in from the right wall. It stays unsafe until it has
    /// moved clear of the others.
    pub fn inject_molecule(&mut self) -> Result<()> {
        if self.data.remaining_slots() == 0 {
            log::debug!("Injection refused, ensemble is full");
            return Err(SimulationError::CapacityExhausted {
                capacity: self.data.max_molecules(),
            });
        }

        let position = Vector2::new(
            self.container.width - INJECTION_WALL_MARGIN,
            self.container.height * INJECTION_POINT_VERT_PROPORTION,
        );
        let angle = PI + (self.rng.random::<f64>() - 0.5) * self.config.max_injected_molecule_angle;
        let speed = self.config.min_injected_molecule_speed
            + self.rng.random::<f64>()
                * (self.config.max_injected_molecule_speed - self.config.min_injected_molecule_speed);
        let velocity = Vector2::new(angle.cos(), angle.sin()) * speed;
        let (rotation_angle, rotation_rate) = if self.data.atoms_per_molecule() > 1 {
            (
                self.rng.random::<f64>() * 2.0 * PI,
                (self.rng.random::<f64>() - 0.5) * PI,
            )
        } else {
            (0.0, 0.0)
        };

        if !self
            .data
            .add_molecule(position, velocity, rotation_angle, rotation_rate, false)
        {
            return Err(SimulationError::CapacityExhausted {
                capacity: self.data.max_molecules(),
            });
        }
        log::debug!(
            "Injected molecule at ({:.2}, {:.2}), {} molecules now",
            position.x,
            position.y,
            self.data.number_of_molecules()
        );
        Ok(())
    }

    /// Puts the lid back on an exploded container and drops every molecule that
    /// escaped.
    pub fn return_lid(&mut self) {
        if !self.container.is_exploded() {
            log::warn!("Lid is already on the container");
            return;
        }

        let width = self.container.width;
        let initial_height = self.container.initial_height;
        let before = self.data.number_of_molecules();
        for index in (0..before).rev() {
            let p = self.data.center_of_mass_positions()[index];
            if p.x < 0.0 || p.x > width || p.y < 0.0 || p.y > initial_height {
                self.data.remove_molecule(index);
            }
        }

        self.container.restore();
        self.container_height = self.config.container_initial_height;
        log::info!(
            "Lid returned, {} of {before} molecules remain",
            self.data.number_of_molecules()
        );

        if self.data.number_of_molecules() > 0 {
            self.set_phase(Phase::Gas);
        }
        self.verlet.reset_pressure();
        self.pending_outcome = StepOutcome::default();
    }

    pub fn reset(&mut self) -> Result<()> {
        log::info!("Resetting simulation");
        self.container.restore();
        self.container_height = self.config.container_initial_height;
        self.gravitational_acceleration = self.config.initial_gravitational_accel;
        self.heating_cooling_amount = 0.0;
        self.ticks_since_temperature_adjustment = 0;
        self.pending_outcome = StepOutcome::default();
        self.initialize_molecule_type(MoleculeType::DEFAULT)?;
        self.verlet.reset_pressure();
        Ok(())
    }

    // -- frame

    pub fn step(&mut self) -> StepReport {
        let previous_count = self.data.number_of_molecules();
        self.adjust_temperature_set_point();

        let env = StepEnvironment {
            gravitational_acceleration: self.gravitational_acceleration,
            temperature_set_point: self.temperature_set_point,
        };
        let mut outcome = std::mem::take(&mut self.pending_outcome);
        for _ in 0..self.config.verlet_calculations_per_frame {
            outcome.merge(self.verlet.update_forces_and_motion(
                &mut self.data,
                &mut self.container,
                &env,
                &self.config,
            ));
        }

        if !self.container.is_exploded() {
            apply_thermostat(
                self.config.thermostat,
                &mut self.data,
                self.heating_cooling_amount != 0.0,
                self.temperature_set_point,
                self.config.min_temperature,
                &mut self.rng,
            );
        }

        let report = StepReport {
            temperature: self.verlet.temperature(),
            pressure: self.verlet.pressure(),
            temperature_set_point: self.temperature_set_point,
            temperature_set_point_changed: self.temperature_set_point != self.last_reported_set_point,
            exploded: self.container.is_exploded(),
            explosion_occurred: outcome.explosion_occurred,
            number_of_molecules: self.data.number_of_molecules(),
            newly_safe_molecules: outcome.newly_safe_molecules,
        };
        self.last_reported_set_point = self.temperature_set_point;
        if report.number_of_molecules != previous_count {
            log::debug!("Molecule count changed from {previous_count} to {}", report.number_of_molecules);
        }
        log::debug!(
            "Frame: T = {:.4}, P = {:.4}, set point {:.4}, {} safe of {}",
            report.temperature,
            report.pressure,
            report.temperature_set_point,
            self.data.number_of_safe_molecules(),
            report.number_of_molecules
        );
        report
    }

    /*
    Heating and cooling nudge the set point every few frames. Close to absolute
    zero the linear step would overshoot, so cooling there decays geometrically.
     */
    fn adjust_temperature_set_point(&mut self) {
        if self.heating_cooling_amount == 0.0 {
            self.ticks_since_temperature_adjustment = 0;
            return;
        }
        self.ticks_since_temperature_adjustment += 1;
        if self.ticks_since_temperature_adjustment < self.config.ticks_per_temp_adjustment {
            return;
        }
        self.ticks_since_temperature_adjustment = 0;

        let step = self.heating_cooling_amount * self.config.max_temperature_change_per_adjustment;
        let mut set_point = self.temperature_set_point;
        if self.heating_cooling_amount < 0.0 && set_point < 0.9 * self.config.solid_temperature {
            set_point *= LOW_TEMPERATURE_COOLING_FACTOR;
        } else {
            set_point += step;
        }
        self.temperature_set_point = set_point.clamp(self.config.min_temperature, self.config.max_temperature);
    }

    // -- outputs

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn molecule_type(&self) -> MoleculeType {
        self.molecule_type
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn data_set(&self) -> &MoleculeDataSet {
        &self.data
    }

    pub fn lj_calculator(&self) -> &LjPotentialCalculator {
        &self.lj_calculator
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Lid height in picometers.
    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    pub fn gravitational_acceleration(&self) -> f64 {
        self.gravitational_acceleration
    }

    pub fn heating_cooling_amount(&self) -> f64 {
        self.heating_cooling_amount
    }

    pub fn temperature_set_point(&self) -> f64 {
        self.temperature_set_point
    }

    /// Measured temperature of the last sub-step, model units.
    pub fn temperature(&self) -> f64 {
        self.verlet.temperature()
    }

    pub fn temperature_in_kelvin(&self) -> f64 {
        units::model_temperature_to_kelvin(
            self.temperature(),
            self.molecule_type,
            self.lj_calculator.epsilon(),
        )
    }

    pub fn pressure(&self) -> f64 {
        self.verlet.pressure()
    }

    pub fn pressure_in_atmospheres(&self) -> f64 {
        units::model_pressure_to_atmospheres(self.pressure(), self.config.pressure_to_atmospheres)
    }

    pub fn potential_energy(&self) -> f64 {
        self.verlet.potential_energy()
    }

    pub fn is_exploded(&self) -> bool {
        self.container.is_exploded()
    }

    pub fn number_of_molecules(&self) -> usize {
        self.data.number_of_molecules()
    }

    /// One record per atom, positions in picometers.
    pub fn atoms(&self) -> Vec<Atom> {
        let sigma = self.lj_calculator.sigma();
        let apm = self.data.atoms_per_molecule();
        let atom_types = self.molecule_type.atom_types();
        let mass = self.data.molecule_mass();

        let mut atoms = Vec::with_capacity(self.data.number_of_atoms());
        for (i, (velocity, force)) in self
            .data
            .velocities()
            .iter()
            .zip(self.data.forces())
            .enumerate()
        {
            for (k, atom_type) in atom_types.iter().enumerate().take(apm) {
                let radius = if self.molecule_type == MoleculeType::Adjustable {
                    sigma / 2.0
                } else {
                    atom_type.default_radius()
                };
                let mut atom = Atom::new(*atom_type, radius);
                atom.position = self.data.atom_positions()[i * apm + k] * sigma;
                atom.velocity = *velocity;
                atom.acceleration = force / mass;
                atoms.push(atom);
            }
        }
        atoms
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            molecule_type: self.molecule_type,
            phase: self.phase,
            temperature: self.temperature(),
            temperature_in_kelvin: self.temperature_in_kelvin(),
            pressure: self.pressure(),
            pressure_in_atmospheres: self.pressure_in_atmospheres(),
            exploded: self.is_exploded(),
            container_height: self.container_height,
            atoms: self.atoms(),
        }
    }
}
