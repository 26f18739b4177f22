//! ----------------------
//! States of matter demo
//! ----------------------
//!
//! Usage: states_md [config.json]
//!

/*

Runs a scripted session against the simulation model, the way a user would
drive it from the controls:

    solid neon -> heat until it boils -> pump in molecules -> squeeze the lid
    -> (usually) explode -> put the lid back -> switch to water and freeze it

and prints a JSON snapshot of the final state.
*/

use std::env;
use std::process;

use kdam::tqdm;
use states_md::{MoleculeType, Phase, SimulationConfig, SimulationError, SimulationModel};

const FRAMES_PER_STAGE: usize = 300;

fn run(config: SimulationConfig) -> Result<(), SimulationError> {
    let mut model = SimulationModel::new(config)?;
    log::info!(
        "Starting with {} {:?} molecules",
        model.number_of_molecules(),
        model.molecule_type()
    );

    // heat the solid
    model.set_heating_cooling_amount(1.0);
    for _ in tqdm!(0..FRAMES_PER_STAGE) {
        model.step();
    }
    model.set_heating_cooling_amount(0.0);
    println!(
        "After heating: {:.1} K, {:.3} atm",
        model.temperature_in_kelvin(),
        model.pressure_in_atmospheres()
    );

    // inject until full or the stage runs out
    let mut injected = 0;
    for frame in tqdm!(0..FRAMES_PER_STAGE) {
        if frame % 5 == 0 {
            match model.inject_molecule() {
                Ok(()) => injected += 1,
                Err(SimulationError::CapacityExhausted { capacity }) => {
                    log::info!("Container full at {capacity} molecules");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        model.step();
    }
    println!("Injected {injected} molecules, {} in total", model.number_of_molecules());

    // push the lid down and keep heating
    model.set_heating_cooling_amount(1.0);
    let initial_height = model.config().container_initial_height;
    for frame in tqdm!(0..FRAMES_PER_STAGE) {
        let fraction = 1.0 - 0.7 * frame as f64 / FRAMES_PER_STAGE as f64;
        model.set_container_height(initial_height * fraction);
        let report = model.step();
        if report.explosion_occurred {
            println!("Lid blew off at {:.3} atm", model.pressure_in_atmospheres());
            break;
        }
    }
    model.set_heating_cooling_amount(0.0);

    if model.is_exploded() {
        for _ in tqdm!(0..FRAMES_PER_STAGE / 3) {
            model.step();
        }
        model.return_lid();
        println!("Lid back on, {} molecules left", model.number_of_molecules());
    }

    // water, then freeze it
    model.set_molecule_type(MoleculeType::Water)?;
    model.set_phase(Phase::Liquid);
    model.set_heating_cooling_amount(-1.0);
    for _ in tqdm!(0..FRAMES_PER_STAGE) {
        model.step();
    }
    println!(
        "Water cooled to {:.1} K with {} molecules",
        model.temperature_in_kelvin(),
        model.number_of_molecules()
    );

    match serde_json::to_string_pretty(&model.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::warn!("Could not serialize snapshot: {err}"),
    }
    Ok(())
}

fn main() {
    let config = match env::args().nth(1) {
        Some(path) => match SimulationConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    if let Err(e) = run(config) {
        eprintln!("Simulation failed: {}", e);
        process::exit(1);
    }
}
