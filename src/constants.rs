// Model units: distances are in particle diameters, time and temperature are
// reduced Lennard-Jones units. Picometers and Kelvin only appear at the boundary.

// -- capacity and time stepping
pub const MAX_NUM_ATOMS: usize = 500;
pub const TIME_STEP: f64 = 0.020; // nominal Verlet sub-step
pub const VERLET_CALCULATIONS_PER_FRAME: usize = 8;

// -- container (picometers)
pub const CONTAINER_WIDTH: f64 = 10000.0;
pub const CONTAINER_INITIAL_HEIGHT: f64 = 10000.0;
pub const MIN_CONTAINER_HEIGHT: f64 = 1.0;

// -- wall and pair interaction
pub const WALL_DISTANCE_THRESHOLD: f64 = 1.122462048309373; // 2^(1/6)
pub const SAFE_INTER_MOLECULE_DISTANCE: f64 = 2.0;
pub const PARTICLE_INTERACTION_DISTANCE_THRESH_SQRD: f64 = 6.25; // cutoff at 2.5 diameters
pub const MIN_DISTANCE_SQUARED: f64 = 0.7225;
pub const POTENTIAL_SHIFT_AT_CUTOFF: f64 = 0.016316891136;

// -- pressure
pub const PRESSURE_CALC_WEIGHTING: f64 = 0.999;
pub const EXPLOSION_PRESSURE: f64 = 1.05;
pub const PRESSURE_TO_ATMOSPHERES: f64 = 200.0;

// -- gravity
pub const INITIAL_GRAVITATIONAL_ACCEL: f64 = 0.045;
pub const MAX_GRAVITATIONAL_ACCEL: f64 = 0.4;
pub const TEMPERATURE_BELOW_WHICH_GRAVITY_INCREASES: f64 = 0.10;
pub const LOW_TEMPERATURE_GRAVITY_INCREASE_RATE: f64 = 50.0;

// -- temperature set points (model units)
pub const SOLID_TEMPERATURE: f64 = 0.15;
pub const LIQUID_TEMPERATURE: f64 = 0.34;
pub const GAS_TEMPERATURE: f64 = 1.0;
pub const MIN_TEMPERATURE: f64 = 0.00001;
pub const MAX_TEMPERATURE: f64 = 50.0;

// -- heating / cooling
pub const MAX_TEMPERATURE_CHANGE_PER_ADJUSTMENT: f64 = 0.025;
pub const TICKS_PER_TEMP_ADJUSTMENT: usize = 10;
pub const LOW_TEMPERATURE_COOLING_FACTOR: f64 = 0.95;

// -- adjustable atom limits
pub const MIN_SIGMA: f64 = 75.0; // picometers
pub const MAX_SIGMA: f64 = 500.0;
pub const MIN_EPSILON: f64 = 20.0; // Kelvin
pub const MAX_EPSILON: f64 = 450.0;
pub const DEFAULT_ADJUSTABLE_SIGMA: f64 = 300.0;
pub const DEFAULT_ADJUSTABLE_EPSILON: f64 = 100.0;

// Boltzmann constant used by the SI-flavoured potential calculator
pub const BOLTZMANNS_CONSTANT: f64 = 1.3806503e-23;

// -- molecule injection
pub const MIN_INJECTED_MOLECULE_SPEED: f64 = 0.5;
pub const MAX_INJECTED_MOLECULE_SPEED: f64 = 2.0;
pub const MAX_INJECTED_MOLECULE_ANGLE: f64 = std::f64::consts::PI * 0.8;
pub const INJECTION_POINT_VERT_PROPORTION: f64 = 0.25;
pub const INJECTION_WALL_MARGIN: f64 = 1.5;

// -- phase placement
pub const MIN_INITIAL_PARTICLE_TO_WALL_DISTANCE: f64 = 2.5;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 500;
pub const LIQUID_SPACING_FACTOR: f64 = 0.95;

// -- model triple / critical points, used for the Kelvin conversion
pub const TRIPLE_POINT_MONATOMIC_MODEL_TEMPERATURE: f64 = 0.26;
pub const CRITICAL_POINT_MONATOMIC_MODEL_TEMPERATURE: f64 = 0.8;
pub const TRIPLE_POINT_DIATOMIC_MODEL_TEMPERATURE: f64 = 0.23;
pub const CRITICAL_POINT_DIATOMIC_MODEL_TEMPERATURE: f64 = 1.0;
pub const TRIPLE_POINT_WATER_MODEL_TEMPERATURE: f64 = 0.31;
pub const CRITICAL_POINT_WATER_MODEL_TEMPERATURE: f64 = 1.0;

// Kelvin triple/critical points of the adjustable atom track its epsilon
pub const ADJUSTABLE_TRIPLE_POINT_PER_EPSILON: f64 = 0.75;
pub const ADJUSTABLE_CRITICAL_POINT_PER_EPSILON: f64 = 1.35;
