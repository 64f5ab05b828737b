//! Global configuration constants for the Kinetica engine.

/// Default gravity vector applied in the simulation (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Default fixed integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Default uniform velocity damping factor applied after integration.
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.998;

/// Default maximum subdivision depth of the octree broadphase.
pub const DEFAULT_OCTREE_MAX_DEPTH: u32 = 5;

/// Default number of bodies an octree node holds before subdividing.
pub const DEFAULT_OCTREE_LEAF_CAPACITY: usize = 3;

/// Squared velocity magnitude below which a body accumulates rest ticks.
pub const REST_ENERGY_THRESHOLD: f32 = 0.01;

/// Consecutive low-energy ticks required before a body is flagged at rest.
pub const REST_TICK_COUNT: u32 = 10;

/// Penetration depth tolerated before positional correction kicks in.
pub const PENETRATION_SLOP: f32 = 0.01;

/// Fraction of the remaining penetration corrected per tick.
pub const POSITION_CORRECTION_PERCENT: f32 = 0.2;

/// Minimum impulse magnitude that counts as a disturbance and wakes a body.
pub const WAKE_IMPULSE_THRESHOLD: f32 = 1e-4;
