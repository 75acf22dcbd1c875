//! Plinko Drop - server-decided outcomes on a simulated peg board
//!
//! Core modules:
//! - `outcome`: Binomial outcome generation, the shared multiplier table, wire format
//! - `sim`: Deterministic board simulation (pegs, sinks, steering, collisions)
//! - `session`: Frame-loop consumer that spawns balls and reports payouts
//! - `config`: Board, physics and table configuration with startup validation

pub mod config;
pub mod error;
pub mod outcome;
pub mod session;
pub mod sim;

pub use config::{BoardConfig, PhysicsConfig, PlinkoConfig};
pub use error::{ConfigError, PlinkoError, PlinkoResult};
pub use outcome::{DropOutcome, DropResponse, MultiplierTable, OutcomeGenerator, OutcomeServer, OutcomeService};
pub use session::{DropReport, Session};
pub use sim::{Ball, BallState, Board, Step, StepSource};

/// Simulation and board constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Deflection rows (coin flips per drop)
    pub const DEFAULT_ROWS: usize = 16;
    /// Index of the topmost peg row; row r carries r + 1 pegs
    pub const FIRST_PEG_ROW: usize = 2;

    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 800.0;
    pub const BOARD_HEIGHT: f32 = 800.0;

    /// Vertical distance between peg rows
    pub const ROW_SPACING: f32 = 35.0;
    /// Horizontal distance between pegs in one row
    pub const PEG_SPACING: f32 = 36.0;
    pub const PEG_RADIUS: f32 = 4.0;
    pub const SINK_WIDTH: f32 = 36.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 7.0;
    pub const DROP_HEIGHT: f32 = 50.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 800.0;
    /// Vertical speed cap so steering always outruns the fall
    pub const TERMINAL_VELOCITY: f32 = 400.0;
    /// Horizontal speed applied at each deflection row
    pub const DEFLECTION_SPEED: f32 = 800.0;
    /// Fraction of speed kept after a peg hit, per axis
    pub const RESTITUTION_X: f32 = 0.4;
    pub const RESTITUTION_Y: f32 = 0.8;
}

/// Binomial coefficient C(n, k) as f64 (exact for the row counts used here)
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
