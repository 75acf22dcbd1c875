//! Error taxonomy
//!
//! `ConfigError` covers everything caught once at startup (board layout,
//! physics constants, multiplier table). `PlinkoError` covers per-request
//! failures while producing or consuming an outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlinkoError {
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("outcome request failed: {0}")]
    OutcomeRequestFailed(String),

    #[error("bin index {bin} outside multiplier table of {bins} bins")]
    InvalidBinIndex { bin: usize, bins: usize },

    #[error("multiplier for bin {bin} is {actual}, table says {expected}")]
    MultiplierMismatch { bin: usize, expected: f64, actual: f64 },

    #[error("multiplier table version {actual} does not match local version {expected}")]
    TableVersionMismatch { expected: u32, actual: u32 },

    #[error("step pattern of {steps} steps with {rights} right steps does not lead to bin {bin}")]
    PatternMismatch { bin: usize, rights: usize, steps: usize },

    #[error("step pattern has a neutral step at index {index}")]
    NeutralInPattern { index: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board needs at least one deflection row")]
    NoRows,

    #[error("'{field}' must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{sinks} sinks of width {sink_width} do not fit a board {board_width} wide")]
    SinksOverflowWidth { sinks: usize, sink_width: f32, board_width: f32 },

    #[error("sink bottom at y={sink_bottom} is below board height {board_height}")]
    SinksOverflowHeight { sink_bottom: f32, board_height: f32 },

    #[error("pegs overlap: spacing {spacing} is not wider than two radii of {radius}")]
    PegsOverlap { spacing: f32, radius: f32 },

    #[error("ball of radius {ball_radius} cannot pass a {gap} gap between pegs")]
    LaneBlocked { gap: f32, ball_radius: f32 },

    #[error("sink width {sink_width} must equal peg spacing {peg_spacing}")]
    SinkPitchMismatch { sink_width: f32, peg_spacing: f32 },

    #[error("drop height {drop_height} must be above the first trigger at y={first_trigger}")]
    DropBelowFirstTrigger { drop_height: f32, first_trigger: f32 },

    #[error("multiplier table has {actual} entries, board needs {expected}")]
    TableLength { expected: usize, actual: usize },

    #[error("multiplier table is not symmetric at bin {index}")]
    AsymmetricTable { index: usize },

    #[error("multiplier at bin {index} is not a finite non-negative number")]
    InvalidMultiplier { index: usize },

    #[error("restitution ({x}, {y}) must lie in [0, 1]")]
    RestitutionOutOfRange { x: f32, y: f32 },

    #[error("deflection speed {deflection} must exceed terminal velocity {terminal}")]
    SteeringTooSlow { deflection: f32, terminal: f32 },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type PlinkoResult<T> = Result<T, PlinkoError>;
