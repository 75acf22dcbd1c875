//! Deterministic board simulation
//!
//! Everything a falling ball needs lives here. Given the same board, physics
//! constants and step sequence, a ball follows the same path every time:
//! - Fixed timestep only
//! - No randomness (the outcome is decided before the ball spawns)
//! - Stable iteration order (balls in spawn order, pegs row by row)
//! - No rendering or platform dependencies

pub mod board;
pub mod collision;
pub mod reconcile;
pub mod state;
pub mod tick;

pub use board::{Board, Obstacle, Sink};
pub use collision::{CollisionResult, ball_peg_collision};
pub use reconcile::{Step, StepSource, reconcile, right_count};
pub use state::{Ball, BallState, SimEvent};
pub use tick::{step_ball, tick};
