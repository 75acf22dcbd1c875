//! Ball state
//!
//! A ball carries its own steering sequence and cursor; the board it falls
//! through is passed in separately.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::reconcile::Step;

/// Ball lifecycle: `Falling <-> Deflecting -> Settled`, or `Escaped` if it
/// leaves the board without touching a sink. Both end states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Under gravity only (plus peg contacts)
    Falling,
    /// Moving sideways toward its lane target
    Deflecting,
    /// Came to rest in sink `sink`
    Settled { sink: usize },
    /// Fell past the bottom of the board
    Escaped,
}

/// Something the caller should hear about after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Settled { ball_id: u32, sink: usize },
    Escaped { ball_id: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
    /// Bin the outcome promised
    pub expected_sink: usize,
    /// One directive per deflection row
    steps: Vec<Step>,
    cursor: usize,
    /// Height at which the next directive fires
    next_trigger_y: f32,
    /// Horizontal target of the current lane
    pub(crate) lane_x: f32,
    /// Sign of the last Left/Right directive (tie-break for dead-centre hits)
    pub(crate) heading: f32,
}

impl Ball {
    /// Spawn at the board's drop point with a reconciled step sequence
    pub fn new(id: u32, board: &Board, steps: Vec<Step>, expected_sink: usize) -> Self {
        let config = board.config();
        let pos = board.drop_point();
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: config.ball_radius,
            state: BallState::Falling,
            expected_sink,
            steps,
            cursor: 0,
            next_trigger_y: config.first_trigger_y(),
            lane_x: pos.x,
            heading: 1.0,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Directives consumed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next_trigger_y(&self) -> f32 {
        self.next_trigger_y
    }

    pub fn lane_x(&self) -> f32 {
        self.lane_x
    }

    pub fn steps_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Still simulated?
    pub fn is_active(&self) -> bool {
        matches!(self.state, BallState::Falling | BallState::Deflecting)
    }

    pub fn settled_sink(&self) -> Option<usize> {
        match self.state {
            BallState::Settled { sink } => Some(sink),
            _ => None,
        }
    }

    /// Consume the next directive if the ball has fallen far enough
    ///
    /// Returns the directive that fired, if any.
    pub(crate) fn take_due_step(&mut self, row_spacing: f32) -> Option<Step> {
        if self.steps_exhausted() || self.pos.y < self.next_trigger_y {
            return None;
        }
        let step = self.steps[self.cursor];
        self.cursor += 1;
        self.next_trigger_y += row_spacing;
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlinkoConfig;

    #[test]
    fn test_new_ball_at_drop_point() {
        let board = Board::from_config(&PlinkoConfig::default()).unwrap();
        let ball = Ball::new(1, &board, vec![Step::Right; 16], 16);
        assert_eq!(ball.pos, Vec2::new(400.0, 50.0));
        assert_eq!(ball.vel, Vec2::ZERO);
        assert_eq!(ball.state, BallState::Falling);
        assert_eq!(ball.next_trigger_y(), 52.5);
        assert_eq!(ball.lane_x(), 400.0);
        assert!(ball.is_active());
        assert_eq!(ball.settled_sink(), None);
    }

    #[test]
    fn test_steps_fire_at_row_cadence() {
        let board = Board::from_config(&PlinkoConfig::default()).unwrap();
        let mut ball = Ball::new(1, &board, vec![Step::Left, Step::Right], 1);

        assert_eq!(ball.take_due_step(35.0), None);
        ball.pos.y = 52.5;
        assert_eq!(ball.take_due_step(35.0), Some(Step::Left));
        assert_eq!(ball.next_trigger_y(), 87.5);
        assert_eq!(ball.take_due_step(35.0), None);

        ball.pos.y = 90.0;
        assert_eq!(ball.take_due_step(35.0), Some(Step::Right));
        assert!(ball.steps_exhausted());

        ball.pos.y = 500.0;
        assert_eq!(ball.take_due_step(35.0), None);
        assert_eq!(ball.cursor(), 2);
    }
}
