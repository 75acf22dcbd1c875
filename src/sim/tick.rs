//! Fixed timestep simulation tick
//!
//! Advances every active ball by one step: gravity, integration, steering,
//! peg contacts, then sink detection. Steering dominates the trajectory; the
//! pegs only add cosmetic jitter on top of it.

use glam::Vec2;

use super::board::Board;
use super::collision::{ball_escaped, ball_peg_collision, redirect_velocity};
use super::reconcile::Step;
use super::state::{Ball, BallState, SimEvent};
use crate::config::PhysicsConfig;

/// Advance all balls by one fixed timestep
pub fn tick(board: &Board, physics: &PhysicsConfig, balls: &mut [Ball], dt: f32) -> Vec<SimEvent> {
    balls
        .iter_mut()
        .filter_map(|ball| step_ball(board, physics, ball, dt))
        .collect()
}

/// Advance one ball; settled and escaped balls are left untouched
pub fn step_ball(board: &Board, physics: &PhysicsConfig, ball: &mut Ball, dt: f32) -> Option<SimEvent> {
    if !ball.is_active() {
        return None;
    }
    let config = board.config();

    // Gravity, clamped so steering always outruns the fall
    ball.vel.y = (ball.vel.y + physics.gravity * dt).min(physics.terminal_velocity);

    integrate(ball, dt);
    apply_steering(ball, config.row_spacing, config.lattice_pitch(), physics.deflection_speed);

    // Overlaps are resolved one peg at a time, in a single pass
    for peg in board.obstacles() {
        let contact = ball_peg_collision(ball.pos, ball.radius, peg, ball.heading);
        if !contact.hit {
            continue;
        }
        ball.vel = redirect_velocity(ball.vel, contact.normal, physics.restitution);
        ball.pos += contact.normal * contact.penetration;

        // A bounce away from the lane cancels the deflection in progress
        if ball.state == BallState::Deflecting && ball.vel.x * (ball.lane_x - ball.pos.x) <= 0.0 {
            ball.state = BallState::Falling;
        }
    }

    if let Some(sink) = board.sink_hit(ball.pos, ball.radius) {
        ball.vel = Vec2::ZERO;
        ball.state = BallState::Settled { sink };
        if sink == ball.expected_sink {
            log::debug!("Ball {} settled in sink {}", ball.id, sink);
        } else {
            log::warn!(
                "Ball {} settled in sink {} but its outcome chose {}",
                ball.id,
                sink,
                ball.expected_sink
            );
        }
        return Some(SimEvent::Settled {
            ball_id: ball.id,
            sink,
        });
    }

    if ball_escaped(ball.pos, ball.radius, config.height) {
        ball.vel = Vec2::ZERO;
        ball.state = BallState::Escaped;
        log::warn!("Ball {} left the board at x={:.1}", ball.id, ball.pos.x);
        return Some(SimEvent::Escaped { ball_id: ball.id });
    }

    None
}

/// Move by velocity; a deflecting ball stops exactly on its lane
fn integrate(ball: &mut Ball, dt: f32) {
    let mut next = ball.pos + ball.vel * dt;

    if ball.state == BallState::Deflecting {
        let lane = ball.lane_x;
        let arrived = (ball.vel.x > 0.0 && next.x >= lane) || (ball.vel.x < 0.0 && next.x <= lane);
        if arrived {
            next.x = lane;
            ball.vel.x = 0.0;
            ball.state = BallState::Falling;
        }
    }

    ball.pos = next;
}

/// Fire the next directive once the ball reaches its trigger height
fn apply_steering(ball: &mut Ball, row_spacing: f32, pitch: f32, deflection_speed: f32) {
    match ball.take_due_step(row_spacing) {
        Some(Step::Neutral) => {}
        Some(step) => {
            ball.lane_x += step.sign() * pitch;
            ball.heading = step.sign();

            let to_lane = ball.lane_x - ball.pos.x;
            if to_lane.abs() > f32::EPSILON {
                ball.vel.x = to_lane.signum() * deflection_speed;
                ball.state = BallState::Deflecting;
            }
        }
        None if ball.steps_exhausted() && ball.state != BallState::Deflecting => {
            // Sequence spent: straight down into the sink
            ball.vel.x = 0.0;
        }
        None => {}
    }
}
