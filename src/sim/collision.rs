//! Ball-peg contact detection and response
//!
//! Pegs are circles, so the contact normal is simply the direction from peg
//! centre to ball centre. Response redirects the ball's speed along that
//! normal with per-axis damping, then pushes it clear of the peg.

use glam::Vec2;

use super::board::Obstacle;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal from peg toward ball centre
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Smallest horizontal lean of a contact normal, in pixels of offset
const MIN_LEAN: f32 = 0.5;

/// Check a ball against one peg
///
/// The normal always leans at least `MIN_LEAN` to one side, so a ball can
/// never balance on top of a peg. A hit exactly above the peg centre leans
/// toward `heading`.
pub fn ball_peg_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    peg: &Obstacle,
    heading: f32,
) -> CollisionResult {
    let mut offset = ball_pos - peg.pos;
    let reach = ball_radius + peg.radius;
    if offset.length_squared() >= reach * reach {
        return CollisionResult::miss();
    }

    if offset.x.abs() < MIN_LEAN {
        let side = if offset.x.abs() < 1e-4 { heading } else { offset.x };
        offset.x = side.signum() * MIN_LEAN;
    }
    let dist = offset.length();
    let normal = offset / dist;

    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Send the ball off along the contact normal, keeping its speed minus damping
#[inline]
pub fn redirect_velocity(velocity: Vec2, normal: Vec2, restitution: Vec2) -> Vec2 {
    normal * velocity.length() * restitution
}

/// Has the ball dropped clean off the bottom of the board?
#[inline]
pub fn ball_escaped(ball_pos: Vec2, ball_radius: f32, board_height: f32) -> bool {
    ball_pos.y - ball_radius > board_height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peg() -> Obstacle {
        Obstacle {
            pos: Vec2::new(100.0, 100.0),
            radius: 4.0,
        }
    }

    #[test]
    fn test_miss_when_apart() {
        let result = ball_peg_collision(Vec2::new(100.0, 89.0), 7.0, &peg(), 1.0);
        assert!(!result.hit);
        let result = ball_peg_collision(Vec2::new(118.0, 100.0), 7.0, &peg(), 1.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_hit_from_upper_left() {
        let ball = Vec2::new(94.0, 94.0);
        let result = ball_peg_collision(ball, 7.0, &peg(), 1.0);
        assert!(result.hit);
        assert!(result.normal.x < 0.0 && result.normal.y < 0.0);
        assert!((result.normal.length() - 1.0).abs() < 1e-5);
        let dist = (ball - peg().pos).length();
        assert!((result.penetration - (11.0 - dist)).abs() < 1e-4);

        // Pushing out by the penetration depth clears the peg exactly
        let resolved = ball + result.normal * result.penetration;
        assert!(((resolved - peg().pos).length() - 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_dead_centre_hit_leans_toward_heading() {
        let ball = Vec2::new(100.0, 92.0);
        let right = ball_peg_collision(ball, 7.0, &peg(), 1.0);
        let left = ball_peg_collision(ball, 7.0, &peg(), -1.0);
        assert!(right.hit && left.hit);
        assert!(right.normal.x > 0.0);
        assert!(left.normal.x < 0.0);
        assert!(right.normal.y < -0.99);
    }

    #[test]
    fn test_near_centre_hit_keeps_its_side() {
        let result = ball_peg_collision(Vec2::new(99.9, 92.0), 7.0, &peg(), 1.0);
        assert!(result.normal.x < 0.0);
        assert!(result.normal.x.abs() >= MIN_LEAN / 11.0);
    }

    #[test]
    fn test_redirect_velocity_damps_per_axis() {
        let normal = Vec2::new(0.6, -0.8);
        let v = redirect_velocity(Vec2::new(0.0, 100.0), normal, Vec2::new(0.4, 0.8));
        assert!((v.x - 24.0).abs() < 1e-4);
        assert!((v.y + 64.0).abs() < 1e-4);

        let still = redirect_velocity(Vec2::new(0.0, 100.0), normal, Vec2::ZERO);
        assert_eq!(still, Vec2::ZERO);
    }

    #[test]
    fn test_escape_below_board() {
        assert!(!ball_escaped(Vec2::new(0.0, 795.0), 7.0, 800.0));
        assert!(ball_escaped(Vec2::new(0.0, 808.0), 7.0, 800.0));
    }
}
