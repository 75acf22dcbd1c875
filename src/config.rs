//! Board, physics and payout configuration
//!
//! Loaded once at startup (JSON on disk, or the built-in defaults) and
//! validated before any board is built or any outcome is drawn.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::outcome::MultiplierTable;

/// Peg field and sink layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    /// Deflection rows; the board has `rows + 1` sinks
    pub rows: usize,
    /// Index of the topmost peg row (row r has r + 1 pegs at y = r * row_spacing)
    pub first_peg_row: usize,
    pub row_spacing: f32,
    pub peg_spacing: f32,
    pub peg_radius: f32,
    pub ball_radius: f32,
    pub sink_width: f32,
    /// Spawn height of every ball
    pub drop_height: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            rows: DEFAULT_ROWS,
            first_peg_row: FIRST_PEG_ROW,
            row_spacing: ROW_SPACING,
            peg_spacing: PEG_SPACING,
            peg_radius: PEG_RADIUS,
            ball_radius: BALL_RADIUS,
            sink_width: SINK_WIDTH,
            drop_height: DROP_HEIGHT,
        }
    }
}

impl BoardConfig {
    /// Number of scoring bins (one per possible right-step count)
    pub fn sink_count(&self) -> usize {
        self.rows + 1
    }

    /// Horizontal centre line of the board
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Vertical position of peg row `row`
    #[inline]
    pub fn row_y(&self, row: usize) -> f32 {
        row as f32 * self.row_spacing
    }

    pub fn last_peg_row(&self) -> usize {
        self.first_peg_row + self.rows - 1
    }

    /// Horizontal shift of one deflection: pegs in adjacent rows are offset
    /// by half the in-row spacing
    #[inline]
    pub fn lattice_pitch(&self) -> f32 {
        self.peg_spacing / 2.0
    }

    /// Height at which the first steering directive fires (midway above the
    /// first peg row)
    pub fn first_trigger_y(&self) -> f32 {
        self.row_y(self.first_peg_row) - self.row_spacing / 2.0
    }

    /// Top edge of the sink strip, half a row below the last peg row
    pub fn sink_top(&self) -> f32 {
        self.row_y(self.last_peg_row()) + self.row_spacing / 2.0
    }

    /// Horizontal offset of sink `bin` from the centre line
    pub fn sink_offset(&self, bin: usize) -> f32 {
        (bin as f32 - self.rows as f32 / 2.0) * self.sink_width
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("row_spacing", self.row_spacing),
            ("peg_spacing", self.peg_spacing),
            ("peg_radius", self.peg_radius),
            ("ball_radius", self.ball_radius),
            ("sink_width", self.sink_width),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.peg_spacing <= 2.0 * self.peg_radius {
            return Err(ConfigError::PegsOverlap {
                spacing: self.peg_spacing,
                radius: self.peg_radius,
            });
        }
        let gap = self.peg_spacing - 2.0 * self.peg_radius;
        if gap <= 2.0 * self.ball_radius {
            return Err(ConfigError::LaneBlocked {
                gap,
                ball_radius: self.ball_radius,
            });
        }
        if (self.sink_width - self.peg_spacing).abs() > 1e-4 {
            return Err(ConfigError::SinkPitchMismatch {
                sink_width: self.sink_width,
                peg_spacing: self.peg_spacing,
            });
        }

        let sinks = self.sink_count();
        if sinks as f32 * self.sink_width > self.width {
            return Err(ConfigError::SinksOverflowWidth {
                sinks,
                sink_width: self.sink_width,
                board_width: self.width,
            });
        }
        let sink_bottom = self.sink_top() + self.sink_width;
        if sink_bottom > self.height {
            return Err(ConfigError::SinksOverflowHeight {
                sink_bottom,
                board_height: self.height,
            });
        }

        let first_trigger = self.first_trigger_y();
        if self.drop_height >= first_trigger {
            return Err(ConfigError::DropBelowFirstTrigger {
                drop_height: self.drop_height,
                first_trigger,
            });
        }
        Ok(())
    }
}

/// Integration constants for the falling ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Cap on downward speed
    pub terminal_velocity: f32,
    /// Horizontal speed set at each Left/Right directive
    pub deflection_speed: f32,
    /// Fraction of speed kept after a peg hit (x, y)
    pub restitution: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            deflection_speed: DEFLECTION_SPEED,
            restitution: Vec2::new(RESTITUTION_X, RESTITUTION_Y),
        }
    }
}

impl PhysicsConfig {
    /// Same constants with peg bounces fully damped
    pub fn without_jitter() -> Self {
        Self {
            restitution: Vec2::ZERO,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gravity", self.gravity),
            ("terminal_velocity", self.terminal_velocity),
            ("deflection_speed", self.deflection_speed),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let r = self.restitution;
        if !(0.0..=1.0).contains(&r.x) || !(0.0..=1.0).contains(&r.y) {
            return Err(ConfigError::RestitutionOutOfRange { x: r.x, y: r.y });
        }
        if self.deflection_speed <= self.terminal_velocity {
            return Err(ConfigError::SteeringTooSlow {
                deflection: self.deflection_speed,
                terminal: self.terminal_velocity,
            });
        }
        Ok(())
    }
}

/// Everything a board and its outcome generator agree on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlinkoConfig {
    pub board: BoardConfig,
    pub physics: PhysicsConfig,
    pub table: MultiplierTable,
}

impl PlinkoConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        self.physics.validate()?;
        self.table.validate(self.board.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        PlinkoConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_geometry() {
        let board = BoardConfig::default();
        assert_eq!(board.sink_count(), 17);
        assert_eq!(board.last_peg_row(), 17);
        assert_eq!(board.first_trigger_y(), 52.5);
        assert_eq!(board.sink_top(), 612.5);
        assert_eq!(board.sink_offset(0), -288.0);
        assert_eq!(board.sink_offset(8), 0.0);
        assert_eq!(board.sink_offset(16), 288.0);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let board = BoardConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(matches!(board.validate(), Err(ConfigError::NoRows)));
    }

    #[test]
    fn test_sinks_wider_than_board_rejected() {
        let board = BoardConfig {
            width: 400.0,
            ..Default::default()
        };
        assert!(matches!(
            board.validate(),
            Err(ConfigError::SinksOverflowWidth { sinks: 17, .. })
        ));
    }

    #[test]
    fn test_overlapping_pegs_rejected() {
        let board = BoardConfig {
            peg_radius: 20.0,
            ..Default::default()
        };
        assert!(matches!(board.validate(), Err(ConfigError::PegsOverlap { .. })));
    }

    #[test]
    fn test_blocked_lane_rejected() {
        let board = BoardConfig {
            ball_radius: 15.0,
            ..Default::default()
        };
        assert!(matches!(board.validate(), Err(ConfigError::LaneBlocked { .. })));
    }

    #[test]
    fn test_sink_pitch_must_match_pegs() {
        let board = BoardConfig {
            sink_width: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            board.validate(),
            Err(ConfigError::SinkPitchMismatch { .. })
        ));
    }

    #[test]
    fn test_short_board_rejected() {
        let board = BoardConfig {
            height: 600.0,
            ..Default::default()
        };
        assert!(matches!(
            board.validate(),
            Err(ConfigError::SinksOverflowHeight { .. })
        ));
    }

    #[test]
    fn test_physics_validation() {
        PhysicsConfig::without_jitter().validate().unwrap();

        let slow = PhysicsConfig {
            deflection_speed: 300.0,
            ..Default::default()
        };
        assert!(matches!(slow.validate(), Err(ConfigError::SteeringTooSlow { .. })));

        let bouncy = PhysicsConfig {
            restitution: Vec2::new(1.5, 0.8),
            ..Default::default()
        };
        assert!(matches!(
            bouncy.validate(),
            Err(ConfigError::RestitutionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_config_json_round_trip_with_partial_fields() {
        let json = r#"{ "board": { "rows": 16 }, "physics": { "gravity": 900.0 } }"#;
        let config: PlinkoConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.physics.gravity, 900.0);
        assert_eq!(config.board, BoardConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = PlinkoConfig::load("/definitely/not/here/plinko.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
