//! Static board geometry: the triangular peg lattice and the sink strip
//!
//! Built once from a validated config and never mutated. Each board owns its
//! own containers so several boards can run side by side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{BoardConfig, PlinkoConfig};
use crate::error::ConfigError;
use crate::outcome::MultiplierTable;

/// A fixed peg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
}

/// A scoring bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sink {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub multiplier: f64,
}

impl Sink {
    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.width / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.height / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.height / 2.0
    }

    /// Does a ball's bounding box overlap this sink's rectangle?
    pub fn overlaps(&self, pos: Vec2, radius: f32) -> bool {
        pos.x + radius > self.left()
            && pos.x - radius < self.right()
            && pos.y + radius > self.top()
            && pos.y - radius < self.bottom()
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    obstacles: Vec<Obstacle>,
    sinks: Vec<Sink>,
}

impl Board {
    /// Lay out pegs and sinks, pricing sinks from the shared table
    pub fn new(config: &BoardConfig, table: &MultiplierTable) -> Result<Self, ConfigError> {
        config.validate()?;
        table.validate(config.rows)?;

        let cx = config.center_x();
        let obstacles: Vec<Obstacle> = (config.first_peg_row..=config.last_peg_row())
            .flat_map(|row| {
                let y = config.row_y(row);
                (0..=row).map(move |col| Obstacle {
                    pos: Vec2::new(
                        cx - config.peg_spacing * (row as f32 / 2.0 - col as f32),
                        y,
                    ),
                    radius: config.peg_radius,
                })
            })
            .collect();

        let sink_y = config.sink_top() + config.sink_width / 2.0;
        let sinks: Vec<Sink> = (0..config.sink_count())
            .map(|bin| Sink {
                center: Vec2::new(cx + config.sink_offset(bin), sink_y),
                width: config.sink_width,
                height: config.sink_width,
                multiplier: table[bin],
            })
            .collect();

        log::debug!(
            "Built board: {} pegs over {} rows, {} sinks",
            obstacles.len(),
            config.rows,
            sinks.len()
        );

        Ok(Self {
            config: config.clone(),
            obstacles,
            sinks,
        })
    }

    pub fn from_config(config: &PlinkoConfig) -> Result<Self, ConfigError> {
        Self::new(&config.board, &config.table)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    pub fn sink(&self, bin: usize) -> Option<&Sink> {
        self.sinks.get(bin)
    }

    /// Where every ball spawns
    pub fn drop_point(&self) -> Vec2 {
        Vec2::new(self.config.center_x(), self.config.drop_height)
    }

    /// First sink (by index) the ball's bounding box overlaps
    pub fn sink_hit(&self, pos: Vec2, radius: f32) -> Option<usize> {
        // Everything above the strip can be skipped cheaply
        if pos.y + radius <= self.config.sink_top() {
            return None;
        }
        self.sinks.iter().position(|sink| sink.overlaps(pos, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::from_config(&PlinkoConfig::default()).unwrap()
    }

    #[test]
    fn test_triangular_lattice() {
        let board = board();
        // Rows 2..=17, row r has r + 1 pegs
        let expected: usize = (2..=17).map(|r| r + 1).sum();
        assert_eq!(board.obstacles().len(), expected);

        let top: Vec<_> = board.obstacles().iter().take(3).map(|o| o.pos).collect();
        assert_eq!(top, vec![Vec2::new(364.0, 70.0), Vec2::new(400.0, 70.0), Vec2::new(436.0, 70.0)]);
    }

    #[test]
    fn test_rows_are_symmetric_about_centre() {
        let board = board();
        for peg in board.obstacles() {
            let mirror = Vec2::new(800.0 - peg.pos.x, peg.pos.y);
            assert!(board.obstacles().iter().any(|o| (o.pos - mirror).length() < 1e-3));
        }
    }

    #[test]
    fn test_sinks_contiguous_and_centred() {
        let board = board();
        let sinks = board.sinks();
        assert_eq!(sinks.len(), 17);
        for pair in sinks.windows(2) {
            assert!((pair[0].right() - pair[1].left()).abs() < 1e-4);
        }
        let span = sinks[16].right() - sinks[0].left();
        assert!(((sinks[0].left() + span / 2.0) - 400.0).abs() < 1e-4);
        assert_eq!(sinks[8].center.x, 400.0);
    }

    #[test]
    fn test_sinks_priced_from_table() {
        let board = board();
        let table = MultiplierTable::standard();
        for (bin, sink) in board.sinks().iter().enumerate() {
            assert_eq!(sink.multiplier, table[bin]);
        }
    }

    #[test]
    fn test_sinks_below_peg_field() {
        let board = board();
        let lowest_peg = board
            .obstacles()
            .iter()
            .map(|o| o.pos.y + o.radius)
            .fold(f32::MIN, f32::max);
        assert!(board.sinks().iter().all(|s| s.top() > lowest_peg));
    }

    #[test]
    fn test_sink_hit_uses_bounding_box() {
        let board = board();
        let sink = board.sinks()[3];
        assert_eq!(board.sink_hit(sink.center, 7.0), Some(3));
        // Straddling the boundary reports the first overlapping sink
        assert_eq!(board.sink_hit(Vec2::new(sink.right(), sink.center.y), 7.0), Some(3));
        // Still above the strip
        assert_eq!(board.sink_hit(Vec2::new(sink.center.x, 300.0), 7.0), None);
    }

    #[test]
    fn test_misconfigured_table_fails_at_startup() {
        let config = PlinkoConfig::default();
        let short = BoardConfig {
            rows: 12,
            ..config.board.clone()
        };
        assert!(matches!(
            Board::new(&short, &config.table),
            Err(ConfigError::TableLength { expected: 13, actual: 17 })
        ));
    }
}
