//! Binomial random-walk outcome generator

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::table::MultiplierTable;
use crate::config::PlinkoConfig;
use crate::error::ConfigError;
use crate::sim::reconcile::right_count;
use crate::sim::Step;

/// Landing positions offered per bin (sink centre and either side of it)
const LANDING_SLOTS: usize = 3;

/// A decided drop. Immutable once produced; consumed by exactly one ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropOutcome {
    /// Number of right steps in the walk, in `[0, rows]`
    pub bin_index: usize,
    /// Always `table[bin_index]`
    pub multiplier: f64,
    /// Horizontal landing point relative to the board centre line
    pub landing_offset: f32,
    /// The walk, one Left/Right per row (empty when upstream omitted it)
    pub step_pattern: Vec<Step>,
}

/// Draws outcomes from an injected random source
#[derive(Debug, Clone)]
pub struct OutcomeGenerator {
    table: Arc<MultiplierTable>,
    rows: usize,
    /// Valid landing offsets, indexed by bin
    landing: Vec<[f32; LANDING_SLOTS]>,
}

impl OutcomeGenerator {
    pub fn new(config: &PlinkoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = &config.board;
        // Keep the whole ball inside its sink
        let spread = (board.sink_width / 2.0 - board.ball_radius) / 2.0;
        let landing = (0..board.sink_count())
            .map(|bin| {
                let centre = board.sink_offset(bin);
                [centre - spread, centre, centre + spread]
            })
            .collect();

        Ok(Self {
            table: Arc::new(config.table.clone()),
            rows: board.rows,
            landing,
        })
    }

    pub fn table(&self) -> &Arc<MultiplierTable> {
        &self.table
    }

    /// Landing offsets a drop into `bin` may report
    pub fn landing_offsets(&self, bin: usize) -> &[f32] {
        &self.landing[bin]
    }

    /// Flip `rows` fair coins and price the result
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> DropOutcome {
        let walk: Vec<Step> = (0..self.rows)
            .map(|_| Step::from_coin(rng.random_bool(0.5)))
            .collect();

        let mut outcome = self.outcome_for_walk(walk);
        let slots = &self.landing[outcome.bin_index];
        outcome.landing_offset = slots[rng.random_range(0..slots.len())];
        outcome
    }

    /// Outcome of a fixed walk, landing at its sink centre
    ///
    /// Panics if the walk is longer than the board has rows: the table is
    /// total over `[0, rows]`, so any larger bin is a programming error.
    pub fn outcome_for_walk(&self, walk: Vec<Step>) -> DropOutcome {
        let bin_index = right_count(&walk);
        assert!(
            bin_index <= self.rows,
            "walk with {bin_index} right steps exceeds {} rows",
            self.rows
        );
        DropOutcome {
            bin_index,
            multiplier: self.table[bin_index],
            landing_offset: self.landing[bin_index][LANDING_SLOTS / 2],
            step_pattern: walk,
        }
    }
}
