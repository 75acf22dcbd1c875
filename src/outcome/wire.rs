//! Response object exchanged between the outcome service and its consumer
//!
//! JSON shape: `{ "point": f32, "multiplier": f64, "pattern": ["L"|"R"],
//! "sinkIndex": usize, "tableVersion": u32 }`. `pattern` may be absent, in
//! which case the consumer derives steering from the sink offset.

use serde::{Deserialize, Serialize};

use super::generator::DropOutcome;
use super::table::MultiplierTable;
use crate::error::{PlinkoError, PlinkoResult};
use crate::sim::{Step, right_count};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResponse {
    /// Alternate landing coordinate for consumers that skip pattern steering
    pub point: f32,
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern: Vec<Step>,
    pub sink_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_version: Option<u32>,
}

impl DropResponse {
    pub fn from_outcome(outcome: &DropOutcome, table: &MultiplierTable) -> Self {
        Self {
            point: outcome.landing_offset,
            multiplier: outcome.multiplier,
            pattern: outcome.step_pattern.clone(),
            sink_index: outcome.bin_index,
            table_version: Some(table.version),
        }
    }

    /// Check the response against the local copy of the shared table
    ///
    /// A pattern must hold only Left/Right steps. A full-length pattern must
    /// walk into `sink_index`; a longer one is rejected. Shorter patterns are
    /// padded during reconciliation.
    pub fn into_outcome(self, table: &MultiplierTable) -> PlinkoResult<DropOutcome> {
        if let Some(actual) = self.table_version.filter(|v| *v != table.version) {
            return Err(PlinkoError::TableVersionMismatch {
                expected: table.version,
                actual,
            });
        }

        let expected = table.multiplier(self.sink_index)?;
        if (expected - self.multiplier).abs() > f64::EPSILON {
            return Err(PlinkoError::MultiplierMismatch {
                bin: self.sink_index,
                expected,
                actual: self.multiplier,
            });
        }

        self.check_pattern(table.rows())?;

        Ok(DropOutcome {
            bin_index: self.sink_index,
            multiplier: expected,
            landing_offset: self.point,
            step_pattern: self.pattern,
        })
    }

    fn check_pattern(&self, rows: usize) -> PlinkoResult<()> {
        if let Some(index) = self.pattern.iter().position(|s| *s == Step::Neutral) {
            return Err(PlinkoError::NeutralInPattern { index });
        }
        let steps = self.pattern.len();
        let rights = right_count(&self.pattern);
        if steps > rows || (steps == rows && rights != self.sink_index) {
            return Err(PlinkoError::PatternMismatch {
                bin: self.sink_index,
                rights,
                steps,
            });
        }
        Ok(())
    }
}
