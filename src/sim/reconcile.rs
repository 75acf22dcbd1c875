//! Pattern reconciliation
//!
//! Turns whatever the outcome carried into exactly one directive per
//! deflection row. A server pattern is replayed verbatim, which lands the
//! ball in `bin_index` by construction. Without one, a sequence is derived
//! from the horizontal offset to the target sink: a run of same-direction
//! steps followed by neutral rows. The derived path ignores peg-level
//! randomness and, because neutral rows drop the ball onto pegs, is only an
//! approximation of the target.
//!
//! A unit step on this lattice is half the peg spacing: adjacent rows are
//! offset by that much, so it is the smallest lateral move between gaps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::outcome::DropOutcome;

/// One steering directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    /// Leaves lane and velocity untouched
    #[serde(rename = "")]
    Neutral,
}

impl Step {
    /// Horizontal sign of the directive (-1, 0, +1)
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Step::Left => -1.0,
            Step::Right => 1.0,
            Step::Neutral => 0.0,
        }
    }

    pub fn from_coin(right: bool) -> Self {
        if right { Step::Right } else { Step::Left }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Left => "L",
            Step::Right => "R",
            Step::Neutral => "-",
        })
    }
}

/// Where a ball's steering comes from
#[derive(Debug, Clone, PartialEq)]
pub enum StepSource {
    /// Per-row walk chosen by the outcome generator
    ServerPattern(Vec<Step>),
    /// Horizontal offset from the drop point to the target sink centre
    DerivedFromOffset(f32),
}

impl StepSource {
    /// Prefer the walk the outcome carries; fall back to its sink's offset
    pub fn for_outcome(outcome: &DropOutcome, board: &BoardConfig) -> Self {
        if outcome.step_pattern.is_empty() {
            StepSource::DerivedFromOffset(board.sink_offset(outcome.bin_index))
        } else {
            StepSource::ServerPattern(outcome.step_pattern.clone())
        }
    }
}

/// Produce exactly `board.rows` directives, clipping or padding with Neutral
pub fn reconcile(source: &StepSource, board: &BoardConfig) -> Vec<Step> {
    let rows = board.rows;
    let mut steps = match source {
        StepSource::ServerPattern(pattern) => {
            if pattern.len() != rows {
                log::debug!(
                    "Server pattern has {} steps for {} rows, fitting with Neutral",
                    pattern.len(),
                    rows
                );
            }
            pattern.iter().copied().take(rows).collect::<Vec<_>>()
        }
        StepSource::DerivedFromOffset(offset) => {
            let needed = (offset.abs() / board.lattice_pitch()).round() as usize;
            if needed > rows {
                log::debug!("Offset {offset} needs {needed} steps, clipping to {rows}");
            }
            let direction = if *offset >= 0.0 { Step::Right } else { Step::Left };
            vec![direction; needed.min(rows)]
        }
    };
    steps.resize(rows, Step::Neutral);
    steps
}

/// Right-step count of a sequence (the bin a clean replay lands in)
pub fn right_count(steps: &[Step]) -> usize {
    steps.iter().filter(|s| **s == Step::Right).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardConfig {
        BoardConfig::default()
    }

    #[test]
    fn test_server_pattern_used_verbatim() {
        let pattern: Vec<Step> = (0..16).map(|i| Step::from_coin(i % 3 == 0)).collect();
        let steps = reconcile(&StepSource::ServerPattern(pattern.clone()), &board());
        assert_eq!(steps, pattern);
    }

    #[test]
    fn test_short_pattern_padded_with_neutral() {
        let steps = reconcile(&StepSource::ServerPattern(vec![Step::Right; 10]), &board());
        assert_eq!(steps.len(), 16);
        assert!(steps[..10].iter().all(|s| *s == Step::Right));
        assert!(steps[10..].iter().all(|s| *s == Step::Neutral));
    }

    #[test]
    fn test_long_pattern_clipped() {
        let steps = reconcile(&StepSource::ServerPattern(vec![Step::Left; 20]), &board());
        assert_eq!(steps, vec![Step::Left; 16]);
    }

    #[test]
    fn test_derived_from_offset() {
        // Sink 11 sits three sink widths right of centre: six lattice pitches
        let offset = board().sink_offset(11);
        let steps = reconcile(&StepSource::DerivedFromOffset(offset), &board());
        assert_eq!(steps.len(), 16);
        assert!(steps[..6].iter().all(|s| *s == Step::Right));
        assert!(steps[6..].iter().all(|s| *s == Step::Neutral));
    }

    #[test]
    fn test_derived_left_and_zero_offsets() {
        let left = reconcile(&StepSource::DerivedFromOffset(-2.0 * 36.0), &board());
        assert_eq!(&left[..4], &[Step::Left; 4]);
        assert_eq!(left[4], Step::Neutral);

        let centre = reconcile(&StepSource::DerivedFromOffset(0.0), &board());
        assert_eq!(centre, vec![Step::Neutral; 16]);
    }

    #[test]
    fn test_derived_offset_clipped_to_rows() {
        let steps = reconcile(&StepSource::DerivedFromOffset(10_000.0), &board());
        assert_eq!(steps, vec![Step::Right; 16]);
    }

    #[test]
    fn test_step_wire_names() {
        let json = serde_json::to_string(&[Step::Left, Step::Right, Step::Neutral]).unwrap();
        assert_eq!(json, r#"["L","R",""]"#);
        let back: Vec<Step> = serde_json::from_str(r#"["R","L"]"#).unwrap();
        assert_eq!(back, vec![Step::Right, Step::Left]);
    }

    #[test]
    fn test_right_count() {
        assert_eq!(right_count(&[Step::Right, Step::Left, Step::Neutral, Step::Right]), 2);
    }
}
