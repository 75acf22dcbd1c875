//! Shared, versioned payout table
//!
//! One table, owned by the authoritative side and handed to the board at
//! startup. Sinks read their multipliers from it and the wire response names
//! its version, so the two halves cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::binomial;
use crate::error::{ConfigError, PlinkoError};

/// Payouts for the 16-row board, edges highest with a dip at the centre bin
const STANDARD_MULTIPLIERS: [f64; 17] = [
    16.0, 9.0, 2.0, 1.4, 1.4, 1.2, 1.1, 1.0, 0.5, 1.0, 1.1, 1.2, 1.4, 1.4, 2.0, 9.0, 16.0,
];

/// Bin index -> payout multiplier, total over `[0, rows]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierTable {
    pub version: u32,
    entries: Vec<f64>,
}

impl Default for MultiplierTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::ops::Index<usize> for MultiplierTable {
    type Output = f64;

    fn index(&self, bin: usize) -> &f64 {
        &self.entries[bin]
    }
}

impl MultiplierTable {
    pub const STANDARD_VERSION: u32 = 1;

    /// The reference 16-row table
    pub fn standard() -> Self {
        Self {
            version: Self::STANDARD_VERSION,
            entries: STANDARD_MULTIPLIERS.to_vec(),
        }
    }

    /// Build and validate a custom table for a board with `rows` deflection rows
    pub fn new(version: u32, entries: Vec<f64>, rows: usize) -> Result<Self, ConfigError> {
        let table = Self { version, entries };
        table.validate(rows)?;
        Ok(table)
    }

    /// Deflection rows this table covers
    pub fn rows(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[f64] {
        &self.entries
    }

    pub fn get(&self, bin: usize) -> Option<f64> {
        self.entries.get(bin).copied()
    }

    /// Checked lookup for values arriving from outside the generator
    pub fn multiplier(&self, bin: usize) -> Result<f64, PlinkoError> {
        self.get(bin).ok_or(PlinkoError::InvalidBinIndex {
            bin,
            bins: self.entries.len(),
        })
    }

    /// Total over `[0, rows]`, symmetric, finite and non-negative
    pub fn validate(&self, rows: usize) -> Result<(), ConfigError> {
        if self.entries.len() != rows + 1 {
            return Err(ConfigError::TableLength {
                expected: rows + 1,
                actual: self.entries.len(),
            });
        }
        if let Some(index) = self
            .entries
            .iter()
            .position(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(ConfigError::InvalidMultiplier { index });
        }
        if let Some(index) = (0..self.entries.len()).find(|&i| self.entries[i] != self.entries[rows - i]) {
            return Err(ConfigError::AsymmetricTable { index });
        }
        Ok(())
    }

    /// P(bin = k) for a fair walk: C(rows, k) / 2^rows
    pub fn bin_probability(&self, bin: usize) -> f64 {
        let rows = self.rows();
        binomial(rows, bin) / 2f64.powi(rows as i32)
    }

    /// Expected multiplier per drop (return to player)
    pub fn expected_return(&self) -> f64 {
        self.entries
            .iter()
            .enumerate()
            .map(|(bin, m)| self.bin_probability(bin) * m)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_total_and_symmetric() {
        let table = MultiplierTable::standard();
        table.validate(16).unwrap();
        assert_eq!(table.len(), 17);
        for i in 0..=16 {
            assert_eq!(table[i], table[16 - i], "asymmetric at {i}");
        }
    }

    #[test]
    fn test_edges_pay_most_and_centre_dips() {
        let table = MultiplierTable::standard();
        assert_eq!(table[0], 16.0);
        assert_eq!(table[16], 16.0);
        assert_eq!(table[8], 0.5);
        assert!(table[8] < table[7] && table[8] < table[9]);
    }

    #[test]
    fn test_asymmetric_table_rejected() {
        let mut entries = STANDARD_MULTIPLIERS.to_vec();
        entries[3] = 5.0;
        let err = MultiplierTable::new(2, entries, 16).unwrap_err();
        assert!(matches!(err, ConfigError::AsymmetricTable { index: 3 }));
    }

    #[test]
    fn test_partial_table_rejected() {
        // The 15-entry client-side table cannot price a 16-row board
        let entries = vec![16.0, 9.0, 2.0, 1.4, 1.4, 1.2, 1.1, 1.0, 1.1, 1.2, 1.4, 1.4, 2.0, 9.0, 16.0];
        let err = MultiplierTable::new(1, entries, 16).unwrap_err();
        assert!(matches!(err, ConfigError::TableLength { expected: 17, actual: 15 }));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let err = MultiplierTable::new(1, vec![-1.0, 0.5, -1.0], 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMultiplier { index: 0 }));
    }

    #[test]
    fn test_checked_lookup_out_of_range() {
        let table = MultiplierTable::standard();
        assert_eq!(table.multiplier(16).unwrap(), 16.0);
        assert!(matches!(
            table.multiplier(17),
            Err(PlinkoError::InvalidBinIndex { bin: 17, bins: 17 })
        ));
    }

    #[test]
    fn test_bin_probabilities_sum_to_one() {
        let table = MultiplierTable::standard();
        let total: f64 = (0..=16).map(|k| table.bin_probability(k)).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((table.bin_probability(8) - 12870.0 / 65536.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_return_of_standard_table() {
        let rtp = MultiplierTable::standard().expected_return();
        assert!((rtp - 0.989_987_182_617_187_5).abs() < 1e-9, "rtp = {rtp}");
        assert!(rtp < 1.0);
    }
}
