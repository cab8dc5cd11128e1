use crate::{AlignerError, DNA_GAP_EXT, DNA_GAP_OPEN, DNA_MATCH, DNA_MISMATCH};

/// Match/mismatch scores and affine gap costs.
///
/// Gap penalties are positive costs: a gap of length `k` subtracts
/// `gap_open + (k - 1) * gap_extend` from the alignment score. An extend
/// cost larger than the open cost is legal, though it makes runs of
/// separate single-residue gaps cheaper than one long gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    match_score: f64,
    mismatch_score: f64,
    gap_open: f64,
    gap_extend: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_score: DNA_MATCH,
            mismatch_score: DNA_MISMATCH,
            gap_open: DNA_GAP_OPEN,
            gap_extend: DNA_GAP_EXT,
        }
    }
}

impl ScoringConfig {
    /// Builds a validated scoring configuration.
    pub fn new(
        match_score: f64,
        mismatch_score: f64,
        gap_open: f64,
        gap_extend: f64,
    ) -> Result<Self, AlignerError> {
        let config = Self {
            match_score,
            mismatch_score,
            gap_open,
            gap_extend,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn match_score(&self) -> f64 {
        self.match_score
    }

    pub fn mismatch_score(&self) -> f64 {
        self.mismatch_score
    }

    pub fn gap_open(&self) -> f64 {
        self.gap_open
    }

    pub fn gap_extend(&self) -> f64 {
        self.gap_extend
    }

    /// Cost of a gap run of `length` residues (0 for an empty run).
    pub fn gap_cost(&self, length: usize) -> f64 {
        if length == 0 {
            0.0
        } else {
            self.gap_open + (length - 1) as f64 * self.gap_extend
        }
    }

    /// Scores an aligned symbol pair by case-insensitive identity.
    ///
    /// Ambiguity codes get no special weighting: `N` matches only `N`.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> f64 {
        if a.eq_ignore_ascii_case(&b) {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    pub fn validate(&self) -> Result<(), AlignerError> {
        let fields = [
            ("match_score", self.match_score),
            ("mismatch_score", self.mismatch_score),
            ("gap_open", self.gap_open),
            ("gap_extend", self.gap_extend),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AlignerError::ConfigurationError(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        if self.gap_open < 0.0 || self.gap_extend < 0.0 {
            return Err(AlignerError::ConfigurationError(format!(
                "gap penalties are costs and cannot be negative (open {}, extend {})",
                self.gap_open, self.gap_extend
            )));
        }
        Ok(())
    }
}

/// Column counts of a finished alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: u32,
    pub mismatches: u32,
    pub gaps: u32,
    pub gap_opens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_case_insensitive() {
        let scoring = ScoringConfig::new(2.0, -1.0, 3.0, 1.0).unwrap();
        assert_eq!(scoring.score(b'A', b'a'), 2.0);
        assert_eq!(scoring.score(b'g', b'G'), 2.0);
        assert_eq!(scoring.score(b'A', b'C'), -1.0);
    }

    #[test]
    fn test_ambiguity_codes_scored_by_identity() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.score(b'N', b'n'), DNA_MATCH);
        assert_eq!(scoring.score(b'N', b'A'), DNA_MISMATCH);
    }

    #[test]
    fn test_gap_cost() {
        let scoring = ScoringConfig::new(1.0, -1.0, 2.0, 1.0).unwrap();
        assert_eq!(scoring.gap_cost(0), 0.0);
        assert_eq!(scoring.gap_cost(1), 2.0);
        assert_eq!(scoring.gap_cost(4), 5.0);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(matches!(
            ScoringConfig::new(f64::NAN, -1.0, 2.0, 1.0),
            Err(AlignerError::ConfigurationError(_))
        ));
        assert!(matches!(
            ScoringConfig::new(1.0, -1.0, f64::INFINITY, 1.0),
            Err(AlignerError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_rejects_negative_gap_penalties() {
        assert!(matches!(
            ScoringConfig::new(1.0, -1.0, -2.0, -1.0),
            Err(AlignerError::ConfigurationError(_))
        ));
        assert!(ScoringConfig::new(1.0, -1.0, 2.0, -0.5).is_err());
    }

    #[test]
    fn test_allows_unconventional_configs() {
        // extend > open and mismatch > match are discouraged but legal
        assert!(ScoringConfig::new(1.0, -1.0, 1.0, 5.0).is_ok());
        assert!(ScoringConfig::new(-1.0, 2.0, 0.0, 0.0).is_ok());
    }
}
