use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentMode {
    Global, // Needleman-Wunsch
    Local,  // Smith-Waterman
}

impl AlignmentMode {
    pub fn name(&self) -> &'static str {
        match self {
            AlignmentMode::Global => "global",
            AlignmentMode::Local => "local",
        }
    }
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    pub mode: AlignmentMode,
    pub scoring: ScoringConfig,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::Global,
            scoring: ScoringConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DNA_GAP_EXT, DNA_GAP_OPEN, DNA_MATCH, DNA_MISMATCH};

    #[test]
    fn test_default_params_use_dna_preset() {
        let params = AlignmentParams::default();
        assert_eq!(params.mode, AlignmentMode::Global);
        assert_eq!(params.scoring.match_score(), DNA_MATCH);
        assert_eq!(params.scoring.mismatch_score(), DNA_MISMATCH);
        assert_eq!(params.scoring.gap_open(), DNA_GAP_OPEN);
        assert_eq!(params.scoring.gap_extend(), DNA_GAP_EXT);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(AlignmentMode::Global.to_string(), "global");
        assert_eq!(AlignmentMode::Local.to_string(), "local");
    }
}
