//! Pairwise nucleotide alignment with affine gap penalties.
//!
//! Global (Needleman-Wunsch) and local (Smith-Waterman) alignment over the
//! three-state Gotoh recurrences, plus an ungapped identity comparator.
//!
//! ```
//! use nucalign::{align, AlignmentMode, ScoringConfig};
//!
//! let scoring = ScoringConfig::new(1.0, -1.0, 2.0, 1.0).unwrap();
//! let result = align("GATTACA", "GCATGCU", &scoring, AlignmentMode::Local).unwrap();
//! assert_eq!(result.score, 2.0);
//! assert_eq!(result.aligned_a, "AT");
//! ```

use std::time::Instant;

use log::{debug, warn};
use thiserror::Error;

pub mod alignment_mode;
pub mod batch;
pub mod config;
pub mod matrix;
pub mod scoring;
pub mod seqio;
pub mod sequence;
pub mod similarity;
pub mod traceback;

pub use alignment_mode::{AlignmentMode, AlignmentParams};
pub use batch::AlignmentPool;
pub use config::AlignerConfig;
pub use scoring::{AlignmentStats, ScoringConfig};
pub use sequence::{Alphabet, Sequence};
pub use similarity::similarity;
pub use traceback::{AlignmentResult, TracebackOperation};

use matrix::AlignmentMatrices;
use traceback::Traceback;

pub const MAX_SEQUENCE_SIZE: usize = 10_000_000;
/// Default DP cell limit; at `matrix::BYTES_PER_CELL` bytes a cell this
/// caps one call at roughly 450 MB.
pub const MAX_MATRIX_CELLS: usize = 1 << 24;
pub const GAP_SYMBOL: u8 = b'-';

// DNA scoring parameters
pub const DNA_MATCH: f64 = 1.0;
pub const DNA_MISMATCH: f64 = -3.0;
pub const DNA_GAP_OPEN: f64 = 3.0;
pub const DNA_GAP_EXT: f64 = 2.0;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid symbol {symbol:?} at position {position}")]
    InvalidInputError { symbol: char, position: usize },
    #[error("Sequences differ in length: {left} vs {right}")]
    LengthMismatchError { left: usize, right: usize },
    #[error("Sequence too large: {0}")]
    SequenceTooLarge(usize),
    #[error("Alignment matrix too large: {0} cells")]
    MatrixTooLarge(usize),
    #[error("Traceback error: {0}")]
    TracebackError(String),
    #[error("Worker error: {0}")]
    WorkerError(String),
}

/// Stateless aligner: every call allocates and drops its own tables, so
/// one instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignerConfig,
    params: AlignmentParams,
}

impl Aligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            params: AlignmentParams::default(),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.params.scoring = scoring;
        self
    }

    pub fn with_alignment_mode(mut self, mode: AlignmentMode) -> Self {
        self.params.mode = mode;
        self
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }

    /// Normalizes and validates both inputs, then aligns them.
    pub fn align(&self, seq_a: &str, seq_b: &str) -> Result<AlignmentResult, AlignerError> {
        let alphabet = self.config.alphabet;
        let seq_a = Sequence::new(seq_a, alphabet)?;
        let seq_b = Sequence::new(seq_b, alphabet)?;
        self.align_sequences(&seq_a, &seq_b)
    }

    /// Aligns two already validated sequences.
    pub fn align_sequences(
        &self,
        seq_a: &Sequence,
        seq_b: &Sequence,
    ) -> Result<AlignmentResult, AlignerError> {
        let scoring = &self.params.scoring;
        scoring.validate()?;
        self.check_limits(seq_a.len(), seq_b.len())?;

        let start_time = Instant::now();
        let matrices =
            AlignmentMatrices::build(seq_a.as_bytes(), seq_b.as_bytes(), scoring, self.params.mode);
        let result =
            Traceback::new(&matrices, seq_a.as_bytes(), seq_b.as_bytes()).reconstruct_alignment()?;

        debug!(
            "{} alignment {}x{}: score {} over {} columns in {:?}",
            self.params.mode,
            seq_a.len(),
            seq_b.len(),
            result.score,
            result.alignment_length(),
            start_time.elapsed()
        );
        Ok(result)
    }

    fn check_limits(&self, len_a: usize, len_b: usize) -> Result<(), AlignerError> {
        let longest = len_a.max(len_b);
        if longest > self.config.max_sequence_length {
            warn!(
                "rejecting sequence of length {} (limit {})",
                longest, self.config.max_sequence_length
            );
            return Err(AlignerError::SequenceTooLarge(longest));
        }
        let cells = AlignmentMatrices::cell_count(len_a, len_b);
        if cells > self.config.max_matrix_cells {
            warn!(
                "rejecting {}x{} alignment: {} cells exceeds limit {}",
                len_a, len_b, cells, self.config.max_matrix_cells
            );
            return Err(AlignerError::MatrixTooLarge(cells));
        }
        Ok(())
    }
}

/// Aligns `seq_a` against `seq_b` with the default configuration.
pub fn align(
    seq_a: &str,
    seq_b: &str,
    scoring: &ScoringConfig,
    mode: AlignmentMode,
) -> Result<AlignmentResult, AlignerError> {
    Aligner::default()
        .with_scoring(*scoring)
        .with_alignment_mode(mode)
        .align(seq_a, seq_b)
}
