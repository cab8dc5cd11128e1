use crate::matrix::{AlignmentMatrices, TraceState};
use crate::scoring::AlignmentStats;
use crate::{AlignerError, AlignmentMode, GAP_SYMBOL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackOperation {
    Match,
    Mismatch,
    /// Residue of `b` against a gap.
    Insertion,
    /// Residue of `a` against a gap.
    Deletion,
}

impl TracebackOperation {
    fn cigar_code(&self) -> char {
        match self {
            TracebackOperation::Match => '=',
            TracebackOperation::Mismatch => 'X',
            TracebackOperation::Insertion => 'I',
            TracebackOperation::Deletion => 'D',
        }
    }
}

/// Outcome of one alignment call.
///
/// Coordinates are half-open ranges into the ungapped inputs, so
/// `a[start_a..end_a]` is the aligned part of `a` with gaps removed.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub score: f64,
    pub aligned_a: String,
    pub aligned_b: String,
    pub operations: Vec<TracebackOperation>,
    pub start_a: usize,
    pub end_a: usize,
    pub start_b: usize,
    pub end_b: usize,
    pub identity: f64,
}

impl AlignmentResult {
    /// Number of aligned columns, gap columns included.
    pub fn alignment_length(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Matching columns over all columns. Gap columns count against it.
    pub fn identity_fraction(&self) -> f64 {
        self.identity
    }

    pub fn stats(&self) -> AlignmentStats {
        let mut stats = AlignmentStats::default();
        let mut previous = None;
        for &op in &self.operations {
            match op {
                TracebackOperation::Match => stats.matches += 1,
                TracebackOperation::Mismatch => stats.mismatches += 1,
                TracebackOperation::Insertion | TracebackOperation::Deletion => {
                    stats.gaps += 1;
                    if previous != Some(op) {
                        stats.gap_opens += 1;
                    }
                }
            }
            previous = Some(op);
        }
        stats
    }

    /// Run-length encoded operations, e.g. `4=1X2D3=`.
    pub fn cigar(&self) -> String {
        let mut cigar = String::new();
        let mut ops = self.operations.iter().peekable();
        while let Some(&op) = ops.next() {
            let mut run = 1;
            while ops.peek() == Some(&&op) {
                ops.next();
                run += 1;
            }
            cigar.push_str(&run.to_string());
            cigar.push(op.cigar_code());
        }
        cigar
    }
}

/// Walks completed matrices back from the optimal cell.
pub struct Traceback<'a> {
    matrices: &'a AlignmentMatrices,
    seq_a: &'a [u8],
    seq_b: &'a [u8],
}

impl<'a> Traceback<'a> {
    pub fn new(matrices: &'a AlignmentMatrices, seq_a: &'a [u8], seq_b: &'a [u8]) -> Self {
        Self {
            matrices,
            seq_a,
            seq_b,
        }
    }

    pub fn reconstruct_alignment(&self) -> Result<AlignmentResult, AlignerError> {
        let end = self.matrices.end_cell();
        let local = self.matrices.mode() == AlignmentMode::Local;

        let mut aligned_a = Vec::new();
        let mut aligned_b = Vec::new();
        let mut operations = Vec::new();

        let (mut i, mut j) = (end.i, end.j);
        let mut state = end.state;

        loop {
            if local {
                if state == TraceState::Match && self.matrices.cell(i, j).m <= 0.0 {
                    break;
                }
            } else if i == 0 && j == 0 {
                break;
            }

            let pointers = self.matrices.pointers(i, j);
            match state {
                TraceState::Match => {
                    if i == 0 || j == 0 {
                        return Err(self.invalid_step(state, i, j));
                    }
                    let (ca, cb) = (self.seq_a[i - 1], self.seq_b[j - 1]);
                    aligned_a.push(ca);
                    aligned_b.push(cb);
                    operations.push(if ca == cb {
                        TracebackOperation::Match
                    } else {
                        TracebackOperation::Mismatch
                    });
                    i -= 1;
                    j -= 1;
                }
                TraceState::GapInB => {
                    if i == 0 {
                        return Err(self.invalid_step(state, i, j));
                    }
                    aligned_a.push(self.seq_a[i - 1]);
                    aligned_b.push(GAP_SYMBOL);
                    operations.push(TracebackOperation::Deletion);
                    i -= 1;
                }
                TraceState::GapInA => {
                    if j == 0 {
                        return Err(self.invalid_step(state, i, j));
                    }
                    aligned_a.push(GAP_SYMBOL);
                    aligned_b.push(self.seq_b[j - 1]);
                    operations.push(TracebackOperation::Insertion);
                    j -= 1;
                }
                TraceState::Stop => return Err(self.invalid_step(state, i, j)),
            }
            state = pointers.get(state);
        }

        // Built back to front
        aligned_a.reverse();
        aligned_b.reverse();
        operations.reverse();

        let matches = operations
            .iter()
            .filter(|&&op| op == TracebackOperation::Match)
            .count();
        let identity = if operations.is_empty() {
            // Two empty inputs are trivially identical.
            if self.seq_a.is_empty() && self.seq_b.is_empty() {
                1.0
            } else {
                0.0
            }
        } else {
            matches as f64 / operations.len() as f64
        };

        // Empty local alignments report the origin, not where the scan stopped.
        let (start_a, start_b, end_a, end_b) = if operations.is_empty() && local {
            (0, 0, 0, 0)
        } else {
            (i, j, end.i, end.j)
        };

        Ok(AlignmentResult {
            score: end.score,
            aligned_a: String::from_utf8_lossy(&aligned_a).into_owned(),
            aligned_b: String::from_utf8_lossy(&aligned_b).into_owned(),
            operations,
            start_a,
            end_a,
            start_b,
            end_b,
            identity,
        })
    }

    fn invalid_step(&self, state: TraceState, i: usize, j: usize) -> AlignerError {
        AlignerError::TracebackError(format!(
            "no valid predecessor for state {:?} at cell ({}, {})",
            state, i, j
        ))
    }
}
