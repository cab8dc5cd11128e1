//! Gotoh three-state dynamic programming tables.
//!
//! For a pair `a` (length m) and `b` (length n) every cell `(i, j)` of the
//! `(m + 1) x (n + 1)` grid holds three scores:
//!
//! - `m`: best alignment of `a[..i]`, `b[..j]` ending with `a[i-1]` over `b[j-1]`
//! - `ix`: best alignment ending with `a[i-1]` over a gap (gap in `b`)
//! - `iy`: best alignment ending with a gap over `b[j-1]` (gap in `a`)
//!
//! and one back-pointer per state naming the predecessor state. Ties
//! resolve to `Match`, then `GapInA`, then `GapInB`; a gap opened from
//! `Match` wins over an equally scoring extension.

use crate::alignment_mode::AlignmentMode;
use crate::scoring::ScoringConfig;

/// Score of a state that no valid path can reach.
pub const UNREACHABLE: f64 = f64::NEG_INFINITY;

/// Heap bytes one grid cell costs: three scores plus three pointers.
pub const BYTES_PER_CELL: usize =
    std::mem::size_of::<Cell>() + std::mem::size_of::<Pointers>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    Match,
    /// Residue of `a` against a gap (the `ix` table).
    GapInB,
    /// Residue of `b` against a gap (the `iy` table).
    GapInA,
    /// Path origin, or a local restart.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub m: f64,
    pub ix: f64,
    pub iy: f64,
}

impl Cell {
    const UNREACHABLE: Cell = Cell {
        m: UNREACHABLE,
        ix: UNREACHABLE,
        iy: UNREACHABLE,
    };

    /// Highest of the three states under the tie-break priority.
    #[inline]
    pub fn best(&self) -> (f64, TraceState) {
        let mut best = (self.m, TraceState::Match);
        if self.iy > best.0 {
            best = (self.iy, TraceState::GapInA);
        }
        if self.ix > best.0 {
            best = (self.ix, TraceState::GapInB);
        }
        best
    }

    pub fn get(&self, state: TraceState) -> f64 {
        match state {
            TraceState::Match => self.m,
            TraceState::GapInB => self.ix,
            TraceState::GapInA => self.iy,
            TraceState::Stop => UNREACHABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointers {
    pub m: TraceState,
    pub ix: TraceState,
    pub iy: TraceState,
}

impl Pointers {
    const STOP: Pointers = Pointers {
        m: TraceState::Stop,
        ix: TraceState::Stop,
        iy: TraceState::Stop,
    };

    pub fn get(&self, state: TraceState) -> TraceState {
        match state {
            TraceState::Match => self.m,
            TraceState::GapInB => self.ix,
            TraceState::GapInA => self.iy,
            TraceState::Stop => TraceState::Stop,
        }
    }
}

/// Row-major dense grid.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Grid<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

/// Completed DP tables for one sequence pair.
pub struct AlignmentMatrices {
    scores: Grid<Cell>,
    pointers: Grid<Pointers>,
    mode: AlignmentMode,
}

/// Cell and state where traceback begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndCell {
    pub i: usize,
    pub j: usize,
    pub state: TraceState,
    pub score: f64,
}

impl AlignmentMatrices {
    /// Number of grid cells needed for a pair of the given lengths.
    pub fn cell_count(len_a: usize, len_b: usize) -> usize {
        len_a.saturating_add(1).saturating_mul(len_b.saturating_add(1))
    }

    /// Fills all three tables in row-major order.
    pub fn build(a: &[u8], b: &[u8], scoring: &ScoringConfig, mode: AlignmentMode) -> Self {
        let rows = a.len() + 1;
        let cols = b.len() + 1;
        let mut scores = Grid::new(rows, cols, Cell::UNREACHABLE);
        let mut pointers = Grid::new(rows, cols, Pointers::STOP);

        let gap_open = scoring.gap_open();
        let gap_extend = scoring.gap_extend();
        let local = mode == AlignmentMode::Local;

        for i in 0..rows {
            for j in 0..cols {
                let (m, m_from) = if i > 0 && j > 0 {
                    let (prev, from) = scores.get(i - 1, j - 1).best();
                    let value = scoring.score(a[i - 1], b[j - 1]) + prev;
                    if local && value <= 0.0 {
                        (0.0, TraceState::Stop)
                    } else {
                        (value, from)
                    }
                } else if local || (i == 0 && j == 0) {
                    (0.0, TraceState::Stop)
                } else {
                    (UNREACHABLE, TraceState::Stop)
                };

                let (ix, ix_from) = if i > 0 {
                    let up = scores.get(i - 1, j);
                    open_or_extend(up.m - gap_open, up.ix - gap_extend, TraceState::GapInB)
                } else {
                    (UNREACHABLE, TraceState::Stop)
                };

                // Row i is still being written, but (i, j - 1) is already final.
                let (iy, iy_from) = if j > 0 {
                    let left = scores.get(i, j - 1);
                    open_or_extend(left.m - gap_open, left.iy - gap_extend, TraceState::GapInA)
                } else {
                    (UNREACHABLE, TraceState::Stop)
                };

                scores.set(i, j, Cell { m, ix, iy });
                pointers.set(
                    i,
                    j,
                    Pointers {
                        m: m_from,
                        ix: ix_from,
                        iy: iy_from,
                    },
                );
            }
        }

        Self {
            scores,
            pointers,
            mode,
        }
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn rows(&self) -> usize {
        self.scores.rows()
    }

    pub fn cols(&self) -> usize {
        self.scores.cols()
    }

    pub fn cell(&self, i: usize, j: usize) -> Cell {
        self.scores.get(i, j)
    }

    pub fn pointers(&self, i: usize, j: usize) -> Pointers {
        self.pointers.get(i, j)
    }

    /// Global: the bottom-right cell in its best state. Local: the first
    /// maximum of `m` in row-major order, or the origin when nothing
    /// scores above zero.
    pub fn end_cell(&self) -> EndCell {
        match self.mode {
            AlignmentMode::Global => {
                let (i, j) = (self.rows() - 1, self.cols() - 1);
                let (score, state) = self.cell(i, j).best();
                EndCell { i, j, state, score }
            }
            AlignmentMode::Local => {
                let mut end = EndCell {
                    i: 0,
                    j: 0,
                    state: TraceState::Match,
                    score: 0.0,
                };
                for i in 1..self.rows() {
                    for j in 1..self.cols() {
                        let m = self.cell(i, j).m;
                        if m > end.score {
                            end = EndCell {
                                i,
                                j,
                                state: TraceState::Match,
                                score: m,
                            };
                        }
                    }
                }
                end
            }
        }
    }
}

#[inline]
fn open_or_extend(open: f64, extend: f64, gap_state: TraceState) -> (f64, TraceState) {
    if open >= extend {
        (open, TraceState::Match)
    } else {
        (extend, gap_state)
    }
}
