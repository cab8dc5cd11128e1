use crate::sequence::Alphabet;
use crate::{MAX_MATRIX_CELLS, MAX_SEQUENCE_SIZE};

/// Limits and defaults applied before any DP table is allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignerConfig {
    pub alphabet: Alphabet,
    pub max_sequence_length: usize,
    /// Upper bound on `(len_a + 1) * (len_b + 1)`. Each cell costs
    /// `matrix::BYTES_PER_CELL` (27) bytes, and every busy pool worker
    /// holds its own tables, so peak memory is about
    /// `workers * max_matrix_cells * 27` bytes.
    pub max_matrix_cells: usize,
    /// Worker threads used by batch alignment.
    pub workers: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::Iupac,
            max_sequence_length: MAX_SEQUENCE_SIZE,
            max_matrix_cells: MAX_MATRIX_CELLS,
            workers: default_workers(),
        }
    }
}

impl AlignerConfig {
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_max_sequence_length(mut self, length: usize) -> Self {
        self.max_sequence_length = length;
        self
    }

    pub fn with_max_matrix_cells(mut self, cells: usize) -> Self {
        self.max_matrix_cells = cells;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
