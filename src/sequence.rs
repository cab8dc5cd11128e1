//! Nucleotide alphabets and normalized sequences.
//!
//! Input is accepted in any case and stored upper-cased. Validation stops
//! at the first symbol outside the declared alphabet.

use crate::AlignerError;

const DNA_SYMBOLS: &[u8] = b"ACGT";
const RNA_SYMBOLS: &[u8] = b"ACGU";
const NUCLEOTIDE_SYMBOLS: &[u8] = b"ACGTU";
const IUPAC_SYMBOLS: &[u8] = b"ACGTURYSWKMBDHVN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alphabet {
    /// A, C, G, T
    Dna,
    /// A, C, G, U
    Rna,
    /// A, C, G, T, U
    Nucleotide,
    /// Nucleotides plus IUPAC ambiguity codes.
    #[default]
    Iupac,
}

impl Alphabet {
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Alphabet::Dna => DNA_SYMBOLS,
            Alphabet::Rna => RNA_SYMBOLS,
            Alphabet::Nucleotide => NUCLEOTIDE_SYMBOLS,
            Alphabet::Iupac => IUPAC_SYMBOLS,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, symbol: u8) -> bool {
        self.symbols().contains(&symbol.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    data: Vec<u8>,
}

impl Sequence {
    /// Upper-cases `raw` and checks every symbol against `alphabet`.
    pub fn new(raw: &str, alphabet: Alphabet) -> Result<Self, AlignerError> {
        let mut data = Vec::with_capacity(raw.len());
        for (position, symbol) in raw.chars().enumerate() {
            if !symbol.is_ascii() || !alphabet.contains(symbol as u8) {
                return Err(AlignerError::InvalidInputError { symbol, position });
            }
            data.push((symbol as u8).to_ascii_uppercase());
        }
        Ok(Self { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII symbols pass validation.
        std::str::from_utf8(&self.data).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_to_uppercase() {
        let seq = Sequence::new("acGt", Alphabet::Dna).unwrap();
        assert_eq!(seq.as_str(), "ACGT");
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        let seq = Sequence::new("", Alphabet::Dna).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_reports_first_invalid_symbol() {
        let err = Sequence::new("ACXGZ", Alphabet::Iupac).unwrap_err();
        assert!(matches!(
            err,
            AlignerError::InvalidInputError {
                symbol: 'X',
                position: 2
            }
        ));
    }

    #[test]
    fn test_alphabets_differ_on_t_and_u() {
        assert!(Sequence::new("ACGU", Alphabet::Dna).is_err());
        assert!(Sequence::new("ACGT", Alphabet::Rna).is_err());
        assert!(Sequence::new("ACGTU", Alphabet::Nucleotide).is_ok());
    }

    #[test]
    fn test_iupac_accepts_ambiguity_codes() {
        assert!(Sequence::new("ACGTNRYswkm", Alphabet::Iupac).is_ok());
        assert!(Sequence::new("ACGTN", Alphabet::Nucleotide).is_err());
    }

    #[test]
    fn test_rejects_gap_symbol_and_non_ascii() {
        assert!(Sequence::new("AC-GT", Alphabet::Iupac).is_err());
        assert!(Sequence::new("ACGé", Alphabet::Iupac).is_err());
    }
}
