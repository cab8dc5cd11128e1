use crate::AlignerError;

/// Fraction of positions holding the same symbol, compared case-insensitively.
///
/// Ungapped: both sequences must have the same number of characters. Two
/// empty sequences are identical.
pub fn similarity(seq_a: &str, seq_b: &str) -> Result<f64, AlignerError> {
    let (len_a, len_b) = (seq_a.chars().count(), seq_b.chars().count());
    if len_a != len_b {
        return Err(AlignerError::LengthMismatchError {
            left: len_a,
            right: len_b,
        });
    }
    if len_a == 0 {
        return Ok(1.0);
    }

    let identical = seq_a
        .chars()
        .zip(seq_b.chars())
        .filter(|(x, y)| x.eq_ignore_ascii_case(y))
        .count();
    Ok(identical as f64 / len_a as f64)
}
