//! FASTA / FASTQ reader for alignment input.
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//!
//! @read_identifier optional description
//! ACGTACGT
//! +
//! IIIIHHHH
//! ```
//!
//! The format is taken from the first record marker (`>` or `@`). Gzip
//! input is recognised by its magic bytes and decompressed on the fly, so
//! `refs.fa.gz` and `reads.fq.gz` need no flag. FASTA sequences may span
//! several lines; FASTQ records are four lines each. Blank lines between
//! records are skipped. Symbols are kept as written, validation happens
//! when a record is aligned.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Enumerate;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;
use thiserror::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Error, Debug)]
pub enum SeqIoError {
    #[error("Failed to read sequence input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty sequence file")]
    EmptyFile,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Truncated FASTQ record '{id}' at end of input")]
    TruncatedRecord { id: String },

    #[error("FASTQ record '{id}': {quality} quality values for {sequence} bases")]
    QualityLengthMismatch {
        id: String,
        sequence: usize,
        quality: usize,
    },
}

pub type SeqIoResult<T> = Result<T, SeqIoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    Fastq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
    /// Phred string, FASTQ only.
    pub quality: Option<String>,
}

/// Reads a FASTA or FASTQ file, plain or gzip-compressed.
pub fn read_sequence_file<P: AsRef<Path>>(path: P) -> SeqIoResult<Vec<SequenceRecord>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
        debug!("reading {} as gzip", path.display());
        parse_sequences(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        parse_sequences(reader)
    }
}

pub fn parse_sequences_str(content: &str) -> SeqIoResult<Vec<SequenceRecord>> {
    parse_sequences(content.as_bytes())
}

/// Parses either format, chosen by the first non-blank character.
pub fn parse_sequences<R: BufRead>(reader: R) -> SeqIoResult<Vec<SequenceRecord>> {
    let mut lines = reader.lines().enumerate();
    let (index, first) = loop {
        match lines.next() {
            Some((index, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break (index, line);
                }
            }
            None => return Err(SeqIoError::EmptyFile),
        }
    };

    match detect_format(&first) {
        Some(SequenceFormat::Fasta) => parse_fasta(index, first, lines),
        Some(SequenceFormat::Fastq) => parse_fastq(index, first, lines),
        None => Err(SeqIoError::SequenceWithoutHeader(index + 1)),
    }
}

pub fn detect_format(first_line: &str) -> Option<SequenceFormat> {
    match first_line.trim_start().as_bytes().first() {
        Some(b'>') => Some(SequenceFormat::Fasta),
        Some(b'@') => Some(SequenceFormat::Fastq),
        _ => None,
    }
}

fn record_id(header: &str, index: usize) -> SeqIoResult<String> {
    match header.split_whitespace().next() {
        Some(id) => Ok(id.to_string()),
        None => Err(SeqIoError::InvalidFormat(format!(
            "Empty sequence identifier at line {}",
            index + 1
        ))),
    }
}

fn parse_fasta<R: BufRead>(
    first_index: usize,
    first: String,
    rest: Enumerate<Lines<R>>,
) -> SeqIoResult<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut current: Option<SequenceRecord> = None;

    let lines = std::iter::once((first_index, Ok(first))).chain(rest);
    for (index, line) in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(SequenceRecord {
                id: record_id(header, index)?,
                sequence: String::new(),
                quality: None,
            });
        } else {
            let record = current
                .as_mut()
                .ok_or(SeqIoError::SequenceWithoutHeader(index + 1))?;
            record
                .sequence
                .extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    records.extend(current);
    Ok(records)
}

fn parse_fastq<R: BufRead>(
    first_index: usize,
    first: String,
    mut rest: Enumerate<Lines<R>>,
) -> SeqIoResult<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut header = Some((first_index, first));

    while let Some((index, line)) = header.take() {
        let line = line.trim();
        let id = match line.strip_prefix('@') {
            Some(text) => record_id(text, index)?,
            None => {
                return Err(SeqIoError::InvalidFormat(format!(
                    "Expected '@' header at line {}",
                    index + 1
                )))
            }
        };

        let mut next_line = || -> SeqIoResult<(usize, String)> {
            match rest.next() {
                Some((index, line)) => Ok((index, line?.trim().to_string())),
                None => Err(SeqIoError::TruncatedRecord { id: id.clone() }),
            }
        };
        let (_, sequence) = next_line()?;
        let (separator_index, separator) = next_line()?;
        let (_, quality) = next_line()?;

        if !separator.starts_with('+') {
            return Err(SeqIoError::InvalidFormat(format!(
                "Expected '+' separator at line {}",
                separator_index + 1
            )));
        }
        if quality.len() != sequence.len() {
            return Err(SeqIoError::QualityLengthMismatch {
                id,
                sequence: sequence.len(),
                quality: quality.len(),
            });
        }
        records.push(SequenceRecord {
            id,
            sequence,
            quality: Some(quality),
        });

        for (index, line) in rest.by_ref() {
            let line = line?;
            if !line.trim().is_empty() {
                header = Some((index, line));
                break;
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_parse_multiline_records() {
        let records = parse_sequences_str(">seq1 first\nACGT\nTGCA\n\n>seq2\nacgu\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].sequence, "ACGTTGCA");
        assert_eq!(records[0].quality, None);
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, "acgu");
    }

    #[test]
    fn test_header_without_sequence_is_kept() {
        let records = parse_sequences_str(">empty\n>seq\nAC\n").unwrap();
        assert_eq!(records[0].sequence, "");
        assert_eq!(records[1].sequence, "AC");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_sequences_str("\n\n"), Err(SeqIoError::EmptyFile)));
        assert!(matches!(parse_sequences_str(""), Err(SeqIoError::EmptyFile)));
    }

    #[test]
    fn test_sequence_before_header() {
        assert!(matches!(
            parse_sequences_str("\nACGT\n>seq1\nACGT\n"),
            Err(SeqIoError::SequenceWithoutHeader(2))
        ));
    }

    #[test]
    fn test_empty_identifier() {
        assert!(matches!(
            parse_sequences_str(">seq1\nAC\n> \nGT\n"),
            Err(SeqIoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(">x"), Some(SequenceFormat::Fasta));
        assert_eq!(detect_format("  @x"), Some(SequenceFormat::Fastq));
        assert_eq!(detect_format("ACGT"), None);
    }

    #[test]
    fn test_parse_fastq_records() {
        let content = "@read1 lane=1\nACGT\n+\nIIII\n\n@read2\nGGA\n+read2\n#!I\n";
        let records = parse_sequences_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "read1");
        assert_eq!(records[0].sequence, "ACGT");
        assert_eq!(records[0].quality.as_deref(), Some("IIII"));
        assert_eq!(records[1].id, "read2");
        assert_eq!(records[1].quality.as_deref(), Some("#!I"));
    }

    #[test]
    fn test_fastq_quality_length_checked() {
        let result = parse_sequences_str("@read1\nACGT\n+\nIII\n");
        assert!(matches!(
            result,
            Err(SeqIoError::QualityLengthMismatch {
                sequence: 4,
                quality: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_fastq_separator_required() {
        assert!(matches!(
            parse_sequences_str("@read1\nACGT\nIIII\nIIII\n"),
            Err(SeqIoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fastq_header_required_between_records() {
        assert!(matches!(
            parse_sequences_str("@read1\nAC\n+\nII\nGT\n+\nII\n"),
            Err(SeqIoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">ref1\nGCATGCU\n>ref2\nGATTACA").unwrap();
        let records = read_sequence_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, "GATTACA");
    }

    #[test]
    fn test_parse_fastq_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fq");
        std::fs::write(&path, "@r1\nGATTACA\n+\nIIIIIII\n@r2\nGCATGCU\n+\nHHHHHHH\n").unwrap();
        let records = read_sequence_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "r2");
        assert_eq!(records[1].sequence, "GCATGCU");
    }

    #[test]
    fn test_parse_gzip_fasta_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.fa.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b">ref1\nGCAT\nGCU\n>ref2\nGATTACA\n").unwrap();
        encoder.finish().unwrap();

        let records = read_sequence_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, "GCATGCU");
        assert_eq!(records[1].id, "ref2");
    }

    #[test]
    fn test_truncated_fastq_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.fq");
        std::fs::write(&path, "@r1\nACGT\n+\nIIII\n@r2\nACGT\n+\n").unwrap();
        let result = read_sequence_file(&path);
        assert!(matches!(result, Err(SeqIoError::TruncatedRecord { ref id }) if id == "r2"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_sequence_file(dir.path().join("missing.fa"));
        assert!(matches!(result, Err(SeqIoError::IoError(_))));
    }
}
