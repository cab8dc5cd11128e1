//! nucalign - pairwise nucleotide alignment
//!
//! ```bash
//! nucalign align GATTACA GCATGCU --mode local
//! nucalign similarity ACGT ACGA
//! nucalign search --query reads.fq --references refs.fa.gz --workers 8
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use nucalign::seqio::read_sequence_file;
use nucalign::{
    similarity, Aligner, AlignerConfig, AlignmentMode, AlignmentPool, AlignmentResult, Alphabet,
    ScoringConfig, DNA_GAP_EXT, DNA_GAP_OPEN, DNA_MATCH, DNA_MISMATCH,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// End-to-end (Needleman-Wunsch)
    Global,
    /// Best-scoring substrings (Smith-Waterman)
    Local,
}

impl From<ModeArg> for AlignmentMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Global => AlignmentMode::Global,
            ModeArg::Local => AlignmentMode::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlphabetArg {
    Dna,
    Rna,
    Nucleotide,
    Iupac,
}

impl From<AlphabetArg> for Alphabet {
    fn from(arg: AlphabetArg) -> Self {
        match arg {
            AlphabetArg::Dna => Alphabet::Dna,
            AlphabetArg::Rna => Alphabet::Rna,
            AlphabetArg::Nucleotide => Alphabet::Nucleotide,
            AlphabetArg::Iupac => Alphabet::Iupac,
        }
    }
}

#[derive(Args, Debug)]
struct ScoringArgs {
    /// Alignment mode
    #[arg(short = 'm', long = "mode", value_enum, default_value = "global")]
    mode: ModeArg,

    /// Score for identical symbols
    #[arg(long = "match", default_value_t = DNA_MATCH, allow_negative_numbers = true)]
    match_score: f64,

    /// Score for differing symbols
    #[arg(long = "mismatch", default_value_t = DNA_MISMATCH, allow_negative_numbers = true)]
    mismatch_score: f64,

    /// Cost of opening a gap
    #[arg(long = "gap-open", default_value_t = DNA_GAP_OPEN)]
    gap_open: f64,

    /// Cost of each further gap position
    #[arg(long = "gap-extend", default_value_t = DNA_GAP_EXT)]
    gap_extend: f64,

    /// Accepted symbols
    #[arg(short = 'a', long = "alphabet", value_enum, default_value = "iupac")]
    alphabet: AlphabetArg,
}

impl ScoringArgs {
    fn aligner(&self, workers: Option<usize>) -> Result<Aligner> {
        let scoring = ScoringConfig::new(
            self.match_score,
            self.mismatch_score,
            self.gap_open,
            self.gap_extend,
        )?;
        let mut config = AlignerConfig::default().with_alphabet(self.alphabet.into());
        if let Some(workers) = workers {
            config = config.with_workers(workers);
        }
        Ok(Aligner::new(config)
            .with_scoring(scoring)
            .with_alignment_mode(self.mode.into()))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align two sequences and print the alignment
    Align {
        seq_a: String,
        seq_b: String,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Ungapped identity of two equal-length sequences
    Similarity { seq_a: String, seq_b: String },
    /// Align the first query record against every reference record (TSV output)
    Search {
        /// FASTA/FASTQ file holding the query (gzip accepted)
        #[arg(short = 'q', long = "query")]
        query: PathBuf,
        /// FASTA/FASTQ file holding the references (gzip accepted)
        #[arg(short = 'r', long = "references")]
        references: PathBuf,
        /// Worker threads (default: available parallelism)
        #[arg(short = 'w', long = "workers")]
        workers: Option<usize>,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
}

/// nucalign - global and local alignment with affine gap penalties
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn write_alignment<W: Write>(out: &mut W, result: &AlignmentResult) -> io::Result<()> {
    let stats = result.stats();
    writeln!(out, "Score:    {}", result.score)?;
    writeln!(
        out,
        "Identity: {}/{} ({:.2}%)",
        stats.matches,
        result.alignment_length(),
        result.identity * 100.0
    )?;
    writeln!(out, "Gaps:     {} ({} opened)", stats.gaps, stats.gap_opens)?;
    writeln!(out, "A:        {}..{}", result.start_a, result.end_a)?;
    writeln!(out, "B:        {}..{}", result.start_b, result.end_b)?;
    writeln!(out, "CIGAR:    {}", result.cigar())?;
    writeln!(out)?;
    writeln!(out, "{}", result.aligned_a)?;
    let markers: String = result
        .aligned_a
        .bytes()
        .zip(result.aligned_b.bytes())
        .map(|(a, b)| if a == b { '|' } else if a == b'-' || b == b'-' { ' ' } else { '.' })
        .collect();
    writeln!(out, "{}", markers)?;
    writeln!(out, "{}", result.aligned_b)?;
    Ok(())
}

fn run_search(
    query: &Path,
    references: &Path,
    workers: Option<usize>,
    scoring: &ScoringArgs,
) -> Result<()> {
    let queries = read_sequence_file(query)
        .with_context(|| format!("reading query file {}", query.display()))?;
    let query = &queries[0];
    let references = read_sequence_file(references)
        .with_context(|| format!("reading reference file {}", references.display()))?;

    let mut pool = AlignmentPool::new(scoring.aligner(workers)?)?;
    log::info!(
        "aligning {} against {} references on {} workers",
        query.id,
        references.len(),
        pool.worker_count()
    );
    let sequences: Vec<String> = references.iter().map(|r| r.sequence.clone()).collect();
    let results = pool.align_one_to_many(&query.sequence, &sequences)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "query\treference\tscore\tidentity\tstart_a\tend_a\tstart_b\tend_b\tcigar"
    )?;
    for (reference, result) in references.iter().zip(results) {
        match result {
            Ok(result) => writeln!(
                out,
                "{}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{}\t{}",
                query.id,
                reference.id,
                result.score,
                result.identity,
                result.start_a,
                result.end_a,
                result.start_b,
                result.end_b,
                result.cigar()
            )?,
            Err(e) => log::warn!("skipping {}: {}", reference.id, e),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &cli.command {
        Command::Align {
            seq_a,
            seq_b,
            scoring,
        } => {
            let result = scoring.aligner(None)?.align(seq_a, seq_b)?;
            let stdout = io::stdout();
            write_alignment(&mut stdout.lock(), &result)?;
        }
        Command::Similarity { seq_a, seq_b } => {
            println!("{:.4}", similarity(seq_a, seq_b)?);
        }
        Command::Search {
            query,
            references,
            workers,
            scoring,
        } => run_search(query, references, *workers, scoring)?,
    }

    Ok(())
}
