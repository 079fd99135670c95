use crate::recon::partition::DEFAULT_PARTITION_SPAN;
use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="bamseq",
          version=&**FULL_VERSION,
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2019-{}
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Consensus sequence reconstruction from aligned reads")]
    Consensus(ConsensusArgs),
    #[clap(about = "Synonymous/nonsynonymous codon classification")]
    Codons(CodonArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("consensus")))]
#[command(arg_required_else_help(true))]
pub struct ConsensusArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "Indexed BAM file with aligned reads")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output FASTA path")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: String,

    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "seq-id")]
    #[clap(help = "Identifier of the output FASTA record")]
    #[clap(value_name = "SEQ_ID")]
    #[arg(value_parser = check_nonempty)]
    pub seq_id: String,

    #[clap(long = "ref-seq")]
    #[clap(help = "Only use reads aligned to references whose name contains this string")]
    #[clap(value_name = "NAME")]
    #[arg(value_parser = check_nonempty)]
    pub ref_seq: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "tmp-dir")]
    #[clap(help = "Directory for intermediate partition files [default: system temp dir]")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub tmp_dir: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "partition-span")]
    #[clap(help = "Reference positions per intermediate partition")]
    #[clap(value_name = "SPAN")]
    #[clap(default_value_t = DEFAULT_PARTITION_SPAN)]
    #[arg(value_parser = positive_span)]
    pub partition_span: i64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "gap-override-ratio")]
    #[clap(help = "Minimum ratio of a base to the gap count for the base to replace a majority gap")]
    #[clap(value_name = "RATIO")]
    #[clap(default_value = "0.75")]
    #[arg(value_parser = ensure_unit_float)]
    pub gap_override_ratio: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-insertion-support")]
    #[clap(help = "Fraction of spanning reads that must carry an insertion for it to be kept")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.5")]
    #[arg(value_parser = ensure_unit_float)]
    pub min_insertion_support: f64,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("codons")))]
#[command(arg_required_else_help(true))]
pub struct CodonArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "Indexed BAM files with aligned reads, one report pair per file")]
    #[clap(value_name = "READS")]
    #[clap(num_args = 1..)]
    #[arg(value_parser = check_file_exists)]
    pub reads_paths: Vec<PathBuf>,

    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "genome")]
    #[clap(help = "Path to single-record reference FASTA (with .fai index)")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub genome_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'R')]
    #[clap(long = "regions")]
    #[clap(help = "CSV file with region,start,stop coordinates (0-based, inclusive)")]
    #[clap(value_name = "REGIONS")]
    #[arg(value_parser = check_file_exists)]
    pub regions_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(help = "Directory for the codon reports")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub output_dir: PathBuf,

    #[clap(short = 'l')]
    #[clap(long = "lookup")]
    #[clap(help = "Tab-separated table mapping GUSPEC to PTID and VISITNO")]
    #[clap(value_name = "LOOKUP")]
    #[arg(value_parser = check_file_exists)]
    pub lookup_path: Option<PathBuf>,

    #[clap(long = "ref-seq")]
    #[clap(help = "Only use reads aligned to references whose name contains this string")]
    #[clap(value_name = "NAME")]
    #[arg(value_parser = check_nonempty)]
    pub ref_seq: Option<String>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_dir_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.is_dir() {
        Err(format!("Directory does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_nonempty(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        Err("Value cannot be an empty string".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn positive_span(s: &str) -> Result<i64> {
    let span: i64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid partition span", s))?;
    if span >= 1 {
        Ok(span)
    } else {
        Err("Partition span must be at least 1".into())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn consensus_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let reads = dir.path().join("S01.bam");
        std::fs::write(&reads, b"").unwrap();
        let cli = Cli::try_parse_from([
            "bamseq",
            "consensus",
            "-r",
            reads.to_str().unwrap(),
            "-o",
            "S01.fasta",
            "-i",
            "S01",
        ])
        .unwrap();
        match cli.command {
            Command::Consensus(args) => {
                assert_eq!(args.partition_span, DEFAULT_PARTITION_SPAN);
                assert_eq!(args.gap_override_ratio, 0.75);
                assert_eq!(args.min_insertion_support, 0.5);
                assert_eq!(args.ref_seq, None);
                assert_eq!(args.tmp_dir, None);
            }
            Command::Codons(_) => panic!("expected consensus"),
        }
    }

    #[test]
    fn value_parsers_reject_bad_input() {
        assert!(positive_span("0").is_err());
        assert_eq!(positive_span("500"), Ok(500));
        assert!(ensure_unit_float("1.5").is_err());
        assert!(check_nonempty("  ").is_err());
        assert!(check_dir_exists("/definitely/not/here").is_err());
    }
}
