use crate::cli::ConsensusArgs;
use crate::recon::{
    consensus::ConsensusParams,
    workflows::{reconstruct, ReconstructParams},
    writers::FastaWriter,
};
use crate::utils::{file_id, get_bam_header, is_bam_mapped, Result};
use rust_htslib::bam;
use std::{path::Path, time};

pub fn consensus(args: ConsensusArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let bam_header = get_bam_header(&args.reads_path)?;
    if !is_bam_mapped(&bam_header) {
        return Err("Input BAM is not mapped".into());
    }

    let partition_dir = args.tmp_dir.clone().unwrap_or_else(std::env::temp_dir);
    let output_path = Path::new(&args.output_path);
    let params = ReconstructParams {
        ref_filter: args.ref_seq.clone(),
        partition_dir,
        // pid keeps concurrent runs in one directory apart
        partition_prefix: format!("{}.{}", file_id(output_path)?, std::process::id()),
        partition_span: args.partition_span,
        consensus: ConsensusParams {
            gap_override_ratio: args.gap_override_ratio,
            min_insertion_support: args.min_insertion_support,
        },
    };

    let mut bam = bam::IndexedReader::from_path(&args.reads_path)
        .map_err(|e| format!("Failed to open {}: {}", args.reads_path.display(), e))?;
    let sequence = reconstruct(&mut bam, &params)?;

    let mut writer = FastaWriter::new(output_path)?;
    writer.write(&args.seq_id, &sequence)?;
    log::info!(
        "Wrote {} ({} bp) to {}",
        args.seq_id,
        sequence.len(),
        output_path.display()
    );

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recon::reads::CigarOp;
    use crate::recon::workflows::test_bam::{read, write_bam};
    use std::fs;

    fn args(dir: &Path, reads_path: std::path::PathBuf) -> ConsensusArgs {
        ConsensusArgs {
            reads_path,
            output_path: dir.join("S01.consensus.fasta").to_string_lossy().into_owned(),
            seq_id: "S01_consensus".to_string(),
            ref_seq: Some("HXB2".to_string()),
            tmp_dir: Some(dir.to_path_buf()),
            partition_span: 3,
            gap_override_ratio: 0.75,
            min_insertion_support: 0.5,
        }
    }

    #[test]
    fn consensus_is_written_as_fasta() {
        let dir = tempfile::tempdir().unwrap();
        let reads = [
            read(0, "ACGTAC", vec![CigarOp::Match(6)]),
            read(2, "GTTTACGT", vec![CigarOp::Match(3), CigarOp::Ins(2), CigarOp::Match(3)]),
            read(2, "GTTTACGT", vec![CigarOp::Match(3), CigarOp::Ins(2), CigarOp::Match(3)]),
        ];
        let bam_path = write_bam(dir.path(), "S01.bam", &[("HIV1_HXB2", 20)], &reads);

        consensus(args(dir.path(), bam_path)).unwrap();

        let fasta = fs::read_to_string(dir.path().join("S01.consensus.fasta")).unwrap();
        assert_eq!(fasta, ">S01_consensus\nACGTTTACGT\n");
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension() == Some(std::ffi::OsStr::new("csv")))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn unmatched_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reads = [read(0, "ACGT", vec![CigarOp::Match(4)])];
        let bam_path = write_bam(dir.path(), "S01.bam", &[("SIV_mac239", 20)], &reads);

        let err = consensus(args(dir.path(), bam_path)).unwrap_err();
        assert_eq!(err, "No reference sequence in the BAM contains 'HXB2'");
        assert!(!dir.path().join("S01.consensus.fasta").exists());
    }
}
