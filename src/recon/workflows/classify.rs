use super::extract::{check_usable_reads, extract_reads};
use crate::recon::codon::{CodonTally, CodonWalker};
use crate::recon::reads::FramedRead;
use crate::utils::{matching_targets, Result};
use rust_htslib::bam::{self, Read};

/// Walks every usable read of `bam` codon by codon against `reference`.
pub fn classify_codons(
    bam: &mut bam::IndexedReader,
    reference: &[u8],
    ref_filter: Option<&str>,
) -> Result<CodonTally> {
    let targets = matching_targets(bam.header(), ref_filter);
    if targets.is_empty() {
        return Err(match ref_filter {
            Some(filter) => format!("No reference sequence in the BAM contains '{}'", filter),
            None => "BAM header lists no reference sequences".to_string(),
        });
    }

    let walker = CodonWalker::new(reference);
    let mut tally = CodonTally::new();
    let mut num_codons = 0;
    let stats = extract_reads(bam, &targets, |read| {
        let framed = FramedRead::from_read(read);
        num_codons += walker.walk(&framed, &mut tally);
        Ok(())
    })?;
    if ref_filter.is_some() {
        check_usable_reads(&stats, ref_filter)?;
    }

    log::info!(
        "Codons: counted={}, positions={}, distinct calls={}",
        num_codons,
        tally.num_positions(),
        tally.num_calls()
    );
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recon::codon::{PositionTotals, SynClass};
    use crate::recon::reads::CigarOp;
    use crate::recon::workflows::test_bam::{read, write_bam, TestRead};
    use crate::recon::Position;

    const REFERENCE: &[u8] = b"ATGGCTAAA";

    fn run(reads: &[TestRead], ref_filter: Option<&str>) -> Result<CodonTally> {
        let dir = tempfile::tempdir().unwrap();
        let bam_path = write_bam(dir.path(), "sample.bam", &[("HXB2", 9)], reads);
        let mut bam = bam::IndexedReader::from_path(&bam_path).unwrap();
        classify_codons(&mut bam, REFERENCE, ref_filter)
    }

    #[test]
    fn substitutions_are_classified() {
        let reads = [
            read(0, "ATGGCCAAA", vec![CigarOp::Match(9)]),
            read(0, "ATGGATAAA", vec![CigarOp::Match(9)]),
            read(0, "ATGGATAAA", vec![CigarOp::Match(9)]),
        ];
        let tally = run(&reads, None).unwrap();

        let calls = tally.calls().collect::<Vec<_>>();
        assert_eq!(calls.len(), 2);
        let (pos, codon, call) = calls[0];
        assert_eq!((pos, codon), (Position::aligned(3), "GAT"));
        assert_eq!((call.depth, call.mutant_aa, call.class), (2, 'D', SynClass::Nonsynonymous));
        let (_, codon, call) = calls[1];
        assert_eq!(codon, "GCC");
        assert_eq!((call.ref_aa, call.class), ('A', SynClass::Synonymous));

        let totals = tally.totals().collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![
                (0, &PositionTotals { depth: 3, synonymous: 0, nonsynonymous: 0 }),
                (3, &PositionTotals { depth: 3, synonymous: 1, nonsynonymous: 2 }),
                (6, &PositionTotals { depth: 3, synonymous: 0, nonsynonymous: 0 }),
            ]
        );
    }

    #[test]
    fn filtered_reads_are_not_walked() {
        let mut duplicate = read(0, "ATGGATAAA", vec![CigarOp::Match(9)]);
        duplicate.flag = 1024;
        let reads = [duplicate, read(0, "ATGGCTAAA", vec![CigarOp::Match(9)])];
        let tally = run(&reads, Some("HXB2")).unwrap();
        assert_eq!(tally.num_calls(), 0);
        assert_eq!(tally.num_positions(), 3);
    }

    #[test]
    fn unmatched_filter_is_fatal() {
        let reads = [read(0, "ATGGCTAAA", vec![CigarOp::Match(9)])];
        let err = run(&reads, Some("SIV")).unwrap_err();
        assert_eq!(err, "No reference sequence in the BAM contains 'SIV'");
    }
}
