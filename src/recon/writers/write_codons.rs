//! Defines the `CodonReportWriter` that writes the per-codon and per-position
//! synonymous/nonsynonymous reports of one sample.
//!

use crate::recon::codon::{CodonTally, SampleIds, SynClass};
use crate::recon::Position;
use crate::utils::{create_writer, Result, SeqRegions};
use serde::Serialize;
use std::{
    fs::File,
    path::{Path, PathBuf},
};

const CODONS_SUFFIX: &str = "synonymous_nonsynonymous_codons.csv";
const TOTALS_SUFFIX: &str = "codon_totals.csv";

#[derive(Serialize)]
struct CodonRow<'a> {
    #[serde(rename = "PTID")]
    ptid: &'a str,
    visitno: &'a str,
    position: Position,
    region: String,
    mutant_codon: &'a str,
    mutant_aa: char,
    ref_codon: &'a str,
    ref_aa: char,
    seq_allele_depth: u32,
    syn_nonsyn: SynClass,
}

#[derive(Serialize)]
struct TotalsRow<'a> {
    #[serde(rename = "PTID")]
    ptid: &'a str,
    visitno: &'a str,
    position: i64,
    total_depth: u32,
    num_synonymous: u32,
    num_non_synonymous: u32,
}

struct CsvOutput {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvOutput {
    fn new(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)
            .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    fn write<T: Serialize>(&mut self, row: &T) -> Result<()> {
        self.writer
            .serialize(row)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush {}: {}", self.path.display(), e))
    }
}

/// Writes both codon reports of one sample.
pub struct CodonReportWriter {
    codons: CsvOutput,
    totals: CsvOutput,
}

impl CodonReportWriter {
    /// Opens `{prefix}_synonymous_nonsynonymous_codons.csv` and
    /// `{prefix}_codon_totals.csv` under `output_dir`.
    pub fn new(output_dir: &Path, prefix: &str) -> Result<CodonReportWriter> {
        let codons = create_writer(output_dir, prefix, CODONS_SUFFIX, CsvOutput::new)?;
        let totals = create_writer(output_dir, prefix, TOTALS_SUFFIX, CsvOutput::new)?;
        Ok(CodonReportWriter { codons, totals })
    }

    pub fn paths(&self) -> (&Path, &Path) {
        (&self.codons.path, &self.totals.path)
    }

    /// Writes all calls and totals; positions are reported 1-based.
    pub fn write(&mut self, ids: &SampleIds, tally: &CodonTally, regions: &SeqRegions) -> Result<()> {
        if tally.num_calls() == 0 {
            // No rows means no header from serde; keep the file self-describing.
            self.codons
                .writer
                .write_record([
                    "PTID",
                    "visitno",
                    "position",
                    "region",
                    "mutant_codon",
                    "mutant_aa",
                    "ref_codon",
                    "ref_aa",
                    "seq_allele_depth",
                    "syn_nonsyn",
                ])
                .map_err(|e| format!("Failed to write {}: {}", self.codons.path.display(), e))?;
        }
        for (pos, codon, call) in tally.calls() {
            self.codons.write(&CodonRow {
                ptid: &ids.ptid,
                visitno: &ids.visitno,
                position: pos.one_based(),
                region: regions.annotate_codon(pos),
                mutant_codon: codon,
                mutant_aa: call.mutant_aa,
                ref_codon: &call.ref_codon,
                ref_aa: call.ref_aa,
                seq_allele_depth: call.depth,
                syn_nonsyn: call.class,
            })?;
        }

        if tally.num_positions() == 0 {
            self.totals
                .writer
                .write_record([
                    "PTID",
                    "visitno",
                    "position",
                    "total_depth",
                    "num_synonymous",
                    "num_non_synonymous",
                ])
                .map_err(|e| format!("Failed to write {}: {}", self.totals.path.display(), e))?;
        }
        for (pos, totals) in tally.totals() {
            self.totals.write(&TotalsRow {
                ptid: &ids.ptid,
                visitno: &ids.visitno,
                position: pos + 1,
                total_depth: totals.depth,
                num_synonymous: totals.synonymous,
                num_non_synonymous: totals.nonsynonymous,
            })?;
        }

        self.codons.flush()?;
        self.totals.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SeqRegion;
    use std::fs;

    fn ids() -> SampleIds {
        SampleIds {
            sample_id: "S01".to_string(),
            ptid: "P101".to_string(),
            visitno: "2".to_string(),
        }
    }

    #[test]
    fn reports_are_one_based_and_annotated() {
        let dir = tempfile::tempdir().unwrap();
        let regions = SeqRegions::new(vec![
            SeqRegion::new("gag", 0, 4).unwrap(),
            SeqRegion::new("pol", 5, 20).unwrap(),
        ]);
        let mut tally = CodonTally::new();
        tally.add_codon(0, "ATG", "ATG", 'M', 'M');
        tally.add_codon(3, "GCC", "GCT", 'A', 'A');
        tally.add_codon(3, "ACT", "GCT", 'A', 'T');
        tally.add_inserted_codon(Position::inserted(5, 1), "CCC", 'P');

        let mut writer = CodonReportWriter::new(dir.path(), &ids().prefix()).unwrap();
        writer.write(&ids(), &tally, &regions).unwrap();
        drop(writer);

        let codons =
            fs::read_to_string(dir.path().join("P101_2_S01_synonymous_nonsynonymous_codons.csv"))
                .unwrap();
        assert_eq!(
            codons,
            "PTID,visitno,position,region,mutant_codon,mutant_aa,ref_codon,ref_aa,seq_allele_depth,syn_nonsyn\n\
             P101,2,4,gag/pol,ACT,T,GCT,A,1,N\n\
             P101,2,4,gag/pol,GCC,A,GCT,A,1,S\n\
             P101,2,6.001,pol,CCC,P,---,X,1,N\n"
        );

        let totals = fs::read_to_string(dir.path().join("P101_2_S01_codon_totals.csv")).unwrap();
        assert_eq!(
            totals,
            "PTID,visitno,position,total_depth,num_synonymous,num_non_synonymous\n\
             P101,2,1,1,0,0\n\
             P101,2,4,2,1,1\n"
        );
    }

    #[test]
    fn empty_tally_still_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CodonReportWriter::new(dir.path(), "P1__S9").unwrap();
        writer
            .write(&ids(), &CodonTally::new(), &SeqRegions::default())
            .unwrap();
        let (codons_path, totals_path) = writer.paths();
        let codons = fs::read_to_string(codons_path).unwrap();
        let totals = fs::read_to_string(totals_path).unwrap();
        assert!(codons.starts_with("PTID,visitno,position,region"));
        assert_eq!(codons.lines().count(), 1);
        assert_eq!(totals.lines().count(), 1);
    }
}
