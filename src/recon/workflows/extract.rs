use crate::recon::reads::{is_filtered, AlignedRead};
use crate::utils::Result;
use itertools::Itertools;
use rust_htslib::bam::{self, FetchDefinition, Read, Record};
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReadStats {
    pub total: usize,
    pub filtered: usize,
    pub used: usize,
    /// Reference names of the reads that were used.
    pub ref_names: BTreeSet<String>,
}

/// Fetches every record on `targets` and hands each read that passes the flag
/// filter to `process`.
pub fn extract_reads<F>(
    bam: &mut bam::IndexedReader,
    targets: &[(u32, String)],
    mut process: F,
) -> Result<ReadStats>
where
    F: FnMut(&AlignedRead) -> Result<()>,
{
    let mut stats = ReadStats::default();
    let mut record = Record::new();
    for (tid, name) in targets {
        bam.fetch(FetchDefinition::CompleteTid(*tid as i32))
            .map_err(|e| format!("Failed to fetch reads on {}: {}", name, e))?;
        log::debug!("Decoding reads on {}", name);

        loop {
            match bam.read(&mut record) {
                Some(Ok(_)) => {}
                Some(Err(err)) => Err(format!("Failed to read record on {}: {}", name, err))?,
                None => break,
            }
            stats.total += 1;
            if is_filtered(record.flags()) {
                stats.filtered += 1;
                continue;
            }
            let read = AlignedRead::from_hts_rec(&record, name);
            process(&read)?;
            stats.used += 1;
            stats.ref_names.insert(read.ref_name);
        }
    }
    log::info!(
        "Reads: total={}, filtered={}, used={}",
        stats.total,
        stats.filtered,
        stats.used
    );
    Ok(stats)
}

/// Rejects runs that would build a result from nothing, or from reads aligned
/// to several references at once.
pub fn check_usable_reads(stats: &ReadStats, ref_filter: Option<&str>) -> Result<()> {
    match ref_filter {
        Some(filter) if stats.used == 0 => Err(format!(
            "No usable reads aligned to a reference matching '{}'",
            filter
        )),
        None if stats.used == 0 => Err("No usable reads in BAM".to_string()),
        None if stats.ref_names.len() > 1 => Err(format!(
            "Reads align to {} reference sequences ({}); select one with --ref-seq",
            stats.ref_names.len(),
            stats.ref_names.iter().join(", ")
        )),
        _ => Ok(()),
    }
}
