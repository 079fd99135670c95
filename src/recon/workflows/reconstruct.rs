//! Consensus reconstruction: decode reads into partitioned observations, then
//! reduce the partitions to one sequence.

use super::extract::{check_usable_reads, extract_reads};
use crate::recon::consensus::{ConsensusBuilder, ConsensusParams};
use crate::recon::partition::PartitionManager;
use crate::recon::reads::FramedRead;
use crate::utils::{matching_targets, Result};
use rust_htslib::bam::{self, Read};
use std::path::PathBuf;

pub struct ReconstructParams {
    pub ref_filter: Option<String>,
    pub partition_dir: PathBuf,
    pub partition_prefix: String,
    pub partition_span: i64,
    pub consensus: ConsensusParams,
}

pub fn reconstruct(bam: &mut bam::IndexedReader, params: &ReconstructParams) -> Result<String> {
    let ref_filter = params.ref_filter.as_deref();
    let targets = matching_targets(bam.header(), ref_filter);
    if targets.is_empty() {
        return Err(match ref_filter {
            Some(filter) => format!("No reference sequence in the BAM contains '{}'", filter),
            None => "BAM header lists no reference sequences".to_string(),
        });
    }

    let mut partitions = PartitionManager::new(
        &params.partition_dir,
        &params.partition_prefix,
        params.partition_span,
    )?;
    let stats = extract_reads(bam, &targets, |read| {
        let framed = FramedRead::from_read(read);
        if framed.is_empty() {
            log::debug!("{}: no aligned bases", read.id);
            return Ok(());
        }
        for observation in framed.observations(&read.ref_name) {
            partitions.write(&observation)?;
        }
        Ok(())
    })?;
    check_usable_reads(&stats, ref_filter)?;

    let partitions = partitions.finish()?;
    log::info!("Building consensus from {} partitions", partitions.len());

    let mut builder = ConsensusBuilder::new(params.consensus);
    for partition in partitions {
        log::debug!("Reducing partition {}", partition.key);
        let observations = partition.consume()?;
        builder.add_partition(&observations);
    }

    let (sequence, stats) = builder.finish();
    log::info!(
        "Consensus: length={}, positions={}, filled gaps={}, gap overrides={}, insertions kept={}, dropped={}",
        sequence.len(),
        stats.positions,
        stats.gaps_filled,
        stats.gap_overrides,
        stats.insertions_kept,
        stats.insertions_dropped
    );
    Ok(sequence)
}
