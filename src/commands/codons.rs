use crate::cli::CodonArgs;
use crate::recon::{
    codon::{CodonTally, SampleIds, SampleLookup},
    workflows::classify_codons,
    writers::CodonReportWriter,
};
use crate::utils::{
    file_id, get_bam_header, get_sample_name, is_bam_mapped, open_table_reader,
    read_single_sequence, Result, SeqRegions,
};
use rust_htslib::bam;
use std::{path::Path, time};

pub fn codons(args: CodonArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let (ref_name, reference) = read_single_sequence(&args.genome_path)?;
    log::info!("Reference {}: {} bp", ref_name, reference.len());

    let regions = SeqRegions::from_reader(open_table_reader(&args.regions_path)?)?;
    let lookup = match &args.lookup_path {
        Some(path) => {
            let lookup = SampleLookup::from_reader(open_table_reader(path)?)?;
            if lookup.is_empty() {
                return Err(format!("Lookup table {} has no entries", path.display()));
            }
            log::info!("Loaded {} lookup entries", lookup.len());
            Some(lookup)
        }
        None => None,
    };

    let mut num_failed = 0;
    for reads_path in &args.reads_paths {
        let result = sample_ids(reads_path, lookup.as_ref()).and_then(|ids| {
            let tally = classify_bam(reads_path, reference.as_bytes(), args.ref_seq.as_deref())?;
            write_reports(&args.output_dir, &ids, &tally, &regions)
        });
        if let Err(e) = result {
            log::error!("{}: {}", reads_path.display(), e);
            num_failed += 1;
        }
    }

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    match num_failed {
        0 => Ok(()),
        _ => Err(format!(
            "Failed to classify {} of {} BAM files",
            num_failed,
            args.reads_paths.len()
        )),
    }
}

fn sample_ids(reads_path: &Path, lookup: Option<&SampleLookup>) -> Result<SampleIds> {
    let sample_id = file_id(reads_path)?;
    match lookup {
        Some(lookup) => lookup.resolve(&sample_id),
        None => {
            let ptid = get_sample_name(reads_path, &get_bam_header(reads_path)?)?;
            Ok(SampleIds {
                sample_id,
                ptid,
                visitno: String::new(),
            })
        }
    }
}

fn classify_bam(reads_path: &Path, reference: &[u8], ref_seq: Option<&str>) -> Result<CodonTally> {
    if !is_bam_mapped(&get_bam_header(reads_path)?) {
        return Err("Input BAM is not mapped".into());
    }
    let mut bam = bam::IndexedReader::from_path(reads_path)
        .map_err(|e| format!("Failed to open {}: {}", reads_path.display(), e))?;
    classify_codons(&mut bam, reference, ref_seq)
}

fn write_reports(
    output_dir: &Path,
    ids: &SampleIds,
    tally: &CodonTally,
    regions: &SeqRegions,
) -> Result<()> {
    let mut writer = CodonReportWriter::new(output_dir, &ids.prefix())?;
    writer.write(ids, tally, regions)?;
    let (codons_path, totals_path) = writer.paths();
    log::info!(
        "Wrote {} and {}",
        codons_path.display(),
        totals_path.display()
    );
    Ok(())
}
