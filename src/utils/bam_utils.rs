use crate::utils::Result;
use rust_htslib::bam::{self, HeaderView, Read};
use std::{collections::HashSet, path::Path};

pub fn get_bam_header(bam_path: &Path) -> Result<bam::Header> {
    let bam = bam::IndexedReader::from_path(bam_path)
        .map_err(|e| format!("Failed to create bam reader: {}", e))?;
    Ok(bam::Header::from_template(bam.header()))
}

pub fn is_bam_mapped(bam_header: &bam::Header) -> bool {
    // Fetching by target needs the SQ lines of a mapped, indexed BAM.
    String::from_utf8_lossy(&bam_header.to_bytes())
        .lines()
        .any(|line| line.starts_with("@SQ"))
}

pub fn get_sample_name(reads_path: &Path, bam_header: &bam::Header) -> Result<String> {
    let header_hashmap = bam_header.to_hashmap();
    let mut sample_names = HashSet::new();

    if let Some(rg_fields) = header_hashmap.get("RG") {
        for rg_field in rg_fields {
            if let Some(sample_name) = rg_field.get("SM") {
                sample_names.insert(sample_name.to_owned());
            }
        }
    }

    if sample_names.len() == 1 {
        if let Some(name) = sample_names.into_iter().next() {
            return Ok(name);
        }
    } else if sample_names.is_empty() {
        log::warn!("No sample names found in {}", reads_path.display());
    } else {
        log::warn!("Multiple sample names found in {}", reads_path.display());
    }

    let sample = reads_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Invalid reads file name")?
        .to_string();

    Ok(sample)
}

/// Targets whose name contains `ref_filter`, or every target without a filter.
pub fn matching_targets(header: &HeaderView, ref_filter: Option<&str>) -> Vec<(u32, String)> {
    header
        .target_names()
        .iter()
        .enumerate()
        .map(|(tid, name)| (tid as u32, String::from_utf8_lossy(name).into_owned()))
        .filter(|(_, name)| ref_filter.map_or(true, |filter| name.contains(filter)))
        .collect()
}
