use super::Result;
use flate2::read::MultiGzDecoder;
use rust_htslib::faidx;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

/// Opens a plain or gzip-compressed text table.
pub fn open_table_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

pub fn open_genome_reader(path: &Path) -> Result<faidx::Reader> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| format!("Reference has no file extension: {}", path.display()))?;
    let fai_path = path.with_extension(extension.to_owned() + ".fai");
    if !fai_path.exists() {
        return Err(format!(
            "Reference index file not found: {}. Create it using 'samtools faidx {}'",
            fai_path.display(),
            path.display()
        ));
    }
    faidx::Reader::from_path(path).map_err(|e| e.to_string())
}

/// Loads a single-record reference FASTA as (name, upper-cased sequence).
pub fn read_single_sequence(path: &Path) -> Result<(String, String)> {
    let reader = open_genome_reader(path)?;
    let num_seqs = reader.n_seqs();
    if num_seqs != 1 {
        return Err(format!(
            "Expected a single reference sequence in {}, found {}",
            path.display(),
            num_seqs
        ));
    }
    let name = reader.seq_name(0).map_err(|e| e.to_string())?;
    let len = reader.fetch_seq_len(&name);
    if len == 0 {
        return Err(format!("Reference sequence '{}' is empty", name));
    }
    let seq = reader
        .fetch_seq_string(&name, 0, len as usize - 1)
        .map_err(|e| format!("Error fetching reference sequence '{}': {}", name, e))?;
    log::debug!("Loaded reference {} ({} bp)", name, seq.len());
    Ok((name, seq.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Write};

    fn write_fasta(dir: &Path, name: &str, records: &[(&str, &str)]) -> std::path::PathBuf {
        let fasta_path = dir.join(name);
        let mut fasta = File::create(&fasta_path).unwrap();
        let mut fai = File::create(dir.join(format!("{}.fai", name))).unwrap();
        let mut offset = 0;
        for (id, seq) in records {
            let header = format!(">{}\n", id);
            write!(fasta, "{}{}\n", header, seq).unwrap();
            offset += header.len();
            writeln!(fai, "{}\t{}\t{}\t{}\t{}", id, seq.len(), offset, seq.len(), seq.len() + 1)
                .unwrap();
            offset += seq.len() + 1;
        }
        fasta_path
    }

    #[test]
    fn single_sequence_is_loaded_uppercase() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(dir.path(), "ref.fa", &[("hxb2", "acgtACGT")]);
        let (name, seq) = read_single_sequence(&path).unwrap();
        assert_eq!(name, "hxb2");
        assert_eq!(seq, "ACGTACGT");
    }

    #[test]
    fn multi_record_reference_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(dir.path(), "ref.fa", &[("a", "ACGT"), ("b", "TTTT")]);
        let err = read_single_sequence(&path).unwrap_err();
        assert!(err.contains("found 2"));
    }

    #[test]
    fn missing_index_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa");
        std::fs::write(&path, ">a\nACGT\n").unwrap();
        let err = open_genome_reader(&path).err().unwrap();
        assert!(err.starts_with("Reference index file not found"));
    }

    #[test]
    fn gzipped_table_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.csv.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(File::create(&path).unwrap(), Default::default());
        encoder.write_all(b"region,start,stop\ngag,0,9\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = open_table_reader(&path)
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["region,start,stop", "gag,0,9"]);
    }
}
