//! Single-record FASTA output for reconstructed sequences.
//!

use crate::utils::Result;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct FastaWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FastaWriter {
    pub fn new(output_path: &Path) -> Result<FastaWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path.display(), e))?;
        Ok(FastaWriter {
            path: output_path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Writes the header line and the sequence on a single line.
    pub fn write(&mut self, seq_id: &str, sequence: &str) -> Result<()> {
        writeln!(self.writer, ">{}", seq_id)
            .and_then(|_| writeln!(self.writer, "{}", sequence))
            .and_then(|_| self.writer.flush())
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}
