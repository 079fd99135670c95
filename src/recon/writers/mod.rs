mod write_codons;
mod write_fasta;

pub use write_codons::CodonReportWriter;
pub use write_fasta::FastaWriter;
