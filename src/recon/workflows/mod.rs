mod classify;
mod extract;
mod reconstruct;

pub use classify::classify_codons;
pub use extract::{check_usable_reads, extract_reads, ReadStats};
pub use reconstruct::{reconstruct, ReconstructParams};
