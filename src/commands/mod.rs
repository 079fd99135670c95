pub mod codons;
pub mod consensus;
