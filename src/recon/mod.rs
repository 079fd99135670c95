pub mod codon;
pub mod consensus;
pub mod observation;
pub mod partition;
pub mod position;
pub mod reads;
pub mod workflows;
pub mod writers;

pub use position::Position;
