pub mod cli;
pub mod commands;
pub mod recon;
pub mod utils;
