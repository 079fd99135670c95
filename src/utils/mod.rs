mod bam_utils;
mod io_utils;
mod readers;
mod region;
mod util;

pub use bam_utils::{get_bam_header, get_sample_name, is_bam_mapped, matching_targets};
pub use io_utils::create_writer;
pub use readers::{open_genome_reader, open_table_reader, read_single_sequence};
pub use region::{SeqRegion, SeqRegions};
pub use util::{file_id, handle_error_and_exit, Result};
