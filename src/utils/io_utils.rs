use crate::utils::Result;
use std::path::{Path, PathBuf};

/// Builds `{dir}/{prefix}_{suffix}` and hands it to the writer constructor.
pub fn create_writer<T, F>(output_dir: &Path, prefix: &str, suffix: &str, f: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let output_path: PathBuf = output_dir.join(format!("{}_{}", prefix, suffix));
    log::debug!("Opening output {}", output_path.display());
    f(&output_path)
}
