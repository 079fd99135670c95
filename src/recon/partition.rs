//! Bounded on-disk buffering of position observations.
//!
//! Observations are appended to one CSV file per block of `span` reference
//! positions while reads are decoded, then read back one block at a time in
//! ascending order. Each file is removed as soon as it has been consumed, and
//! anything left over is removed when its owner is dropped.

use crate::recon::observation::PositionObservation;
use crate::utils::Result;
use std::{
    collections::BTreeMap,
    fs::{self, File},
    path::{Path, PathBuf},
};

pub const DEFAULT_PARTITION_SPAN: i64 = 2000;

struct PartitionWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    count: usize,
}

/// Owns the open partition writers of a decoding sweep.
pub struct PartitionManager {
    dir: PathBuf,
    prefix: String,
    span: i64,
    writers: BTreeMap<i64, PartitionWriter>,
}

impl PartitionManager {
    pub fn new(dir: &Path, prefix: &str, span: i64) -> Result<Self> {
        if span <= 0 {
            return Err(format!("Partition span must be positive, got {}", span));
        }
        if !dir.is_dir() {
            return Err(format!(
                "Partition directory does not exist: {}",
                dir.display()
            ));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            span,
            writers: BTreeMap::new(),
        })
    }

    pub fn write(&mut self, observation: &PositionObservation) -> Result<()> {
        let key = observation.sequence_pos.partition_key(self.span);
        let partition = match self.writers.entry(key) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                let path = self.dir.join(format!("{}.{}.csv", self.prefix, key));
                log::trace!("Opening partition {}", path.display());
                let writer = csv::Writer::from_path(&path)
                    .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
                entry.insert(PartitionWriter {
                    path,
                    writer,
                    count: 0,
                })
            }
        };
        partition
            .writer
            .serialize(observation)
            .map_err(|e| format!("Failed to write {}: {}", partition.path.display(), e))?;
        partition.count += 1;
        Ok(())
    }

    /// Flushes and closes every writer, returning the partitions in key order.
    pub fn finish(mut self) -> Result<Vec<Partition>> {
        let writers = std::mem::take(&mut self.writers);
        let mut partitions = Vec::with_capacity(writers.len());
        let mut flush_error = None;
        for (key, mut partition) in writers {
            if let Err(e) = partition.writer.flush() {
                flush_error.get_or_insert(format!(
                    "Failed to flush {}: {}",
                    partition.path.display(),
                    e
                ));
            }
            drop(partition.writer);
            log::debug!(
                "Partition {} holds {} observations",
                key,
                partition.count
            );
            partitions.push(Partition {
                key,
                path: partition.path,
            });
        }
        match flush_error {
            // Dropping `partitions` removes the files.
            Some(e) => Err(e),
            None => Ok(partitions),
        }
    }
}

impl Drop for PartitionManager {
    fn drop(&mut self) {
        for partition in self.writers.values() {
            let _ = fs::remove_file(&partition.path);
        }
    }
}

/// A closed partition file awaiting its single consumer.
#[derive(Debug)]
pub struct Partition {
    pub key: i64,
    path: PathBuf,
}

impl Partition {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<PositionObservation>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| format!("Failed to open partition {}: {}", self.path.display(), e))?;
        reader
            .deserialize()
            .enumerate()
            .map(|(index, row)| {
                row.map_err(|e| {
                    format!(
                        "Failed to parse partition {} at line {}: {}",
                        self.path.display(),
                        index + 2,
                        e
                    )
                })
            })
            .collect()
    }

    /// Reads the partition and removes its file.
    pub fn consume(self) -> Result<Vec<PositionObservation>> {
        let observations = self.read()?;
        fs::remove_file(&self.path)
            .map_err(|e| format!("Failed to remove {}: {}", self.path.display(), e))?;
        Ok(observations)
    }
}

impl Drop for Partition {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
