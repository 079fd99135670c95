use crate::recon::Position;
use crate::utils::Result;
use serde::Deserialize;
use std::io::Read;

/// A named stretch of the reference, 0-based with an inclusive stop.
#[derive(Debug, PartialEq, Deserialize)]
pub struct SeqRegion {
    pub region: String,
    pub start: i64,
    pub stop: i64,
}

impl SeqRegion {
    pub fn new(region: impl Into<String>, start: i64, stop: i64) -> Result<Self> {
        let region = region.into();
        if start > stop {
            return Err(format!(
                "Invalid region {}: start {} > stop {}",
                region, start, stop
            ));
        }
        Ok(Self {
            region,
            start,
            stop,
        })
    }

    pub fn contains(&self, pos: Position) -> bool {
        Position::aligned(self.start) <= pos && pos <= Position::aligned(self.stop)
    }
}

/// Region table used to annotate codon positions.
#[derive(Debug, Default)]
pub struct SeqRegions {
    regions: Vec<SeqRegion>,
}

impl SeqRegions {
    pub fn new(regions: Vec<SeqRegion>) -> Self {
        Self { regions }
    }

    /// Reads a CSV table with `region`, `start` and `stop` columns.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut regions = Vec::new();
        for (index, row) in csv_reader.deserialize::<SeqRegion>().enumerate() {
            let row = row.map_err(|e| format!("Error at region line {}: {}", index + 2, e))?;
            regions.push(SeqRegion::new(row.region, row.start, row.stop)?);
        }
        log::debug!("Loaded {} sequence regions", regions.len());
        Ok(Self { regions })
    }

    pub fn find(&self, pos: Position) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.contains(pos))
            .map(|r| r.region.as_str())
    }

    /// Region label of a codon from its first and third base.
    pub fn annotate_codon(&self, pos: Position) -> String {
        match (self.find(pos), self.find(pos.shifted(2))) {
            (Some(first), Some(last)) if first != last => format!("{}/{}", first, last),
            (Some(first), _) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => String::new(),
        }
    }
}
