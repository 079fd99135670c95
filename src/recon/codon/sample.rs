use crate::utils::Result;
use serde::Deserialize;
use std::{collections::HashMap, io::Read};

/// Identifiers printed on every report row.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleIds {
    pub sample_id: String,
    pub ptid: String,
    pub visitno: String,
}

impl SampleIds {
    /// Report file prefix, `{ptid}_{visitno}_{sample_id}`.
    pub fn prefix(&self) -> String {
        format!("{}_{}_{}", self.ptid, self.visitno, self.sample_id)
    }
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    #[serde(rename = "GUSPEC")]
    guspec: String,
    #[serde(rename = "PTID")]
    ptid: String,
    #[serde(rename = "VISITNO")]
    visitno: String,
}

/// Participant and visit per specimen, from a tab-separated table.
#[derive(Debug, Default)]
pub struct SampleLookup {
    entries: HashMap<String, (String, String)>,
}

impl SampleLookup {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(reader);
        let mut entries = HashMap::new();
        for (index, row) in csv_reader.deserialize::<LookupRow>().enumerate() {
            let row = row.map_err(|e| format!("Error at lookup line {}: {}", index + 2, e))?;
            // First entry for a specimen wins.
            entries
                .entry(row.guspec)
                .or_insert((row.ptid, row.visitno));
        }
        Ok(Self { entries })
    }

    pub fn resolve(&self, sample_id: &str) -> Result<SampleIds> {
        let (ptid, visitno) = self
            .entries
            .get(sample_id)
            .ok_or_else(|| format!("Sample {} not found in lookup table", sample_id))?;
        Ok(SampleIds {
            sample_id: sample_id.to_string(),
            ptid: ptid.clone(),
            visitno: visitno.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
