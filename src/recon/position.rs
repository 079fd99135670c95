//! Reference coordinates for aligned and inserted bases.
//!
//! Inserted bases have no reference coordinate of their own. They are anchored to
//! the last reference position before the insertion and numbered from 1, so that
//! every insertion sorts strictly between its anchor and the next reference base.

use crate::utils::Result;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A 0-based reference position, optionally inside an insertion run.
///
/// Ordering is lexicographic on `(anchor, insertion)` with `None` before `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub anchor: i64,
    pub insertion: Option<u32>,
}

impl Position {
    pub fn aligned(anchor: i64) -> Self {
        Self {
            anchor,
            insertion: None,
        }
    }

    pub fn inserted(anchor: i64, index: u32) -> Self {
        Self {
            anchor,
            insertion: Some(index),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.insertion.is_some()
    }

    /// Moves the anchor, keeping the insertion index.
    pub fn shifted(&self, offset: i64) -> Self {
        Self {
            anchor: self.anchor + offset,
            insertion: self.insertion,
        }
    }

    pub fn one_based(&self) -> Self {
        self.shifted(1)
    }

    pub fn partition_key(&self, span: i64) -> i64 {
        self.anchor.div_euclid(span)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.insertion {
            None => write!(f, "{}", self.anchor),
            Some(index) => write!(f, "{}.{:03}", self.anchor, index),
        }
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        let error_msg = || format!("Invalid position: {}", s);
        match s.split_once('.') {
            None => Ok(Position::aligned(s.parse().map_err(|_| error_msg())?)),
            Some((anchor, fraction)) => {
                let anchor = anchor.parse().map_err(|_| error_msg())?;
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(error_msg());
                }
                // Thousandths: "1" reads as 100, "001" as 1.
                let index: u32 = format!("{:0<3}", fraction)
                    .parse()
                    .map_err(|_| error_msg())?;
                match index {
                    0 => Ok(Position::aligned(anchor)),
                    _ => Ok(Position::inserted(anchor, index)),
                }
            }
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoding = String::deserialize(deserializer)?;
        encoding.parse().map_err(de::Error::custom)
    }
}
