use serde::{Deserialize, Serialize};

use crate::Matrix;

/// Electrode name to raw device row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMap {
    entries: Vec<(String, usize)>,
}

impl ChannelMap {
    pub fn new<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, usize)>,
        N: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, column)| (name.into(), column))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Widest raw matrix this map reads from.
    pub fn required_rows(&self) -> usize {
        self.entries.iter().map(|(_, c)| c + 1).max().unwrap_or(0)
    }

    /// Picks the mapped rows out of a raw device matrix, in table order.
    /// A column the device did not deliver becomes an empty row.
    pub fn select(&self, raw: &Matrix) -> Matrix {
        self.entries
            .iter()
            .map(|(_, column)| raw.get(*column).cloned().unwrap_or_default())
            .collect()
    }
}

impl Default for ChannelMap {
    /// 10-20 montage of an 8-channel board; row 0 carries the package counter.
    fn default() -> Self {
        Self::new([
            ("Fp1", 1),
            ("Fp2", 2),
            ("C3", 3),
            ("C4", 4),
            ("P7", 5),
            ("P8", 6),
            ("O1", 7),
            ("O2", 8),
        ])
    }
}
