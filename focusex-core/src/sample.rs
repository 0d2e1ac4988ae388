use serde::{Deserialize, Serialize};

use crate::AcquisitionPhase;

/// Channel-major matrix: one row per channel, one column per sample.
pub type Matrix = Vec<Vec<f64>>;

/// Readings captured during one acquisition window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBlock {
    phase: AcquisitionPhase,
    channels: Matrix,
}

impl SampleBlock {
    pub fn new(phase: AcquisitionPhase, channels: Matrix) -> Self {
        Self { phase, channels }
    }

    pub fn empty(phase: AcquisitionPhase) -> Self {
        Self::new(phase, Vec::new())
    }

    pub fn phase(&self) -> AcquisitionPhase {
        self.phase
    }

    pub fn channels(&self) -> &Matrix {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Longest row length. Rows from a well-behaved device are equal length.
    pub fn sample_count(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    /// Same readings, attributed to another window.
    pub fn retag(self, phase: AcquisitionPhase) -> Self {
        Self { phase, ..self }
    }
}
