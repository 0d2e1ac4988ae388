use serde::{Deserialize, Serialize};

/// Acquisition window that produced a [`SampleBlock`](crate::SampleBlock).
///
/// Within one condition the windows always run in declaration order.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionPhase {
    Baseline,
    PreTrial,
    Task,
}

impl AcquisitionPhase {
    /// On-screen text shown while this window is recorded by the controller.
    /// The task window has no generic text; each condition brings its own.
    pub fn screen_text(&self) -> Option<&'static str> {
        match self {
            AcquisitionPhase::Baseline => Some("+"),
            AcquisitionPhase::PreTrial => Some("Get ready..."),
            AcquisitionPhase::Task => None,
        }
    }
}
