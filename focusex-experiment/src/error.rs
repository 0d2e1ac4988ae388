use focusex_core::{AcquisitionError, ConditionLabel, PresentationError, RecordError};

use crate::{ConfigError, StoreError};

/// Faults that end a session. Missing keypresses and empty sample pulls
/// are recorded as data and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("acquisition device failed to start: {0}")]
    DeviceInit(#[source] AcquisitionError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    #[error("no task registered for condition {0}")]
    MissingTask(ConditionLabel),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
