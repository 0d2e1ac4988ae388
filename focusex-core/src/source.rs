use crate::Matrix;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("acquisition device is not streaming")]
    NotStreaming,
    #[error("acquisition device error: {0}")]
    Device(String),
}

/// EEG board or simulator.
///
/// The device owns its sample buffer; callers only drain it.
pub trait AcquisitionSource {
    fn start(&mut self) -> Result<(), AcquisitionError>;
    fn stop(&mut self) -> Result<(), AcquisitionError>;

    /// Returns every sample buffered since the previous pull and empties
    /// the buffer.
    fn pull_available_samples(&mut self) -> Result<Matrix, AcquisitionError>;
}

impl<A: AcquisitionSource + ?Sized> AcquisitionSource for &mut A {
    fn start(&mut self) -> Result<(), AcquisitionError> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<(), AcquisitionError> {
        (**self).stop()
    }

    fn pull_available_samples(&mut self) -> Result<Matrix, AcquisitionError> {
        (**self).pull_available_samples()
    }
}
