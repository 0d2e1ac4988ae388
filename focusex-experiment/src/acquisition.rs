use focusex_core::{AcquisitionError, AcquisitionPhase, AcquisitionSource, SampleBlock};
use log::{debug, info, warn};

/// Keeps the device streaming for as long as it lives and stops it on drop,
/// whether the session finished or bailed out with an error.
pub struct AcquisitionGuard<'a, A: AcquisitionSource> {
    source: &'a mut A,
}

impl<'a, A: AcquisitionSource> AcquisitionGuard<'a, A> {
    pub fn start(source: &'a mut A) -> Result<Self, AcquisitionError> {
        source.start()?;
        info!("acquisition started");
        Ok(Self { source })
    }

    pub fn source(&mut self) -> &mut A {
        &mut *self.source
    }
}

impl<A: AcquisitionSource> Drop for AcquisitionGuard<'_, A> {
    fn drop(&mut self) {
        match self.source.stop() {
            Ok(()) => info!("acquisition stopped"),
            Err(e) => warn!("failed to stop acquisition: {}", e),
        }
    }
}

/// Empties the device buffer into a block for `phase`.
///
/// Nothing here is retried: a failed or empty pull is kept as an empty
/// block and judged during analysis.
pub fn drain<A>(source: &mut A, phase: AcquisitionPhase) -> SampleBlock
where
    A: AcquisitionSource + ?Sized,
{
    match source.pull_available_samples() {
        Ok(channels) => {
            let block = SampleBlock::new(phase, channels);
            if block.is_empty() {
                warn!("{:?} window returned no samples", phase);
            } else {
                debug!(
                    "{:?} window: {} channels x {} samples",
                    phase,
                    block.channel_count(),
                    block.sample_count()
                );
            }
            block
        }
        Err(e) => {
            warn!("{:?} window: {}; keeping an empty block", phase, e);
            SampleBlock::empty(phase)
        }
    }
}
