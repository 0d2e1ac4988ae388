use std::f64::consts::TAU;

use focusex_core::{AcquisitionError, AcquisitionSource, ChannelMap, Matrix};
use focusex_timing::Timer;
use log::info;
use rand::Rng;

/// Simulated EEG board.
///
/// Samples are synthesized on demand for the time elapsed since the
/// previous pull: a 10 Hz alpha rhythm per electrode plus uniform noise,
/// in microvolts. Row 0 of the raw frame is a wrapping package counter,
/// as on the hardware boards; the channel map decides which rows leave
/// the device.
pub struct SyntheticBoard<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    timer: T,
    rng: R,
    channels: ChannelMap,
    sampling_rate: u32,
    started_at: Option<u64>,
    emitted: u64,
}

impl<T, R> SyntheticBoard<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub const SAMPLING_RATE: u32 = 250;
    const ALPHA_HZ: f64 = 10.0;
    const AMPLITUDE_UV: f64 = 20.0;
    const NOISE_UV: f64 = 5.0;

    pub fn new(timer: T, channels: ChannelMap, rng: R) -> Self {
        Self {
            timer,
            rng,
            channels,
            sampling_rate: Self::SAMPLING_RATE,
            started_at: None,
            emitted: 0,
        }
    }

    fn due_samples(&self, started_at: u64) -> u64 {
        let elapsed_ns = self.timer.now().saturating_sub(started_at) as u128;
        (elapsed_ns * self.sampling_rate as u128 / 1_000_000_000) as u64
    }

    fn synthesize(&mut self, count: u64) -> Matrix {
        let rows = self.channels.required_rows();
        let mut raw: Matrix = vec![Vec::with_capacity(count as usize); rows];
        for i in 0..count {
            let n = self.emitted + i;
            let t = n as f64 / self.sampling_rate as f64;
            for (row, values) in raw.iter_mut().enumerate() {
                let value = if row == 0 {
                    (n % 256) as f64
                } else {
                    let phase = row as f64 * 0.7;
                    Self::AMPLITUDE_UV * (TAU * Self::ALPHA_HZ * t + phase).sin()
                        + self.rng.random_range(-Self::NOISE_UV..Self::NOISE_UV)
                };
                values.push(value);
            }
        }
        self.emitted += count;
        raw
    }
}

impl<T, R> AcquisitionSource for SyntheticBoard<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.channels.is_empty() {
            return Err(AcquisitionError::Device("no channels mapped".into()));
        }
        self.started_at = Some(self.timer.now());
        self.emitted = 0;
        info!(
            "synthetic board streaming {} channels ({}) at {} Hz",
            self.channels.len(),
            self.channels.names().collect::<Vec<_>>().join(", "),
            self.sampling_rate
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AcquisitionError> {
        self.started_at = None;
        Ok(())
    }

    fn pull_available_samples(&mut self) -> Result<Matrix, AcquisitionError> {
        let started_at = self.started_at.ok_or(AcquisitionError::NotStreaming)?;
        let count = self.due_samples(started_at).saturating_sub(self.emitted);
        let raw = self.synthesize(count);
        Ok(self.channels.select(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusex_timing::VirtualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn board(timer: &VirtualTimer) -> SyntheticBoard<VirtualTimer, StdRng> {
        SyntheticBoard::new(timer.clone(), ChannelMap::default(), StdRng::seed_from_u64(0))
    }

    #[test]
    fn pulling_before_start_is_not_streaming() {
        let timer = VirtualTimer::new();
        let mut board = board(&timer);
        assert_eq!(
            board.pull_available_samples(),
            Err(AcquisitionError::NotStreaming)
        );
    }

    #[test]
    fn pull_returns_samples_for_elapsed_time() {
        let timer = VirtualTimer::new();
        let mut board = board(&timer);
        board.start().unwrap();

        timer.advance(Duration::from_secs(2));
        let block = board.pull_available_samples().unwrap();
        assert_eq!(block.len(), 8);
        assert!(block.iter().all(|row| row.len() == 500));
        assert!(block[0].iter().all(|v| v.abs() <= 25.0));

        // buffer was drained
        assert!(board.pull_available_samples().unwrap().iter().all(Vec::is_empty));

        timer.advance(Duration::from_millis(100));
        assert_eq!(board.pull_available_samples().unwrap()[3].len(), 25);
    }

    #[test]
    fn counter_row_is_only_sent_when_mapped() {
        let timer = VirtualTimer::new();
        let mut board = SyntheticBoard::new(
            timer.clone(),
            ChannelMap::new([("counter", 0)]),
            StdRng::seed_from_u64(0),
        );
        board.start().unwrap();
        timer.advance(Duration::from_millis(40));
        let block = board.pull_available_samples().unwrap();
        assert_eq!(block, vec![vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]]);
    }

    #[test]
    fn empty_channel_map_cannot_start() {
        let timer = VirtualTimer::new();
        let mut board = SyntheticBoard::new(
            timer,
            ChannelMap::new(Vec::<(String, usize)>::new()),
            StdRng::seed_from_u64(0),
        );
        assert!(board.start().is_err());
    }
}
