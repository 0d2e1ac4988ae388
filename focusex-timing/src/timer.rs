use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Clock that drives every fixed-duration wait of a session.
pub trait Timer: Clone + Send {
    type Timestamp: Copy + Send;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&mut self, d: Duration);
    fn wait_stats(&self) -> WaitStats;
}

/// How far blocking waits ran past their requested duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitStats {
    pub waits: usize,
    pub mean_overshoot_ns: f64,
    pub jitter_ns: f64,
    pub max_overshoot_ns: f64,
}

impl WaitStats {
    pub fn from_overshoots<'a, I>(overshoots: I) -> Self
    where
        I: IntoIterator<Item = &'a Duration>,
    {
        let times: Vec<f64> = overshoots
            .into_iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return WaitStats::default();
        }
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / times.len() as f64;
        let max = times.iter().cloned().fold(0.0, f64::max);
        WaitStats {
            waits: times.len(),
            mean_overshoot_ns: mean,
            jitter_ns: var.sqrt(),
            max_overshoot_ns: max,
        }
    }
}

/// Wall-clock timer using the most precise sleep each platform offers.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    overshoots: VecDeque<Duration>,
    max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&mut self, d: Duration) {
        let before = Instant::now();
        self.high_precision_sleep(d);
        self.record_overshoot(before.elapsed().saturating_sub(d));
    }

    fn wait_stats(&self) -> WaitStats {
        WaitStats::from_overshoots(&self.overshoots)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            overshoots: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    fn record_overshoot(&mut self, d: Duration) {
        if self.overshoots.len() >= self.max_samples {
            self.overshoots.pop_front();
        }
        self.overshoots.push_back(d);
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(target_os = "macos")]
        self.macos_sleep(duration);
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        std::thread::sleep(duration);
    }

    /// Sleeps to an absolute monotonic deadline, so signal wakeups
    /// re-enter without accumulating drift.
    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_gettime, clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR, TIMER_ABSTIME};

        const NANOS_PER_SEC: i64 = 1_000_000_000;

        let mut now = timespec { tv_sec: 0, tv_nsec: 0 };
        // SAFETY: `now` is a valid out-pointer.
        if unsafe { clock_gettime(CLOCK_MONOTONIC, &mut now) } != 0 {
            std::thread::sleep(duration);
            return;
        }
        let nanos = now.tv_nsec as i64 + duration.subsec_nanos() as i64;
        let deadline = timespec {
            tv_sec: now.tv_sec
                + duration.as_secs() as libc::time_t
                + (nanos / NANOS_PER_SEC) as libc::time_t,
            tv_nsec: (nanos % NANOS_PER_SEC) as libc::c_long,
        };

        // SAFETY: `deadline` outlives the call; the remainder pointer is
        // unused with TIMER_ABSTIME.
        while unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &deadline, std::ptr::null_mut())
        } == EINTR
        {}
    }

    /// Coarse sleep until `SPIN_WINDOW` before the deadline, then spin on
    /// mach ticks for the rest.
    #[cfg(target_os = "macos")]
    fn macos_sleep(&self, duration: Duration) {
        use mach2::mach_time::{mach_absolute_time, mach_timebase_info, mach_timebase_info_data_t};

        const SPIN_WINDOW: Duration = Duration::from_micros(200);

        let mut info = mach_timebase_info_data_t { numer: 0, denom: 0 };
        // SAFETY: `info` is a valid out-pointer for the duration of the call.
        let started = unsafe {
            mach_timebase_info(&mut info);
            mach_absolute_time()
        };
        if info.numer == 0 {
            std::thread::sleep(duration);
            return;
        }
        let deadline =
            started + (duration.as_nanos() * info.denom as u128 / info.numer as u128) as u64;

        if let Some(coarse) = duration.checked_sub(SPIN_WINDOW) {
            std::thread::sleep(coarse);
        }
        // SAFETY: reads the monotonic tick counter, no arguments.
        while unsafe { mach_absolute_time() } < deadline {
            std::hint::spin_loop();
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}
