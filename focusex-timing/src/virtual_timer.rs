use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{Timer, WaitStats};

/// Clock that never blocks: sleeping just moves virtual time forward.
///
/// Clones share the same clock, so a test can keep one handle and read
/// how much session time has passed.
#[derive(Debug, Clone, Default)]
pub struct VirtualTimer {
    now_ns: Arc<AtomicU64>,
    waits: Arc<AtomicU64>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

impl Timer for VirtualTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&mut self, d: Duration) {
        self.advance(d);
        self.waits.fetch_add(1, Ordering::SeqCst);
    }

    fn wait_stats(&self) -> WaitStats {
        WaitStats {
            waits: self.waits.load(Ordering::SeqCst) as usize,
            ..WaitStats::default()
        }
    }
}
