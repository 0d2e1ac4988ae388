mod timer;
mod virtual_timer;

pub use timer::{HighPrecisionTimer, Timer, WaitStats};
pub use virtual_timer::VirtualTimer;
