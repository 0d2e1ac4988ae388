use anyhow::{Context, Result};
use focusex_core::ChannelMap;
use focusex_experiment::{ResultStore, SessionConfig, TrialController, standard_tasks};
use focusex_timing::{HighPrecisionTimer, Timer};
use log::info;

use crate::board::SyntheticBoard;
use crate::surface::ConsoleSurface;

pub const CONFIG_FILE: &str = "focusex.json";

pub struct App {
    config: SessionConfig,
    store: ResultStore,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = SessionConfig::load_or_default(CONFIG_FILE)
            .with_context(|| format!("loading {CONFIG_FILE}"))?;
        let store = ResultStore::new(&config.output_dir, config.naming);
        Ok(Self { config, store })
    }

    pub fn run(self) -> Result<()> {
        info!("=== EEG FOCUS EXPERIMENT ===");
        info!("Platform: {}", std::env::consts::OS);
        info!("Architecture: {}", std::env::consts::ARCH);
        info!(
            "results go to {} ({:?} naming)",
            self.store.dir().display(),
            self.store.naming()
        );

        let timer = HighPrecisionTimer::new();
        let board = SyntheticBoard::new(timer.clone(), ChannelMap::default(), rand::rng());
        let surface = ConsoleSurface::new(timer);

        let mut controller = TrialController::new(self.config, surface, board, rand::rng())
            .with_tasks(standard_tasks(rand::rng()));
        let record = controller
            .run_full_session()
            .context("experiment session aborted")?;

        let stats = controller.surface.timer().wait_stats();
        info!(
            "{} waits, overshoot mean {:.1} us, jitter {:.1} us, max {:.1} us",
            stats.waits,
            stats.mean_overshoot_ns / 1_000.0,
            stats.jitter_ns / 1_000.0,
            stats.max_overshoot_ns / 1_000.0
        );

        let path = self
            .store
            .persist(&record)
            .context("saving session results")?;
        info!("Data saved to {}", path.display());
        Ok(())
    }
}
