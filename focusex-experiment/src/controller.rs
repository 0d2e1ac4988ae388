use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use focusex_core::{
    AcquisitionPhase, AcquisitionSource, ConditionLabel, ConditionRecord, FocusRating,
    PresentationSurface, SampleBlock, SelfReport, SessionRecord,
};
use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{AcquisitionGuard, ConditionTask, SessionConfig, SessionError, drain};

pub const WELCOME_TEXT: &str =
    "Hello and welcome! Thank you for participating in our experiment today.";
pub const SELF_REPORT_PROMPT: &str = "How focused were you? (1 = Distracted, 5 = Focused)";
pub const BREAK_TEXT: &str = "Take a short break. The next condition will start soon.";
pub const FAREWELL_TEXT: &str = "Thank you for participating! The experiment is now over.";

/// Runs every requested condition once, in random order, and collects
/// the recordings into a [`SessionRecord`].
///
/// The random source is injected so a seeded generator replays the same
/// condition order.
pub struct TrialController<S, A, R>
where
    S: PresentationSurface,
    A: AcquisitionSource,
    R: Rng,
{
    pub surface: S,
    pub source: A,
    pub rng: R,
    pub config: SessionConfig,
    tasks: BTreeMap<ConditionLabel, Box<dyn ConditionTask<S, A>>>,
}

impl<S, A, R> TrialController<S, A, R>
where
    S: PresentationSurface,
    A: AcquisitionSource,
    R: Rng,
{
    pub fn new(config: SessionConfig, surface: S, source: A, rng: R) -> Self {
        Self {
            surface,
            source,
            rng,
            config,
            tasks: BTreeMap::new(),
        }
    }

    /// Registers `task` for its label, returning the task it replaces.
    pub fn register_task(
        &mut self,
        task: Box<dyn ConditionTask<S, A>>,
    ) -> Option<Box<dyn ConditionTask<S, A>>> {
        self.tasks.insert(task.label(), task)
    }

    pub fn with_tasks<I>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn ConditionTask<S, A>>>,
    {
        for task in tasks {
            self.register_task(task);
        }
        self
    }

    pub fn has_task(&self, label: ConditionLabel) -> bool {
        self.tasks.contains_key(&label)
    }

    /// Uniformly random permutation of `conditions`.
    pub fn condition_order(
        &mut self,
        conditions: &BTreeSet<ConditionLabel>,
    ) -> Vec<ConditionLabel> {
        let mut order: Vec<ConditionLabel> = conditions.iter().copied().collect();
        order.shuffle(&mut self.rng);
        order
    }

    pub fn run_full_session(&mut self) -> Result<SessionRecord, SessionError> {
        let all: BTreeSet<ConditionLabel> = ConditionLabel::ALL.into_iter().collect();
        self.run_session(&all)
    }

    pub fn run_session(
        &mut self,
        conditions: &BTreeSet<ConditionLabel>,
    ) -> Result<SessionRecord, SessionError> {
        if let Some(label) = conditions.iter().find(|label| !self.has_task(**label)) {
            return Err(SessionError::MissingTask(*label));
        }

        let order = self.condition_order(conditions);
        info!(
            "session of {} conditions, order {:?}, up to {:.0} s",
            order.len(),
            order,
            self.config.planned_duration(conditions).as_secs_f64()
        );

        let Self {
            surface,
            source,
            config,
            tasks,
            ..
        } = self;

        let mut acquisition = AcquisitionGuard::start(source).map_err(SessionError::DeviceInit)?;

        surface.show_text(WELCOME_TEXT, Duration::from_millis(config.welcome_ms))?;
        // Samples from the welcome screen belong to no condition.
        drain(acquisition.source(), AcquisitionPhase::Baseline);

        let mut builder = SessionRecord::builder();
        for (index, label) in order.iter().enumerate() {
            info!("condition {}/{}: {}", index + 1, order.len(), label);
            let task = tasks
                .get_mut(label)
                .ok_or(SessionError::MissingTask(*label))?;
            let record = run_condition(surface, acquisition.source(), &mut **task, config)?;
            builder.insert(*label, record)?;
        }

        surface.show_text(FAREWELL_TEXT, Duration::from_millis(config.farewell_ms))?;
        drop(acquisition);

        let record = builder.finish(conditions)?;
        info!("session complete with {} conditions", record.len());
        Ok(record)
    }
}

fn run_condition<S, A, T>(
    surface: &mut S,
    source: &mut A,
    task: &mut T,
    config: &SessionConfig,
) -> Result<ConditionRecord, SessionError>
where
    S: PresentationSurface,
    A: AcquisitionSource,
    T: ConditionTask<S, A> + ?Sized,
{
    let baseline = record_window(surface, source, AcquisitionPhase::Baseline, config.baseline_ms)?;
    let pre_trial = record_window(
        surface,
        source,
        AcquisitionPhase::PreTrial,
        config.pre_trial_ms,
    )?;
    let trial = task.run(surface, source, config)?.retag(AcquisitionPhase::Task);
    let self_report = collect_self_report(surface, config)?;

    surface.show_text(BREAK_TEXT, Duration::from_millis(config.break_ms))?;

    Ok(ConditionRecord {
        baseline,
        pre_trial,
        trial,
        self_report,
    })
}

/// Holds the phase's screen for `duration_ms`, then drains the device.
fn record_window<S, A>(
    surface: &mut S,
    source: &mut A,
    phase: AcquisitionPhase,
    duration_ms: u64,
) -> Result<SampleBlock, SessionError>
where
    S: PresentationSurface,
    A: AcquisitionSource,
{
    let text = phase.screen_text().unwrap_or("+");
    surface.show_text(text, Duration::from_millis(duration_ms))?;
    Ok(drain(source, phase))
}

fn collect_self_report<S: PresentationSurface>(
    surface: &mut S,
    config: &SessionConfig,
) -> Result<SelfReport, SessionError> {
    surface.show_text(
        SELF_REPORT_PROMPT,
        Duration::from_millis(config.self_report_prompt_ms),
    )?;
    let key = surface.wait_for_key(
        &FocusRating::keys(),
        Duration::from_millis(config.self_report_timeout_ms),
    );
    let report = SelfReport::from_key(key);
    match report {
        SelfReport::Rated(rating) => info!("self-report rating: {}", rating.value()),
        SelfReport::NoResponse => warn!(
            "no self-report within {} ms",
            config.self_report_timeout_ms
        ),
    }
    Ok(report)
}
