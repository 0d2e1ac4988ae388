use std::time::Duration;

use focusex_core::{
    AcquisitionPhase, AcquisitionSource, ConditionLabel, PresentationSurface, SampleBlock,
};
use log::{debug, info};
use rand::Rng;

use crate::{ArithmeticProblem, SessionConfig, SessionError, drain};

pub const READING_PASSAGE: &str = "\
    It has been suggested that people attend to others' actions in the service of forming \
    impressions of their underlying dispositions. If so, it follows that in considering \
    others' morally relevant actions, social perceivers should be responsive to \
    accompanying cues that help illuminate actors' underlying moral character. This \
    article examines one relevant cue that can characterize any decision process: the \
    speed with which the decision is made. Two experiments show that actors who make an \
    immoral decision quickly (vs. slowly) are evaluated more negatively. In contrast, \
    actors who arrive at a moral decision quickly (vs. slowly) receive particularly \
    positive moral character evaluations. Quick decisions carry this signal value because \
    they are assumed to reflect certainty in the decision, which in turn signals that more \
    unambiguous motives drove the behavior, explaining the more polarized moral character \
    evaluations.";

const STILLNESS: &str = "\
    Keep your eyes open, fixating on the neutral point, and remain as still as possible.\n\n\
    Avoid distractions or looking away from the screen.\n\n\
    Stay still until further instructions are given.";

const FIXATION: &str = "+";

/// Stimulus timeline of one condition.
///
/// `run` returns the samples recorded while the condition's stimulus was
/// on screen; anything buffered before the stimulus started is discarded.
pub trait ConditionTask<S: PresentationSurface, A: AcquisitionSource> {
    fn label(&self) -> ConditionLabel;

    fn run(
        &mut self,
        surface: &mut S,
        source: &mut A,
        config: &SessionConfig,
    ) -> Result<SampleBlock, SessionError>;
}

fn instruct<S, A>(
    surface: &mut S,
    source: &mut A,
    text: &str,
    duration_ms: u64,
) -> Result<(), SessionError>
where
    S: PresentationSurface,
    A: AcquisitionSource,
{
    surface.show_text(text, Duration::from_millis(duration_ms))?;
    let discarded = drain(source, AcquisitionPhase::PreTrial);
    debug!(
        "discarded {} samples recorded during instructions",
        discarded.sample_count()
    );
    Ok(())
}

/// High attention: read a dense passage.
#[derive(Debug, Default, Clone)]
pub struct ReadingTask;

impl<S: PresentationSurface, A: AcquisitionSource> ConditionTask<S, A> for ReadingTask {
    fn label(&self) -> ConditionLabel {
        ConditionLabel::HighAttention
    }

    fn run(
        &mut self,
        surface: &mut S,
        source: &mut A,
        config: &SessionConfig,
    ) -> Result<SampleBlock, SessionError> {
        let instructions = format!(
            "Please read the excerpt carefully and focus on understanding it.\n\n{STILLNESS}\n\n\
             You will have {} seconds to read.",
            config.task_ms / 1000
        );
        instruct(surface, source, &instructions, config.reading_instructions_ms)?;

        info!("presenting reading passage for {} ms", config.task_ms);
        surface.show_text(READING_PASSAGE, Duration::from_millis(config.task_ms))?;
        Ok(drain(source, AcquisitionPhase::Task))
    }
}

/// Low attention: listen to background music under a fixation cross.
#[derive(Debug, Default, Clone)]
pub struct ListeningTask;

impl<S: PresentationSurface, A: AcquisitionSource> ConditionTask<S, A> for ListeningTask {
    fn label(&self) -> ConditionLabel {
        ConditionLabel::LowAttention
    }

    fn run(
        &mut self,
        surface: &mut S,
        source: &mut A,
        config: &SessionConfig,
    ) -> Result<SampleBlock, SessionError> {
        let instructions = format!(
            "Please listen to the music.\n\n{STILLNESS}\n\nYou will have {} seconds to listen.",
            config.task_ms / 1000
        );
        instruct(surface, source, &instructions, config.task_instructions_ms)?;

        info!(
            "playing {} for {} ms",
            config.audio_clip.display(),
            config.task_ms
        );
        surface.play_audio(&config.audio_clip)?;
        // Stop the clip even when the fixation screen fails.
        let shown = surface.show_text(FIXATION, Duration::from_millis(config.task_ms));
        let stopped = surface.stop_audio();
        shown?;
        stopped?;
        Ok(drain(source, AcquisitionPhase::Task))
    }
}

/// Fatigue: continuous mental arithmetic, a new problem every interval.
#[derive(Debug, Clone)]
pub struct ArithmeticTask<R: Rng> {
    rng: R,
    presented: Vec<ArithmeticProblem>,
}

impl<R: Rng> ArithmeticTask<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            presented: Vec::new(),
        }
    }

    /// Problems shown so far, across runs.
    pub fn presented(&self) -> &[ArithmeticProblem] {
        &self.presented
    }
}

impl<S, A, R> ConditionTask<S, A> for ArithmeticTask<R>
where
    S: PresentationSurface,
    A: AcquisitionSource,
    R: Rng,
{
    fn label(&self) -> ConditionLabel {
        ConditionLabel::Fatigue
    }

    fn run(
        &mut self,
        surface: &mut S,
        source: &mut A,
        config: &SessionConfig,
    ) -> Result<SampleBlock, SessionError> {
        let instructions = format!(
            "Please solve the arithmetic problems as quickly and accurately as possible.\n\n\
             {STILLNESS}\n\nYou will have {} seconds to solve problems.",
            config.task_ms / 1000
        );
        instruct(surface, source, &instructions, config.task_instructions_ms)?;

        let count = config.problem_count();
        info!(
            "presenting {} problems, one every {} ms",
            count, config.problem_interval_ms
        );
        let interval = Duration::from_millis(config.problem_interval_ms);
        for i in 0..count {
            let problem = ArithmeticProblem::generate(&mut self.rng);
            debug!("problem {}: {} (answer {})", i + 1, problem, problem.answer());
            surface.show_text(&problem.to_string(), interval)?;
            self.presented.push(problem);
        }
        Ok(drain(source, AcquisitionPhase::Task))
    }
}

/// One task per condition; `problem_rng` feeds the arithmetic generator.
pub fn standard_tasks<S, A, R>(problem_rng: R) -> Vec<Box<dyn ConditionTask<S, A>>>
where
    S: PresentationSurface,
    A: AcquisitionSource,
    R: Rng + 'static,
{
    vec![
        Box::new(ReadingTask),
        Box::new(ListeningTask),
        Box::new(ArithmeticTask::new(problem_rng)),
    ]
}
