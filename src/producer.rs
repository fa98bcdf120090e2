//! Producer threads: the cooperative run loop and the continuous-learning cadence.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::LearningSettings;
use crate::state::SharedContext;

pub const PAUSED_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerExit {
    Quit,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerReport {
    pub steps: u64,
    pub exit: ProducerExit,
}

/// Calls `step` every `interval` until quit is requested or a step fails.
///
/// Paused producers only poll. With single-step mode on, each completed step
/// pauses the producer again so the operator advances one step per resume.
pub fn run_producer<F, E>(shared: &SharedContext, interval: Duration, mut step: F) -> ProducerReport
where
    F: FnMut(&SharedContext) -> Result<(), E>,
    E: std::fmt::Display,
{
    let mut steps = 0_u64;
    loop {
        let control = shared.run_control();
        if control.is_quit() {
            tracing::debug!(steps, "producer observed quit");
            return ProducerReport {
                steps,
                exit: ProducerExit::Quit,
            };
        }
        if control.is_paused() {
            thread::sleep(PAUSED_POLL_INTERVAL);
            continue;
        }

        if let Err(err) = step(shared) {
            tracing::error!(%err, steps, "producer step failed; stopping producer");
            return ProducerReport {
                steps,
                exit: ProducerExit::Failed,
            };
        }
        steps += 1;

        {
            let mut scope = shared.acquire_scoped();
            let control = scope.run_control_mut();
            if control.is_single_step_on() && !control.is_paused() {
                control.pause();
                tracing::debug!(steps, "single step done; pausing");
            }
        }
        thread::sleep(interval);
    }
}

pub fn spawn_producer<F, E>(
    name: &str,
    shared: Arc<SharedContext>,
    interval: Duration,
    step: F,
) -> std::io::Result<thread::JoinHandle<ProducerReport>>
where
    F: FnMut(&SharedContext) -> Result<(), E> + Send + 'static,
    E: std::fmt::Display,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || run_producer(&shared, interval, step))
}

pub trait LearningLoop {
    type Error: std::fmt::Display;

    fn perform_learning(&mut self, shared: &SharedContext) -> Result<(), Self::Error>;

    /// One test measurement; called every `learning_iterations_to_test_ratio` iterations.
    fn collect_test_statistics(&mut self, _shared: &SharedContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after every `number_of_averaged_test_measures` measurements.
    fn populate_test_statistics(&mut self, _shared: &SharedContext) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceStep {
    Learned,
    Tested,
    Populated,
}

#[derive(Debug, Clone)]
pub struct LearningCadence {
    settings: LearningSettings,
    learning_iteration: u64,
    pending_measures: u32,
}

impl LearningCadence {
    pub fn new(settings: LearningSettings) -> Self {
        Self {
            settings,
            learning_iteration: 0,
            pending_measures: 0,
        }
    }

    pub fn learning_iteration(&self) -> u64 {
        self.learning_iteration
    }

    /// One learning iteration, followed by a test and a statistics flush when due.
    pub fn step<L: LearningLoop>(
        &mut self,
        learner: &mut L,
        shared: &SharedContext,
    ) -> Result<CadenceStep, L::Error> {
        learner.perform_learning(shared)?;
        self.learning_iteration += 1;

        let ratio = u64::from(self.settings.learning_iterations_to_test_ratio.max(1));
        if self.learning_iteration % ratio != 0 {
            return Ok(CadenceStep::Learned);
        }
        learner.collect_test_statistics(shared)?;
        self.pending_measures += 1;

        if self.pending_measures < self.settings.number_of_averaged_test_measures.max(1) {
            return Ok(CadenceStep::Tested);
        }
        learner.populate_test_statistics(shared)?;
        self.pending_measures = 0;
        tracing::debug!(iteration = self.learning_iteration, "populated test statistics");
        Ok(CadenceStep::Populated)
    }

    pub fn run<L: LearningLoop>(
        &mut self,
        learner: &mut L,
        shared: &SharedContext,
        interval: Duration,
    ) -> ProducerReport {
        run_producer(shared, interval, |shared| self.step(learner, shared).map(|_| ()))
    }
}
