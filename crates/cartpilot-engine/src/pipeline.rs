//! Fail-fast step pipeline.
//!
//! Steps run strictly in order. The first step that reports failure (or
//! returns an error) halts the run; the pipeline itself never retries.

use crate::error::WorkflowError;
use async_trait::async_trait;
use tracing::{error, info};

/// One named unit of pipeline work.
#[async_trait]
pub trait StepAction<C: ?Sized + Sync>: Send + Sync {
    /// `Ok(true)` to continue, `Ok(false)` for an expected failure.
    async fn run(&self, ctx: &C) -> Result<bool, WorkflowError>;
}

pub struct Step<A> {
    pub name: String,
    pub action: A,
}

impl<A> Step<A> {
    pub fn new(name: impl Into<String>, action: A) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending(usize),
    Succeeded,
    Failed(usize),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PipelineState::Pending(_))
    }

    /// Apply the outcome of the current step. Terminal states are absorbing.
    pub fn advance(self, step_succeeded: bool, total_steps: usize) -> PipelineState {
        match self {
            PipelineState::Pending(i) if !step_succeeded => PipelineState::Failed(i),
            PipelineState::Pending(i) if i + 1 < total_steps => PipelineState::Pending(i + 1),
            PipelineState::Pending(_) => PipelineState::Succeeded,
            terminal => terminal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub state: PipelineState,
    /// Names of the steps that completed, in order.
    pub completed: Vec<String>,
    pub failed_step: Option<String>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Succeeded
    }
}

pub struct Pipeline<A> {
    steps: Vec<Step<A>>,
}

impl<A> Pipeline<A> {
    pub fn new(steps: Vec<Step<A>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub async fn run<C>(&self, ctx: &C) -> PipelineReport
    where
        C: ?Sized + Sync,
        A: StepAction<C>,
    {
        let total = self.steps.len();
        let mut completed = Vec::new();

        if total == 0 {
            return PipelineReport {
                state: PipelineState::Succeeded,
                completed,
                failed_step: None,
            };
        }

        let mut state = PipelineState::Pending(0);
        while let PipelineState::Pending(index) = state {
            let step = &self.steps[index];
            info!("Starting: {}", step.name);

            let succeeded = match step.action.run(ctx).await {
                Ok(true) => true,
                Ok(false) => false,
                Err(e) => {
                    error!("{} raised: {}", step.name, e);
                    false
                }
            };

            if succeeded {
                info!("Completed: {}", step.name);
                completed.push(step.name.clone());
            } else {
                error!("Failed: {}", step.name);
            }
            state = state.advance(succeeded, total);
        }

        let failed_step = match state {
            PipelineState::Failed(i) => Some(self.steps[i].name.clone()),
            _ => None,
        };
        PipelineReport {
            state,
            completed,
            failed_step,
        }
    }
}
