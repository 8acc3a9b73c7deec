use super::catalog::StepCatalog;
use super::domain::{NavigationState, StepKind, StepStates};
use crate::requirements::Requirements;
use serde::{Deserialize, Serialize};

/// Rejected move; the caller's current step and step states are untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("step {0} is not enabled for this submission")]
    StepNotAvailable(StepKind),
    #[error("step {0} must be valid and complete before moving on")]
    CurrentStepIncomplete(StepKind),
    #[error("step {0} is the last step")]
    NoNextStep(StepKind),
    #[error("step {0} is the first step")]
    NoPreviousStep(StepKind),
    #[error("no steps are enabled for this submission")]
    NoAvailableSteps,
}

/// How progress credits the step the user is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPolicy {
    /// Grant half a step when the current step is valid but not yet complete.
    pub partial_credit_for_valid_current: bool,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            partial_credit_for_valid_current: true,
        }
    }
}

/// Enabled steps for `requirements`, in catalog order.
pub fn compute_available_steps(requirements: &Requirements) -> Vec<StepKind> {
    StepCatalog::standard().enabled_steps(requirements)
}

/// Pure navigation over a fixed set of available steps.
#[derive(Debug, Clone)]
pub struct WizardNavigator {
    available: Vec<StepKind>,
    policy: ProgressPolicy,
}

impl WizardNavigator {
    pub fn new(requirements: &Requirements) -> Self {
        Self::with_policy(requirements, ProgressPolicy::default())
    }

    pub fn with_policy(requirements: &Requirements, policy: ProgressPolicy) -> Self {
        Self {
            available: compute_available_steps(requirements),
            policy,
        }
    }

    pub fn available_steps(&self) -> &[StepKind] {
        &self.available
    }

    pub fn is_available(&self, step: StepKind) -> bool {
        self.available.contains(&step)
    }

    fn position(&self, step: StepKind) -> Result<usize, TransitionError> {
        self.available
            .iter()
            .position(|candidate| *candidate == step)
            .ok_or(TransitionError::StepNotAvailable(step))
    }

    pub fn first_step(&self) -> Option<StepKind> {
        self.available.first().copied()
    }

    pub fn next_step(&self, current: StepKind) -> Option<StepKind> {
        let index = self.position(current).ok()?;
        self.available.get(index + 1).copied()
    }

    pub fn previous_step(&self, current: StepKind) -> Option<StepKind> {
        let index = self.position(current).ok()?;
        index
            .checked_sub(1)
            .and_then(|previous| self.available.get(previous).copied())
    }

    pub fn completed_steps(&self, states: &StepStates) -> Vec<StepKind> {
        self.available
            .iter()
            .copied()
            .filter(|step| states.get(step).map(|s| s.is_complete).unwrap_or(false))
            .collect()
    }

    pub fn can_move_next(&self, current: StepKind, states: &StepStates) -> bool {
        self.move_next(current, states).is_ok()
    }

    pub fn can_move_previous(&self, current: StepKind) -> bool {
        self.previous_step(current).is_some()
    }

    pub fn move_next(
        &self,
        current: StepKind,
        states: &StepStates,
    ) -> Result<StepKind, TransitionError> {
        let index = self.position(current)?;
        let passable = states
            .get(&current)
            .map(|state| state.is_passable())
            .unwrap_or(false);
        if !passable {
            return Err(TransitionError::CurrentStepIncomplete(current));
        }

        self.available
            .get(index + 1)
            .copied()
            .ok_or(TransitionError::NoNextStep(current))
    }

    pub fn move_previous(&self, current: StepKind) -> Result<StepKind, TransitionError> {
        let index = self.position(current)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.available.get(previous).copied())
            .ok_or(TransitionError::NoPreviousStep(current))
    }

    pub fn move_to(&self, target: StepKind) -> Result<StepKind, TransitionError> {
        self.position(target).map(|_| target)
    }

    /// Parse a step id and move to it.
    pub fn move_to_id(&self, target: &str) -> Result<StepKind, TransitionError> {
        let step = target.parse::<StepKind>()?;
        self.move_to(step)
    }

    pub fn is_form_complete(&self, states: &StepStates) -> bool {
        self.available
            .iter()
            .all(|step| states.get(step).map(|s| s.is_complete).unwrap_or(false))
    }

    /// Where a returning user should resume: the first incomplete step, else the last one.
    pub fn first_incomplete_step(&self, states: &StepStates) -> Option<StepKind> {
        self.available
            .iter()
            .copied()
            .find(|step| !states.get(step).map(|s| s.is_complete).unwrap_or(false))
            .or_else(|| self.available.last().copied())
    }

    pub fn progress_percentage(&self, current: StepKind, states: &StepStates) -> u8 {
        if self.available.is_empty() {
            return 100;
        }

        let completed = self.completed_steps(states).len() as f64;
        let partial = match states.get(&current) {
            Some(state)
                if self.policy.partial_credit_for_valid_current
                    && self.is_available(current)
                    && state.is_valid
                    && !state.is_complete =>
            {
                0.5
            }
            _ => 0.0,
        };

        let percentage = (completed + partial) / self.available.len() as f64 * 100.0;
        percentage.round().clamp(0.0, 100.0) as u8
    }

    pub fn snapshot(
        &self,
        current: StepKind,
        states: &StepStates,
    ) -> Result<NavigationState, TransitionError> {
        if self.available.is_empty() {
            return Err(TransitionError::NoAvailableSteps);
        }
        self.position(current)?;

        Ok(NavigationState {
            available_steps: self.available.clone(),
            current_step: current,
            next_step: self.next_step(current),
            previous_step: self.previous_step(current),
            completed_steps: self.completed_steps(states),
            can_move_next: self.can_move_next(current, states),
            can_move_previous: self.can_move_previous(current),
            progress_percentage: self.progress_percentage(current, states),
            is_form_complete: self.is_form_complete(states),
        })
    }
}
