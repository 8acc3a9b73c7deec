use std::sync::Arc;

use tracing::{info, warn};

use super::catalog::{ResolvedStepConfig, StepCatalog};
use super::completion::complete_step;
use super::domain::{NavigationState, StepKind, StepState, StepValues};
use super::navigation::{TransitionError, WizardNavigator};
use super::repository::{StepStateStore, StoreError, SubmissionId};
use crate::config::WizardConfig;
use crate::requirements::Requirements;

/// Service composing the step catalog, completion rules, navigation, and storage.
///
/// Every call takes the submission's decoded requirements; nothing about a
/// submission is cached here.
pub struct IntakeWizardService<S> {
    store: Arc<S>,
    catalog: Arc<StepCatalog>,
    config: WizardConfig,
}

impl<S> IntakeWizardService<S>
where
    S: StepStateStore + 'static,
{
    pub fn new(store: Arc<S>, config: WizardConfig) -> Self {
        Self::with_catalog(store, Arc::new(StepCatalog::standard()), config)
    }

    pub fn with_catalog(store: Arc<S>, catalog: Arc<StepCatalog>, config: WizardConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn navigator(&self, requirements: &Requirements) -> WizardNavigator {
        WizardNavigator::with_policy(requirements, self.config.progress)
    }

    /// Resolved configuration for an enabled step.
    pub fn resolve_step(
        &self,
        requirements: &Requirements,
        step: StepKind,
    ) -> Result<ResolvedStepConfig, WizardServiceError> {
        if !step.is_enabled(requirements) {
            return Err(TransitionError::StepNotAvailable(step).into());
        }
        Ok(self.catalog.resolve(step, requirements))
    }

    /// Merge new values into a step, re-evaluate it, and persist the result.
    pub fn update_step(
        &self,
        submission: &SubmissionId,
        requirements: &Requirements,
        step: StepKind,
        incoming: StepValues,
    ) -> Result<StepState, WizardServiceError> {
        let config = self.resolve_step(requirements, step).map_err(|err| {
            warn!(submission = %submission.0, %step, "rejected update for disabled step");
            err
        })?;

        let existing = self.store.load(submission, step)?.unwrap_or_default();
        let updated = complete_step(&config, &existing, incoming, self.config.today());
        self.store.save(submission, step, updated.clone())?;

        info!(
            submission = %submission.0,
            %step,
            is_valid = updated.is_valid,
            is_complete = updated.is_complete,
            "step updated"
        );
        Ok(updated)
    }

    pub fn navigation(
        &self,
        submission: &SubmissionId,
        requirements: &Requirements,
        current: StepKind,
    ) -> Result<NavigationState, WizardServiceError> {
        let states = self.store.load_all(submission)?;
        Ok(self.navigator(requirements).snapshot(current, &states)?)
    }

    pub fn move_next(
        &self,
        submission: &SubmissionId,
        requirements: &Requirements,
        current: StepKind,
    ) -> Result<StepKind, WizardServiceError> {
        let states = self.store.load_all(submission)?;
        self.navigator(requirements)
            .move_next(current, &states)
            .map_err(|err| {
                warn!(submission = %submission.0, %current, error = %err, "move next rejected");
                err.into()
            })
    }

    pub fn move_previous(
        &self,
        requirements: &Requirements,
        current: StepKind,
    ) -> Result<StepKind, WizardServiceError> {
        Ok(self.navigator(requirements).move_previous(current)?)
    }

    pub fn move_to(
        &self,
        requirements: &Requirements,
        target: StepKind,
    ) -> Result<StepKind, WizardServiceError> {
        Ok(self.navigator(requirements).move_to(target)?)
    }

    /// Step a returning user should land on.
    pub fn resume_step(
        &self,
        submission: &SubmissionId,
        requirements: &Requirements,
    ) -> Result<StepKind, WizardServiceError> {
        let states = self.store.load_all(submission)?;
        self.navigator(requirements)
            .first_incomplete_step(&states)
            .ok_or(WizardServiceError::Transition(
                TransitionError::NoAvailableSteps,
            ))
    }

    pub fn is_form_complete(
        &self,
        submission: &SubmissionId,
        requirements: &Requirements,
    ) -> Result<bool, WizardServiceError> {
        let states = self.store.load_all(submission)?;
        Ok(self.navigator(requirements).is_form_complete(&states))
    }

    pub fn discard(&self, submission: &SubmissionId) -> Result<(), WizardServiceError> {
        self.store.discard(submission)?;
        info!(submission = %submission.0, "submission discarded");
        Ok(())
    }
}

/// Error raised by the wizard service.
#[derive(Debug, thiserror::Error)]
pub enum WizardServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
