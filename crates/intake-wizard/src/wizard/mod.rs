//! Step catalog, per-step completion, and navigation for the intake wizard.

pub mod catalog;
pub mod completion;
pub mod domain;
mod fields;
pub mod navigation;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    AccumulatorStepConfig, CompletionRule, CoverageRule, FieldKind, FieldSpec, ResolvedStepConfig,
    SimpleStepConfig, StepCatalog, ValidationRule,
};
pub use completion::{complete_step, AccumulatorLike, Validatable};
pub use domain::{FieldErrors, NavigationState, StepKind, StepState, StepStates, StepValues};
pub use navigation::{compute_available_steps, ProgressPolicy, TransitionError, WizardNavigator};
pub use repository::{InMemoryStepStateStore, StepStateStore, StoreError, SubmissionId};
pub use service::{IntakeWizardService, WizardServiceError};
