use super::common::*;
use crate::wizard::domain::{StepKind, StepState, StepStates, StepValues};
use crate::wizard::navigation::TransitionError;
use crate::wizard::repository::{StepStateStore, StoreError, SubmissionId};
use crate::wizard::service::{IntakeWizardService, WizardServiceError};
use serde_json::json;
use std::sync::Arc;

struct UnavailableStore;

impl StepStateStore for UnavailableStore {
    fn load(&self, _id: &SubmissionId, _step: StepKind) -> Result<Option<StepState>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn load_all(&self, _id: &SubmissionId) -> Result<StepStates, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn save(
        &self,
        _id: &SubmissionId,
        _step: StepKind,
        _state: StepState,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn discard(&self, _id: &SubmissionId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[test]
fn update_step_persists_evaluated_state() {
    let (service, store) = build_service();
    let id = submission("persist");
    let requirements = requirements(FULL_KEY);

    let state = service
        .update_step(
            &id,
            &requirements,
            StepKind::DrugTestConsent,
            values(json!({ "accepted": true })),
        )
        .expect("update succeeds");
    assert!(state.is_passable());

    let stored = store
        .load(&id, StepKind::DrugTestConsent)
        .expect("load succeeds")
        .expect("state stored");
    assert_eq!(stored, state);
}

#[test]
fn update_step_rejects_disabled_step_without_mutation() {
    let (service, store) = build_service();
    let id = submission("disabled");
    let requirements = requirements("en-P-N-N-N-N-N-C");

    match service.update_step(
        &id,
        &requirements,
        StepKind::ResidenceHistory,
        StepValues::new(),
    ) {
        Err(WizardServiceError::Transition(TransitionError::StepNotAvailable(step))) => {
            assert_eq!(step, StepKind::ResidenceHistory)
        }
        other => panic!("expected step not available, got {other:?}"),
    }
    assert!(store.load_all(&id).expect("load succeeds").is_empty());
}

#[test]
fn move_next_reads_stored_states() {
    let (service, _store) = build_service();
    let id = submission("move");
    let requirements = requirements("en-P-D-N-N-N-N-C");

    match service.move_next(&id, &requirements, StepKind::PersonalInfo) {
        Err(WizardServiceError::Transition(TransitionError::CurrentStepIncomplete(_))) => {}
        other => panic!("expected incomplete step, got {other:?}"),
    }

    service
        .update_step(
            &id,
            &requirements,
            StepKind::PersonalInfo,
            values(json!({ "phone": "+1 515 555 0134" })),
        )
        .expect("update succeeds");
    let next = service
        .move_next(&id, &requirements, StepKind::PersonalInfo)
        .expect("personal info complete");
    assert_eq!(next, StepKind::DriverLicenseConsent);

    let navigation = service
        .navigation(&id, &requirements, next)
        .expect("navigation available");
    assert_eq!(navigation.completed_steps, vec![StepKind::PersonalInfo]);
    assert_eq!(navigation.progress_percentage, 33);
    assert_eq!(navigation.previous_step, Some(StepKind::PersonalInfo));
}

#[test]
fn form_completes_once_every_available_step_is_complete() {
    let (service, _store) = build_service();
    let id = submission("complete");
    let requirements = requirements("en-P-N-N-N-E-N-C");

    let updates = [
        (StepKind::PersonalInfo, json!({ "phone": "515-555-0134" })),
        (StepKind::Education, json!({ "highest_level": "high_school" })),
        (StepKind::Signature, json!({ "signature_confirmed": "on" })),
    ];
    for (step, incoming) in updates {
        assert!(!service
            .is_form_complete(&id, &requirements)
            .expect("query succeeds"));
        service
            .update_step(&id, &requirements, step, values(incoming))
            .expect("update succeeds");
    }

    assert!(service
        .is_form_complete(&id, &requirements)
        .expect("query succeeds"));
    assert_eq!(
        service.resume_step(&id, &requirements).expect("resume"),
        StepKind::Signature
    );
}

#[test]
fn discard_removes_submission() {
    let (service, store) = build_service();
    let id = submission("discard");
    let requirements = requirements(FULL_KEY);
    service
        .update_step(
            &id,
            &requirements,
            StepKind::BiometricConsent,
            values(json!({ "accepted": true })),
        )
        .expect("update succeeds");

    service.discard(&id).expect("discard succeeds");
    assert!(store.load_all(&id).expect("load succeeds").is_empty());
    assert!(matches!(
        service.discard(&id),
        Err(WizardServiceError::Store(StoreError::NotFound))
    ));
}

#[test]
fn store_failures_propagate() {
    let service = IntakeWizardService::new(Arc::new(UnavailableStore), wizard_config());
    let requirements = requirements(FULL_KEY);

    match service.update_step(
        &submission("offline"),
        &requirements,
        StepKind::PersonalInfo,
        StepValues::new(),
    ) {
        Err(WizardServiceError::Store(StoreError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline")
        }
        other => panic!("expected store failure, got {other:?}"),
    }
}
