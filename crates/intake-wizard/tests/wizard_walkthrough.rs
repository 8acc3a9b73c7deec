//! End-to-end walkthrough of a submission through the public wizard service.

mod common {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use intake_wizard::config::WizardConfig;
    use intake_wizard::wizard::{
        IntakeWizardService, InMemoryStepStateStore, ProgressPolicy, StepValues,
    };
    use serde_json::Value;

    pub(super) const KEY: &str = "en-E-D-R1-E1-N-N-C";

    pub(super) fn service() -> IntakeWizardService<InMemoryStepStateStore> {
        let config = WizardConfig {
            progress: ProgressPolicy::default(),
            reference_date: Some(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
        };
        IntakeWizardService::new(Arc::new(InMemoryStepStateStore::default()), config)
    }

    pub(super) fn values(value: Value) -> StepValues {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture values must be an object, got {other}"),
        }
    }
}

use common::{service, values, KEY};
use intake_wizard::requirements::decode;
use intake_wizard::wizard::{StepKind, SubmissionId, TransitionError, WizardServiceError};
use serde_json::json;

#[test]
fn applicant_walks_every_step_to_completion() {
    let service = service();
    let requirements = decode(KEY).expect("key decodes");
    let id = SubmissionId::new("walkthrough");

    let start = service.resume_step(&id, &requirements).expect("resume");
    assert_eq!(start, StepKind::PersonalInfo);
    let navigation = service.navigation(&id, &requirements, start).expect("navigation");
    assert_eq!(
        navigation.available_steps,
        vec![
            StepKind::PersonalInfo,
            StepKind::ResidenceHistory,
            StepKind::EmploymentHistory,
            StepKind::DriverLicenseConsent,
            StepKind::Signature,
        ]
    );
    assert_eq!(navigation.progress_percentage, 0);

    let personal = service
        .update_step(
            &id,
            &requirements,
            StepKind::PersonalInfo,
            values(json!({ "email": "not-an-email" })),
        )
        .expect("update");
    assert!(!personal.is_valid);
    assert!(matches!(
        service.move_next(&id, &requirements, StepKind::PersonalInfo),
        Err(WizardServiceError::Transition(
            TransitionError::CurrentStepIncomplete(StepKind::PersonalInfo)
        ))
    ));

    service
        .update_step(
            &id,
            &requirements,
            StepKind::PersonalInfo,
            values(json!({ "email": "jordan@example.com" })),
        )
        .expect("update");
    let step = service
        .move_next(&id, &requirements, StepKind::PersonalInfo)
        .expect("advance");
    assert_eq!(step, StepKind::ResidenceHistory);

    let residence = service
        .update_step(
            &id,
            &requirements,
            step,
            values(json!({
                "entries": [{
                    "street": "400 Locust St",
                    "city": "Des Moines",
                    "region": "IA",
                    "postal_code": "50309",
                    "start_date": "2020-02-01",
                    "is_current": true,
                }]
            })),
        )
        .expect("update");
    assert!(residence.is_passable(), "residence errors: {:?}", residence.errors);
    let step = service.move_next(&id, &requirements, step).expect("advance");
    assert_eq!(step, StepKind::EmploymentHistory);

    let employment = service
        .update_step(
            &id,
            &requirements,
            step,
            values(json!({
                "entries": [{
                    "employer_name": "Hawkeye Logistics",
                    "position": "Dispatcher",
                    "start_date": "2024-01-01",
                    "is_current": true,
                }]
            })),
        )
        .expect("update");
    assert!(!employment.is_valid);
    assert!(employment.errors.contains_key("timeline"));

    let employment = service
        .update_step(
            &id,
            &requirements,
            step,
            values(json!({
                "entries": [
                    {
                        "employer_name": "Cedar Valley Transit",
                        "position": "Driver",
                        "start_date": "2019-03-01",
                        "end_date": "2024-01-01",
                    },
                    {
                        "employer_name": "Hawkeye Logistics",
                        "position": "Dispatcher",
                        "start_date": "2024-01-01",
                        "is_current": true,
                    }
                ]
            })),
        )
        .expect("update");
    assert!(employment.is_passable(), "employment errors: {:?}", employment.errors);
    let step = service.move_next(&id, &requirements, step).expect("advance");
    assert_eq!(step, StepKind::DriverLicenseConsent);

    service
        .update_step(
            &id,
            &requirements,
            step,
            values(json!({
                "accepted": true,
                "license_number": "D123-4567",
                "issuing_region": "IA",
            })),
        )
        .expect("update");
    let step = service.move_next(&id, &requirements, step).expect("advance");
    assert_eq!(step, StepKind::Signature);
    assert!(!service.is_form_complete(&id, &requirements).expect("query"));

    service
        .update_step(
            &id,
            &requirements,
            step,
            values(json!({ "signature_confirmed": true })),
        )
        .expect("update");
    let navigation = service.navigation(&id, &requirements, step).expect("navigation");
    assert!(navigation.is_form_complete);
    assert!(!navigation.can_move_next);
    assert_eq!(navigation.progress_percentage, 100);
    assert!(matches!(
        service.move_next(&id, &requirements, step),
        Err(WizardServiceError::Transition(TransitionError::NoNextStep(
            StepKind::Signature
        )))
    ));
}

#[test]
fn jumping_to_disabled_steps_is_rejected() {
    let service = service();
    let requirements = decode(KEY).expect("key decodes");

    assert_eq!(
        service
            .move_to(&requirements, StepKind::EmploymentHistory)
            .expect("enabled step"),
        StepKind::EmploymentHistory
    );
    assert!(matches!(
        service.move_to(&requirements, StepKind::Education),
        Err(WizardServiceError::Transition(TransitionError::StepNotAvailable(
            StepKind::Education
        )))
    ));
    assert_eq!(
        service
            .move_previous(&requirements, StepKind::DriverLicenseConsent)
            .expect("previous"),
        StepKind::EmploymentHistory
    );
}
