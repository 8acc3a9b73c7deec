use std::sync::Arc;

use chrono::{Months, NaiveDate};
use serde_json::{json, Value};

use crate::config::WizardConfig;
use crate::requirements::{decode, Requirements};
use crate::wizard::catalog::{ResolvedStepConfig, StepCatalog};
use crate::wizard::domain::{StepKind, StepState, StepStates, StepValues};
use crate::wizard::navigation::ProgressPolicy;
use crate::wizard::repository::{InMemoryStepStateStore, SubmissionId};
use crate::wizard::service::IntakeWizardService;

pub(super) const FULL_KEY: &str = "en-EPM-DTB-R3-E3-E-P-C";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

pub(super) fn years_ago(years: u32) -> String {
    today()
        .checked_sub_months(Months::new(years * 12))
        .expect("date in range")
        .to_string()
}

pub(super) fn requirements(key: &str) -> Requirements {
    decode(key).expect("fixture key decodes")
}

pub(super) fn resolve(key: &str, step: StepKind) -> ResolvedStepConfig {
    StepCatalog::standard().resolve(step, &requirements(key))
}

pub(super) fn values(value: Value) -> StepValues {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture values must be an object, got {other}"),
    }
}

pub(super) fn residence(start: &str, end: Option<&str>) -> Value {
    json!({
        "street": "400 Locust St",
        "city": "Des Moines",
        "region": "IA",
        "postal_code": "50309",
        "start_date": start,
        "end_date": end,
        "is_current": end.is_none(),
    })
}

pub(super) fn employer(start: &str, end: Option<&str>) -> Value {
    employer_named("Hawkeye Logistics", start, end)
}

pub(super) fn employer_named(name: &str, start: &str, end: Option<&str>) -> Value {
    json!({
        "employer_name": name,
        "position": "Dispatcher",
        "start_date": start,
        "end_date": end,
        "is_current": end.is_none(),
    })
}

pub(super) fn passable() -> StepState {
    StepState {
        is_valid: true,
        is_complete: true,
        ..StepState::default()
    }
}

pub(super) fn valid_incomplete() -> StepState {
    StepState {
        is_valid: true,
        ..StepState::default()
    }
}

pub(super) fn states(entries: &[(StepKind, StepState)]) -> StepStates {
    entries.iter().cloned().collect()
}

pub(super) fn wizard_config() -> WizardConfig {
    WizardConfig {
        progress: ProgressPolicy::default(),
        reference_date: Some(today()),
    }
}

pub(super) fn build_service() -> (
    IntakeWizardService<InMemoryStepStateStore>,
    Arc<InMemoryStepStateStore>,
) {
    let store = Arc::new(InMemoryStepStateStore::default());
    let service = IntakeWizardService::new(store.clone(), wizard_config());
    (service, store)
}

pub(super) fn submission(suffix: &str) -> SubmissionId {
    SubmissionId::new(format!("sub-{suffix}"))
}
