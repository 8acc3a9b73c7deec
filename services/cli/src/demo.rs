use crate::infra::{parse_date, wizard_config};
use chrono::{Months, NaiveDate};
use clap::Args;
use intake_wizard::config::AppConfig;
use intake_wizard::error::AppError;
use intake_wizard::requirements::{decode, EmploymentRequirement, Requirements, SignatureMode};
use intake_wizard::wizard::{
    IntakeWizardService, InMemoryStepStateStore, StepKind, StepState, StepValues, SubmissionId,
};
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_KEY: &str = "en-EPM-DTB-R3-EN2-E-P-C";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Requirements key driving which steps appear
    #[arg(long, default_value = DEFAULT_KEY)]
    pub(crate) key: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to INTAKE_REFERENCE_DATE or today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print each step's stored values after it is submitted
    #[arg(long)]
    pub(crate) show_values: bool,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs {
        key,
        today,
        show_values,
    } = args;

    let requirements = decode(&key)?;
    let config = wizard_config(config, today);
    let today = config.today();
    let service = IntakeWizardService::new(Arc::new(InMemoryStepStateStore::default()), config);
    let submission = SubmissionId::new("demo-submission");

    println!("Intake wizard demo");
    println!("Requirements key: {} (evaluated {})", requirements, today);

    let mut current = service.resume_step(&submission, &requirements)?;
    let navigation = service.navigation(&submission, &requirements, current)?;
    println!("\nEnabled steps");
    for step in &navigation.available_steps {
        println!("- {}", step.label());
    }

    println!("\nWalkthrough");
    loop {
        let state = service.update_step(
            &submission,
            &requirements,
            current,
            sample_values(current, &requirements, today),
        )?;
        let navigation = service.navigation(&submission, &requirements, current)?;
        render_step(current, &state, navigation.progress_percentage, show_values);

        if !navigation.can_move_next {
            break;
        }
        current = service.move_next(&submission, &requirements, current)?;
    }

    let complete = service.is_form_complete(&submission, &requirements)?;
    println!(
        "\nForm {}",
        if complete {
            "complete: ready to submit"
        } else {
            "incomplete: resolve the errors above"
        }
    );
    service.discard(&submission)?;
    Ok(())
}

fn render_step(step: StepKind, state: &StepState, progress: u8, show_values: bool) {
    let status = if state.is_passable() {
        "complete"
    } else if state.is_valid {
        "valid, incomplete"
    } else {
        "invalid"
    };
    match state.total_years {
        Some(years) => println!(
            "- {}: {} ({:.2} years covered), progress {}%",
            step.label(),
            status,
            years,
            progress
        ),
        None => println!("- {}: {}, progress {}%", step.label(), status, progress),
    }

    for (field, message) in &state.errors {
        println!("    {field}: {message}");
    }
    if show_values {
        for (field, value) in &state.values {
            println!("    {field} = {value}");
        }
    }
}

fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn sample_values(step: StepKind, requirements: &Requirements, today: NaiveDate) -> StepValues {
    let value = match step {
        StepKind::PersonalInfo => personal_info(requirements),
        StepKind::ResidenceHistory => {
            let start = years_before(today, requirements.residence_history.required_years() + 1);
            json!({
                "entries": [{
                    "street": "400 Locust St",
                    "city": "Des Moines",
                    "region": "IA",
                    "postal_code": "50309",
                    "start_date": start.to_string(),
                    "is_current": true,
                }]
            })
        }
        StepKind::EmploymentHistory => employment(requirements, today),
        StepKind::Education => json!({
            "highest_level": "bachelor",
            "entries": [{
                "institution": "Iowa State University",
                "degree": "B.S. Supply Chain Management",
                "start_date": "2006-08-21",
                "end_date": "2010-05-08",
            }]
        }),
        StepKind::ProfessionalLicense => json!({
            "license_type": "Commercial Driver License",
            "license_number": "CDL-4471920",
            "issuing_region": "IA",
            "expiration_date": today
                .checked_add_months(Months::new(24))
                .unwrap_or(today)
                .to_string(),
        }),
        StepKind::DriverLicenseConsent => json!({
            "accepted": true,
            "license_number": "D123-4567",
            "issuing_region": "IA",
        }),
        StepKind::DrugTestConsent | StepKind::BiometricConsent => json!({ "accepted": true }),
        StepKind::Signature => match requirements.signature.mode {
            SignatureMode::Checkbox => json!({ "signature_confirmed": true }),
            SignatureMode::Wet => json!({ "signature_data": "data:image/png;base64,iVBORw0KGgo" }),
            SignatureMode::None => json!({ "typed_name": "Jordan Lee" }),
        },
    };

    match value {
        Value::Object(map) => map,
        _ => StepValues::new(),
    }
}

fn personal_info(requirements: &Requirements) -> Value {
    let modes = requirements.personal_info.modes;
    let mut values = StepValues::new();
    if modes.email {
        values.insert("email".into(), json!("jordan.lee@example.com"));
    }
    if modes.phone {
        values.insert("phone".into(), json!("+1 515 555 0134"));
    }
    if modes.full_name {
        values.insert("first_name".into(), json!("Jordan"));
        values.insert("last_name".into(), json!("Lee"));
        values.insert("date_of_birth".into(), json!("1988-04-12"));
    }
    if modes.alias {
        values.insert("other_names".into(), json!("J. Lee"));
    }
    Value::Object(values)
}

fn employment(requirements: &Requirements, today: NaiveDate) -> Value {
    let employers = match requirements.employment_history {
        EmploymentRequirement::Employers(count) => u32::from(count),
        EmploymentRequirement::Years(_) | EmploymentRequirement::Disabled => 1,
    };
    let span = requirements.employment_history.required_years().max(employers) + 1;
    let per_employer = span.div_ceil(employers);

    let entries: Vec<Value> = (0..employers)
        .map(|index| {
            let start = years_before(today, span.min(per_employer * (index + 1)));
            let entry = json!({
                "employer_name": format!("Sample Employer {}", index + 1),
                "position": "Dispatcher",
                "start_date": start.to_string(),
            });
            with_end(entry, index, today, per_employer)
        })
        .collect();
    json!({ "entries": entries })
}

/// Most recent employer is current; older ones end where the next one starts.
fn with_end(mut entry: Value, index: u32, today: NaiveDate, per_employer: u32) -> Value {
    if let Value::Object(map) = &mut entry {
        if index == 0 {
            map.insert("is_current".into(), json!(true));
        } else {
            let end = years_before(today, per_employer * index);
            map.insert("end_date".into(), json!(end.to_string()));
        }
    }
    entry
}
