use crate::requirements::{ConsentKind, Requirements};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::navigation::TransitionError;

/// Opaque field map collected for one step.
pub type StepValues = Map<String, Value>;

/// Field or category key mapped to a display message.
pub type FieldErrors = BTreeMap<String, String>;

/// Snapshot of every step's state for one submission.
pub type StepStates = BTreeMap<StepKind, StepState>;

/// Every wizard step, declared in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    PersonalInfo,
    ResidenceHistory,
    EmploymentHistory,
    Education,
    ProfessionalLicense,
    DriverLicenseConsent,
    DrugTestConsent,
    BiometricConsent,
    Signature,
}

impl StepKind {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::PersonalInfo,
            Self::ResidenceHistory,
            Self::EmploymentHistory,
            Self::Education,
            Self::ProfessionalLicense,
            Self::DriverLicenseConsent,
            Self::DrugTestConsent,
            Self::BiometricConsent,
            Self::Signature,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::PersonalInfo => "personal_info",
            Self::ResidenceHistory => "residence_history",
            Self::EmploymentHistory => "employment_history",
            Self::Education => "education",
            Self::ProfessionalLicense => "professional_license",
            Self::DriverLicenseConsent => "driver_license_consent",
            Self::DrugTestConsent => "drug_test_consent",
            Self::BiometricConsent => "biometric_consent",
            Self::Signature => "signature",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Information",
            Self::ResidenceHistory => "Residence History",
            Self::EmploymentHistory => "Employment History",
            Self::Education => "Education",
            Self::ProfessionalLicense => "Professional License",
            Self::DriverLicenseConsent => "Driver License Consent",
            Self::DrugTestConsent => "Drug Test Consent",
            Self::BiometricConsent => "Biometric Consent",
            Self::Signature => "Signature",
        }
    }

    pub const fn is_accumulator(self) -> bool {
        matches!(
            self,
            Self::ResidenceHistory | Self::EmploymentHistory | Self::Education
        )
    }

    /// Whether the decoded requirements switch this step on.
    pub fn is_enabled(self, requirements: &Requirements) -> bool {
        match self {
            Self::PersonalInfo => requirements.personal_info.enabled,
            Self::ResidenceHistory => requirements.residence_history.is_enabled(),
            Self::EmploymentHistory => requirements.employment_history.is_enabled(),
            Self::Education => requirements.education,
            Self::ProfessionalLicense => requirements.professional_license,
            Self::DriverLicenseConsent => requirements.requires_consent(ConsentKind::DriverLicense),
            Self::DrugTestConsent => requirements.requires_consent(ConsentKind::DrugTest),
            Self::BiometricConsent => requirements.requires_consent(ConsentKind::Biometric),
            Self::Signature => requirements.signature.required,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StepKind {
    type Err = TransitionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.id() == trimmed)
            .ok_or_else(|| TransitionError::UnknownStep(trimmed.to_string()))
    }
}

/// Per-step record owned by the caller and replaced on every update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepState {
    pub values: StepValues,
    pub errors: FieldErrors,
    pub is_valid: bool,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_years: Option<f64>,
}

impl StepState {
    pub fn is_passable(&self) -> bool {
        self.is_valid && self.is_complete
    }
}

/// Derived view of where a submission stands in the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    pub available_steps: Vec<StepKind>,
    pub current_step: StepKind,
    pub next_step: Option<StepKind>,
    pub previous_step: Option<StepKind>,
    pub completed_steps: Vec<StepKind>,
    pub can_move_next: bool,
    pub can_move_previous: bool,
    pub progress_percentage: u8,
    pub is_form_complete: bool,
}
