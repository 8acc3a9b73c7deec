use super::domain::StepKind;
use crate::requirements::{EmploymentRequirement, Requirements, SignatureMode};
use serde::Serialize;

pub const CATALOG_VERSION: &str = "2024.1";

pub const HIGHEST_LEVEL_FIELD: &str = "highest_level";
pub const HIGH_SCHOOL_LEVEL: &str = "high_school";
pub const EMPLOYER_NAME_FIELD: &str = "employer_name";

const EDUCATION_LEVELS: &[&str] = &[
    HIGH_SCHOOL_LEVEL,
    "associate",
    "bachelor",
    "master",
    "doctorate",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Date,
    Boolean,
    Select(&'static [&'static str]),
    Number,
}

/// Named patterns so rules stay comparable and compile once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Email,
    Phone,
    PostalCode,
    LicenseNumber,
    RegionCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    MinLength(usize),
    MaxLength(usize),
    Pattern(PatternKind),
    Range { min: f64, max: f64 },
    MustBeTrue,
    NotInFuture,
    NotInPast,
}

/// Requirement switch that decides whether a field is part of the resolved step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCondition {
    Always,
    Email,
    Phone,
    FullName,
    Alias,
    Signature(SignatureMode),
}

impl FieldCondition {
    fn holds(self, requirements: &Requirements) -> bool {
        let modes = requirements.personal_info.modes;
        match self {
            FieldCondition::Always => true,
            FieldCondition::Email => modes.email,
            FieldCondition::Phone => modes.phone,
            FieldCondition::FullName => modes.full_name,
            FieldCondition::Alias => modes.alias,
            FieldCondition::Signature(mode) => requirements.signature.mode == mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: Vec<ValidationRule>,
    #[serde(skip)]
    pub condition: FieldCondition,
}

impl FieldSpec {
    fn required(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            required: true,
            rules: Vec::new(),
            condition: FieldCondition::Always,
        }
    }

    fn optional(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(id, label, kind)
        }
    }

    fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn when(mut self, condition: FieldCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// How an accumulator step's entries are checked for coverage and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageRule {
    pub required_years: u32,
    pub required_entries: u32,
}

/// Step-specific completion requirement beyond the entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    Entries,
    /// Entries count once per distinct value of `key_field`.
    DistinctEntries { key_field: &'static str },
    /// Entries are waived when `level_field` holds `exempt_level`.
    EducationLevel {
        level_field: &'static str,
        exempt_level: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleStepConfig {
    pub kind: StepKind,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulatorStepConfig {
    pub kind: StepKind,
    pub step_fields: Vec<FieldSpec>,
    pub entry_fields: Vec<FieldSpec>,
    pub coverage: CoverageRule,
    pub completion: CompletionRule,
}

/// Step configuration with every requirement-dependent value filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedStepConfig {
    Simple(SimpleStepConfig),
    Accumulator(AccumulatorStepConfig),
}

impl ResolvedStepConfig {
    pub fn kind(&self) -> StepKind {
        match self {
            ResolvedStepConfig::Simple(config) => config.kind,
            ResolvedStepConfig::Accumulator(config) => config.kind,
        }
    }

    pub fn as_accumulator(&self) -> Option<&AccumulatorStepConfig> {
        match self {
            ResolvedStepConfig::Accumulator(config) => Some(config),
            ResolvedStepConfig::Simple(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccumulatorTemplate {
    pub entry_fields: Vec<FieldSpec>,
    pub required_entries: u32,
    pub required_years: Option<u32>,
    pub completion: CompletionRule,
}

#[derive(Debug, Clone)]
pub struct StepTemplate {
    pub kind: StepKind,
    pub fields: Vec<FieldSpec>,
    pub accumulator: Option<AccumulatorTemplate>,
}

/// Fixed, ordered table of every step the wizard can show.
#[derive(Debug)]
pub struct StepCatalog {
    steps: Vec<StepTemplate>,
}

impl StepCatalog {
    pub fn standard() -> Self {
        Self {
            steps: standard_step_templates(),
        }
    }

    pub fn version(&self) -> &'static str {
        CATALOG_VERSION
    }

    pub fn templates(&self) -> &[StepTemplate] {
        &self.steps
    }

    pub fn template(&self, kind: StepKind) -> Option<&StepTemplate> {
        self.steps.iter().find(|template| template.kind == kind)
    }

    /// Catalog steps switched on by `requirements`, in catalog order.
    pub fn enabled_steps(&self, requirements: &Requirements) -> Vec<StepKind> {
        self.steps
            .iter()
            .map(|template| template.kind)
            .filter(|kind| kind.is_enabled(requirements))
            .collect()
    }

    /// Apply the decoded requirements to a step template.
    pub fn resolve(&self, kind: StepKind, requirements: &Requirements) -> ResolvedStepConfig {
        let template = match self.template(kind) {
            Some(template) => template,
            None => {
                return ResolvedStepConfig::Simple(SimpleStepConfig {
                    kind,
                    fields: Vec::new(),
                })
            }
        };

        let fields: Vec<FieldSpec> = template
            .fields
            .iter()
            .filter(|field| field.condition.holds(requirements))
            .cloned()
            .collect();

        let Some(accumulator) = &template.accumulator else {
            return ResolvedStepConfig::Simple(SimpleStepConfig { kind, fields });
        };

        let coverage = match kind {
            StepKind::ResidenceHistory => CoverageRule {
                required_years: requirements.residence_history.required_years(),
                required_entries: accumulator.required_entries,
            },
            StepKind::EmploymentHistory => match requirements.employment_history {
                EmploymentRequirement::Employers(count) => CoverageRule {
                    required_years: 0,
                    required_entries: u32::from(count),
                },
                other => CoverageRule {
                    required_years: other.required_years(),
                    required_entries: accumulator.required_entries,
                },
            },
            _ => CoverageRule {
                required_years: accumulator.required_years.unwrap_or(0),
                required_entries: accumulator.required_entries,
            },
        };

        ResolvedStepConfig::Accumulator(AccumulatorStepConfig {
            kind,
            step_fields: fields,
            entry_fields: accumulator.entry_fields.clone(),
            coverage,
            completion: accumulator.completion,
        })
    }
}

fn address_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("street", "Street address", FieldKind::Text)
            .rule(ValidationRule::MaxLength(200)),
        FieldSpec::required("city", "City", FieldKind::Text).rule(ValidationRule::MaxLength(100)),
        FieldSpec::required("region", "State or region", FieldKind::Text)
            .rule(ValidationRule::Pattern(PatternKind::RegionCode)),
        FieldSpec::required("postal_code", "Postal code", FieldKind::Text)
            .rule(ValidationRule::Pattern(PatternKind::PostalCode)),
        FieldSpec::optional("country", "Country", FieldKind::Text)
            .rule(ValidationRule::MaxLength(60)),
    ]
}

fn consent_fields() -> Vec<FieldSpec> {
    vec![FieldSpec::required("accepted", "Consent", FieldKind::Boolean)
        .rule(ValidationRule::MustBeTrue)]
}

fn standard_step_templates() -> Vec<StepTemplate> {
    vec![
        StepTemplate {
            kind: StepKind::PersonalInfo,
            fields: vec![
                FieldSpec::required("email", "Email address", FieldKind::Email)
                    .rule(ValidationRule::MaxLength(254))
                    .when(FieldCondition::Email),
                FieldSpec::required("phone", "Phone number", FieldKind::Phone)
                    .when(FieldCondition::Phone),
                FieldSpec::required("first_name", "First name", FieldKind::Text)
                    .rule(ValidationRule::MaxLength(100))
                    .when(FieldCondition::FullName),
                FieldSpec::optional("middle_name", "Middle name", FieldKind::Text)
                    .rule(ValidationRule::MaxLength(100))
                    .when(FieldCondition::FullName),
                FieldSpec::required("last_name", "Last name", FieldKind::Text)
                    .rule(ValidationRule::MaxLength(100))
                    .when(FieldCondition::FullName),
                FieldSpec::optional("date_of_birth", "Date of birth", FieldKind::Date)
                    .rule(ValidationRule::NotInFuture)
                    .when(FieldCondition::FullName),
                FieldSpec::optional("other_names", "Other names used", FieldKind::Text)
                    .rule(ValidationRule::MaxLength(500))
                    .when(FieldCondition::Alias),
            ],
            accumulator: None,
        },
        StepTemplate {
            kind: StepKind::ResidenceHistory,
            fields: Vec::new(),
            accumulator: Some(AccumulatorTemplate {
                entry_fields: address_fields(),
                required_entries: 1,
                required_years: None,
                completion: CompletionRule::Entries,
            }),
        },
        StepTemplate {
            kind: StepKind::EmploymentHistory,
            fields: Vec::new(),
            accumulator: Some(AccumulatorTemplate {
                entry_fields: vec![
                    FieldSpec::required(EMPLOYER_NAME_FIELD, "Employer", FieldKind::Text)
                        .rule(ValidationRule::MaxLength(200)),
                    FieldSpec::required("position", "Position", FieldKind::Text)
                        .rule(ValidationRule::MaxLength(120)),
                    FieldSpec::optional("employer_phone", "Employer phone", FieldKind::Phone),
                    FieldSpec::optional("city", "City", FieldKind::Text)
                        .rule(ValidationRule::MaxLength(100)),
                ],
                required_entries: 1,
                required_years: None,
                completion: CompletionRule::DistinctEntries {
                    key_field: EMPLOYER_NAME_FIELD,
                },
            }),
        },
        StepTemplate {
            kind: StepKind::Education,
            fields: vec![FieldSpec::required(
                HIGHEST_LEVEL_FIELD,
                "Highest level completed",
                FieldKind::Select(EDUCATION_LEVELS),
            )],
            accumulator: Some(AccumulatorTemplate {
                entry_fields: vec![
                    FieldSpec::required("institution", "Institution", FieldKind::Text)
                        .rule(ValidationRule::MaxLength(200)),
                    FieldSpec::optional("degree", "Degree", FieldKind::Text)
                        .rule(ValidationRule::MaxLength(120)),
                ],
                required_entries: 1,
                required_years: None,
                completion: CompletionRule::EducationLevel {
                    level_field: HIGHEST_LEVEL_FIELD,
                    exempt_level: HIGH_SCHOOL_LEVEL,
                },
            }),
        },
        StepTemplate {
            kind: StepKind::ProfessionalLicense,
            fields: vec![
                FieldSpec::required("license_type", "License type", FieldKind::Text)
                    .rule(ValidationRule::MaxLength(120)),
                FieldSpec::required("license_number", "License number", FieldKind::Text)
                    .rule(ValidationRule::Pattern(PatternKind::LicenseNumber)),
                FieldSpec::required("issuing_region", "Issuing state or region", FieldKind::Text)
                    .rule(ValidationRule::Pattern(PatternKind::RegionCode)),
                FieldSpec::required("expiration_date", "Expiration date", FieldKind::Date)
                    .rule(ValidationRule::NotInPast),
            ],
            accumulator: None,
        },
        StepTemplate {
            kind: StepKind::DriverLicenseConsent,
            fields: {
                let mut fields = consent_fields();
                fields.push(
                    FieldSpec::required("license_number", "Driver license number", FieldKind::Text)
                        .rule(ValidationRule::Pattern(PatternKind::LicenseNumber)),
                );
                fields.push(
                    FieldSpec::required(
                        "issuing_region",
                        "Issuing state or region",
                        FieldKind::Text,
                    )
                    .rule(ValidationRule::Pattern(PatternKind::RegionCode)),
                );
                fields
            },
            accumulator: None,
        },
        StepTemplate {
            kind: StepKind::DrugTestConsent,
            fields: consent_fields(),
            accumulator: None,
        },
        StepTemplate {
            kind: StepKind::BiometricConsent,
            fields: consent_fields(),
            accumulator: None,
        },
        StepTemplate {
            kind: StepKind::Signature,
            fields: vec![
                FieldSpec::required(
                    "signature_confirmed",
                    "Signature confirmation",
                    FieldKind::Boolean,
                )
                .rule(ValidationRule::MustBeTrue)
                .when(FieldCondition::Signature(SignatureMode::Checkbox)),
                FieldSpec::required("signature_data", "Signature", FieldKind::Text)
                    .rule(ValidationRule::MinLength(16))
                    .when(FieldCondition::Signature(SignatureMode::Wet)),
                FieldSpec::required("typed_name", "Typed name", FieldKind::Text)
                    .rule(ValidationRule::MinLength(2))
                    .rule(ValidationRule::MaxLength(200))
                    .when(FieldCondition::Signature(SignatureMode::None)),
            ],
            accumulator: None,
        },
    ]
}
