//! Decoded description of which wizard steps and sub-options a submission needs.
//!
//! A [`Requirements`] value is produced once per submission from the compact
//! requirements key (for example `en-EPA-DTB-R3-EN2-E-P-W`) and is never
//! mutated afterwards.

mod decoder;

pub use decoder::{decode, DecodeError, Facet};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RequirementsRecord")]
pub struct Requirements {
    pub language: String,
    pub personal_info: PersonalInfoRequirement,
    pub residence_history: ResidenceRequirement,
    pub employment_history: EmploymentRequirement,
    pub education: bool,
    pub professional_license: bool,
    pub consents: BTreeSet<ConsentKind>,
    pub signature: SignatureRequirement,
}

impl Requirements {
    /// Canonical key for this value; decoding the result yields an equal value.
    pub fn encode(&self) -> String {
        [
            self.language.clone(),
            self.personal_info.code(),
            consent_code(&self.consents),
            self.residence_history.code(),
            self.employment_history.code(),
            flag_code(self.education, 'E'),
            flag_code(self.professional_license, 'P'),
            self.signature.code().to_string(),
        ]
        .join("-")
    }

    pub fn requires_consent(&self, kind: ConsentKind) -> bool {
        self.consents.contains(&kind)
    }
}

/// Wire shape of [`Requirements`] before it is checked against the key grammar.
#[derive(Deserialize)]
struct RequirementsRecord {
    language: String,
    personal_info: PersonalInfoRequirement,
    residence_history: ResidenceRequirement,
    employment_history: EmploymentRequirement,
    education: bool,
    professional_license: bool,
    consents: BTreeSet<ConsentKind>,
    signature: SignatureRequirement,
}

impl TryFrom<RequirementsRecord> for Requirements {
    type Error = String;

    /// Stored values must be exactly what decoding their own key produces.
    fn try_from(record: RequirementsRecord) -> Result<Self, Self::Error> {
        let candidate = Self {
            language: record.language,
            personal_info: record.personal_info,
            residence_history: record.residence_history,
            employment_history: record.employment_history,
            education: record.education,
            professional_license: record.professional_license,
            consents: record.consents,
            signature: record.signature,
        };
        let key = candidate.encode();
        match decode(&key) {
            Ok(decoded) if decoded == candidate => Ok(candidate),
            Ok(decoded) => Err(format!(
                "requirements are not in canonical form (key '{key}' decodes to {decoded:?})"
            )),
            Err(err) => Err(format!("requirements encode to an invalid key '{key}': {err}")),
        }
    }
}

impl FromStr for Requirements {
    type Err = DecodeError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        decode(key)
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalInfoModes {
    pub email: bool,
    pub phone: bool,
    pub full_name: bool,
    pub alias: bool,
}

impl PersonalInfoModes {
    pub fn any(&self) -> bool {
        self.email || self.phone || self.full_name || self.alias
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonalInfoRecord")]
pub struct PersonalInfoRequirement {
    pub enabled: bool,
    pub modes: PersonalInfoModes,
}

#[derive(Deserialize)]
struct PersonalInfoRecord {
    enabled: bool,
    #[serde(default)]
    modes: PersonalInfoModes,
}

impl TryFrom<PersonalInfoRecord> for PersonalInfoRequirement {
    type Error = &'static str;

    fn try_from(record: PersonalInfoRecord) -> Result<Self, Self::Error> {
        match (record.enabled, record.modes.any()) {
            (false, false) => Ok(Self::disabled()),
            (false, true) => Err("personal info modes are set but the step is disabled"),
            (true, false) => Err("personal info is enabled without any collection mode"),
            (true, true) => Ok(Self {
                enabled: true,
                modes: record.modes,
            }),
        }
    }
}

impl PersonalInfoRequirement {
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            modes: PersonalInfoModes {
                email: false,
                phone: false,
                full_name: false,
                alias: false,
            },
        }
    }

    fn code(&self) -> String {
        if !self.enabled {
            return "N".to_string();
        }

        let mut code = String::new();
        if self.modes.email {
            code.push('E');
        }
        if self.modes.phone {
            code.push('P');
        }
        if self.modes.full_name {
            code.push('M');
        }
        if self.modes.alias {
            code.push('A');
        }
        code
    }
}

/// Years of continuous history a timeline step may demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HistoryYears {
    One,
    Three,
    Five,
}

impl HistoryYears {
    pub const fn years(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Five => 5,
        }
    }

    pub(crate) fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(Self::One),
            '3' => Some(Self::Three),
            '5' => Some(Self::Five),
            _ => None,
        }
    }
}

impl From<HistoryYears> for u8 {
    fn from(value: HistoryYears) -> Self {
        value.years() as u8
    }
}

impl TryFrom<u8> for HistoryYears {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            other => Err(format!("history years must be 1, 3, or 5 (found {other})")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "required_years")]
pub enum ResidenceRequirement {
    Disabled,
    Years(HistoryYears),
}

impl ResidenceRequirement {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn required_years(&self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Years(years) => years.years(),
        }
    }

    fn code(&self) -> String {
        match self {
            Self::Disabled => "N".to_string(),
            Self::Years(years) => format!("R{}", years.years()),
        }
    }
}

/// Number of distinct employers an employer-count step asks for (1 to 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct EmployerCount(u8);

impl EmployerCount {
    pub const MAX: u8 = 3;

    pub const fn new(count: u8) -> Option<Self> {
        if count >= 1 && count <= Self::MAX {
            Some(Self(count))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<EmployerCount> for u8 {
    fn from(value: EmployerCount) -> Self {
        value.0
    }
}

impl From<EmployerCount> for u32 {
    fn from(value: EmployerCount) -> Self {
        u32::from(value.0)
    }
}

impl TryFrom<u8> for EmployerCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("employer count must be between 1 and 3 (found {value})"))
    }
}

impl fmt::Display for EmployerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employment history is either years-based or employer-count-based, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "required")]
pub enum EmploymentRequirement {
    Disabled,
    Years(HistoryYears),
    Employers(EmployerCount),
}

impl EmploymentRequirement {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn required_years(&self) -> u32 {
        match self {
            Self::Years(years) => years.years(),
            Self::Disabled | Self::Employers(_) => 0,
        }
    }

    pub fn required_employers(&self) -> u32 {
        match self {
            Self::Employers(count) => u32::from(*count),
            Self::Disabled | Self::Years(_) => 0,
        }
    }

    fn code(&self) -> String {
        match self {
            Self::Disabled => "N".to_string(),
            Self::Years(years) => format!("E{}", years.years()),
            Self::Employers(count) => format!("EN{count}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    DriverLicense,
    DrugTest,
    Biometric,
}

impl ConsentKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::DriverLicense, Self::DrugTest, Self::Biometric]
    }

    pub const fn letter(self) -> char {
        match self {
            Self::DriverLicense => 'D',
            Self::DrugTest => 'T',
            Self::Biometric => 'B',
        }
    }

    pub(crate) fn from_letter(letter: char) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.letter() == letter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMode {
    None,
    Checkbox,
    Wet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureRecord")]
pub struct SignatureRequirement {
    pub required: bool,
    pub mode: SignatureMode,
}

impl SignatureRequirement {
    pub const fn not_required() -> Self {
        Self {
            required: false,
            mode: SignatureMode::None,
        }
    }

    fn code(&self) -> &'static str {
        match (self.required, self.mode) {
            (false, _) => "N",
            (true, SignatureMode::Checkbox) => "C",
            (true, SignatureMode::Wet) => "W",
            (true, SignatureMode::None) => "S",
        }
    }
}

#[derive(Deserialize)]
struct SignatureRecord {
    required: bool,
    mode: SignatureMode,
}

impl TryFrom<SignatureRecord> for SignatureRequirement {
    type Error = &'static str;

    fn try_from(record: SignatureRecord) -> Result<Self, Self::Error> {
        match (record.required, record.mode) {
            (false, SignatureMode::None) => Ok(Self::not_required()),
            (false, _) => Err("signature mode is set but no signature is required"),
            (true, mode) => Ok(Self {
                required: true,
                mode,
            }),
        }
    }
}

fn consent_code(consents: &BTreeSet<ConsentKind>) -> String {
    if consents.is_empty() {
        return "N".to_string();
    }
    consents.iter().map(|kind| kind.letter()).collect()
}

fn flag_code(enabled: bool, letter: char) -> String {
    if enabled {
        letter.to_string()
    } else {
        "N".to_string()
    }
}
