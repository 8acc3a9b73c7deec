use super::{
    ConsentKind, EmployerCount, EmploymentRequirement, HistoryYears, PersonalInfoModes,
    PersonalInfoRequirement, Requirements, ResidenceRequirement, SignatureMode,
    SignatureRequirement,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

const SEGMENT_COUNT: usize = 8;

/// Positional facet of a requirements key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Language,
    PersonalInfo,
    Consent,
    Residence,
    Employment,
    Education,
    License,
    Signature,
}

impl Facet {
    pub const fn ordered() -> [Self; SEGMENT_COUNT] {
        [
            Self::Language,
            Self::PersonalInfo,
            Self::Consent,
            Self::Residence,
            Self::Employment,
            Self::Education,
            Self::License,
            Self::Signature,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::PersonalInfo => "personal info",
            Self::Consent => "consent",
            Self::Residence => "residence history",
            Self::Employment => "employment history",
            Self::Education => "education",
            Self::License => "professional license",
            Self::Signature => "signature",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a requirements key could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("requirements key must have {expected} hyphen-separated segments, found {found}")]
    FacetCount { expected: usize, found: usize },
    #[error("{facet} segment is empty")]
    EmptyFacet { facet: Facet },
    #[error("{facet} segment '{code}' is invalid: {reason}")]
    InvalidFacet {
        facet: Facet,
        code: String,
        reason: &'static str,
    },
}

impl DecodeError {
    /// Facet the failure is attributed to; `None` when the key shape itself is wrong.
    pub fn facet(&self) -> Option<Facet> {
        match self {
            DecodeError::FacetCount { .. } => None,
            DecodeError::EmptyFacet { facet } | DecodeError::InvalidFacet { facet, .. } => {
                Some(*facet)
            }
        }
    }
}

/// Decode a requirements key such as `en-EPA-DTB-R3-EN2-E-P-W`.
pub fn decode(key: &str) -> Result<Requirements, DecodeError> {
    let segments: Vec<&str> = key.trim().split('-').collect();
    if segments.len() != SEGMENT_COUNT {
        debug!(found = segments.len(), "rejected requirements key with wrong shape");
        return Err(DecodeError::FacetCount {
            expected: SEGMENT_COUNT,
            found: segments.len(),
        });
    }

    for (facet, segment) in Facet::ordered().into_iter().zip(&segments) {
        if segment.trim().is_empty() {
            return Err(DecodeError::EmptyFacet { facet });
        }
    }

    let requirements = Requirements {
        language: decode_language(segments[0])?,
        personal_info: decode_personal_info(segments[1])?,
        consents: decode_consents(segments[2])?,
        residence_history: decode_residence(segments[3])?,
        employment_history: decode_employment(segments[4])?,
        education: decode_flag(segments[5], 'E', Facet::Education)?,
        professional_license: decode_flag(segments[6], 'P', Facet::License)?,
        signature: decode_signature(segments[7]),
    };

    debug!(key = %requirements, "decoded requirements key");
    Ok(requirements)
}

fn invalid(facet: Facet, code: &str, reason: &'static str) -> DecodeError {
    DecodeError::InvalidFacet {
        facet,
        code: code.to_string(),
        reason,
    }
}

fn decode_language(code: &str) -> Result<String, DecodeError> {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(invalid(
            Facet::Language,
            code,
            "expected a two letter language code",
        ));
    }
    Ok(code.to_ascii_lowercase())
}

fn decode_personal_info(code: &str) -> Result<PersonalInfoRequirement, DecodeError> {
    let code = code.trim();
    if code == "N" {
        return Ok(PersonalInfoRequirement::disabled());
    }
    if !code.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(invalid(
            Facet::PersonalInfo,
            code,
            "expected uppercase mode letters",
        ));
    }

    let mut modes = PersonalInfoModes {
        email: code.contains('E'),
        phone: code.contains('P'),
        full_name: code.contains('M'),
        alias: code.contains('A'),
    };
    if !modes.any() {
        debug!(code, "no personal info mode recognized, defaulting to phone");
        modes.phone = true;
    }

    Ok(PersonalInfoRequirement {
        enabled: true,
        modes,
    })
}

fn decode_consents(code: &str) -> Result<BTreeSet<ConsentKind>, DecodeError> {
    let code = code.trim();
    if code == "N" {
        return Ok(BTreeSet::new());
    }

    code.chars()
        .map(|letter| {
            ConsentKind::from_letter(letter).ok_or_else(|| {
                invalid(
                    Facet::Consent,
                    code,
                    "consent letters must be drawn from D, T, and B",
                )
            })
        })
        .collect()
}

fn decode_residence(code: &str) -> Result<ResidenceRequirement, DecodeError> {
    let code = code.trim();
    if code == "N" {
        return Ok(ResidenceRequirement::Disabled);
    }

    let years = code
        .strip_prefix('R')
        .and_then(single_char)
        .and_then(HistoryYears::from_digit)
        .ok_or_else(|| invalid(Facet::Residence, code, "expected N, R1, R3, or R5"))?;
    Ok(ResidenceRequirement::Years(years))
}

fn decode_employment(code: &str) -> Result<EmploymentRequirement, DecodeError> {
    let code = code.trim();
    if code == "N" {
        return Ok(EmploymentRequirement::Disabled);
    }

    if let Some(count) = code.strip_prefix("EN") {
        let employers = single_char(count)
            .and_then(|digit| digit.to_digit(10))
            .and_then(|digit| u8::try_from(digit).ok())
            .and_then(EmployerCount::new);
        return match employers {
            Some(employers) => Ok(EmploymentRequirement::Employers(employers)),
            None => Err(invalid(
                Facet::Employment,
                code,
                "employer count must be EN1, EN2, or EN3",
            )),
        };
    }

    let years = code
        .strip_prefix('E')
        .and_then(single_char)
        .and_then(HistoryYears::from_digit)
        .ok_or_else(|| {
            invalid(
                Facet::Employment,
                code,
                "expected N, E1, E3, E5, EN1, EN2, or EN3",
            )
        })?;
    Ok(EmploymentRequirement::Years(years))
}

fn decode_flag(code: &str, enabled: char, facet: Facet) -> Result<bool, DecodeError> {
    match single_char(code.trim()) {
        Some('N') => Ok(false),
        Some(letter) if letter == enabled => Ok(true),
        _ => Err(invalid(facet, code, "expected a single enable letter or N")),
    }
}

fn decode_signature(code: &str) -> SignatureRequirement {
    let mode = match code.trim() {
        "N" => return SignatureRequirement::not_required(),
        "C" => SignatureMode::Checkbox,
        "W" => SignatureMode::Wet,
        _ => SignatureMode::None,
    };

    SignatureRequirement {
        required: true,
        mode,
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}
