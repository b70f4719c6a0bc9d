//! The canonical profile payload and the two ways of building one: from a
//! parsed resume or from the manual profile form.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degrees: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub years: f64,
}

/// Body of `POST /analyze_profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub education: Education,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Raw resume text, when the profile came from an upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
}

impl ProfilePayload {
    pub fn years_experience(&self) -> f64 {
        self.experience.first().map(|e| e.years).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.interests.is_empty()
            && self.education.degrees.is_empty()
            && self.years_experience() == 0.0
    }
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_years(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(years) if years.is_finite() && years > 0.0 => years,
        _ => 0.0,
    }
}

fn experience_for(years: f64) -> Vec<ExperienceEntry> {
    if years > 0.0 {
        vec![ExperienceEntry { years }]
    } else {
        Vec::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Manual profile form
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualProfileInput {
    pub education_level: String,
    pub years_experience: String,
    pub skills: String,
    pub interests: String,
}

pub const EMPTY_MANUAL_PROFILE: &str =
    "Add at least one skill, education level, or interest to continue.";

/// Returns `None` when the form carries nothing worth analysing.
pub fn build_manual_profile(input: &ManualProfileInput) -> Option<ProfilePayload> {
    let education = input.education_level.trim();
    let profile = ProfilePayload {
        skills: split_list(&input.skills),
        interests: split_list(&input.interests),
        education: Education {
            degrees: if education.is_empty() {
                Vec::new()
            } else {
                vec![education.to_string()]
            },
        },
        experience: experience_for(parse_years(&input.years_experience)),
        resume_text: None,
    };

    if profile.is_empty() {
        None
    } else {
        Some(profile)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume upload response
// ────────────────────────────────────────────────────────────────────────────

/// Reads a field whatever shape it arrives in. A field that does not fit
/// reads as absent instead of failing the whole body.
fn de_lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value::<Option<T>>(value).ok().flatten())
}

/// Strings from a list (non-strings skipped) or a comma-separated string.
fn strings_in(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => split_list(text),
        _ => Vec::new(),
    }
}

fn number_in(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillSet {
    List(Vec<String>),
    Grouped {
        technical_skills: Vec<String>,
        soft_skills: Vec<String>,
    },
}

impl<'de> Deserialize<'de> for SkillSet {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => SkillSet::Grouped {
                technical_skills: strings_in(map.get("technical_skills")),
                soft_skills: strings_in(map.get("soft_skills")),
            },
            other => SkillSet::List(strings_in(Some(&other))),
        })
    }
}

impl SkillSet {
    fn collect_into(&self, out: &mut Vec<String>) {
        match self {
            SkillSet::List(skills) => out.extend(skills.iter().cloned()),
            SkillSet::Grouped {
                technical_skills,
                soft_skills,
            } => {
                out.extend(technical_skills.iter().cloned());
                out.extend(soft_skills.iter().cloned());
            }
        }
    }
}

/// `{"degree": .., "degrees": [..]}`, or a bare degree string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationBlock {
    pub degree: Option<String>,
    pub degrees: Vec<String>,
}

impl<'de> Deserialize<'de> for EducationBlock {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => EducationBlock {
                degree: map
                    .get("degree")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                degrees: strings_in(map.get("degrees")),
            },
            Value::String(degree) => EducationBlock {
                degree: Some(degree),
                degrees: Vec::new(),
            },
            _ => EducationBlock::default(),
        })
    }
}

/// One experience entry. Numbers may arrive as numeric strings; a bare
/// number counts as `years`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceBlock {
    pub total_years: Option<f64>,
    pub years: Option<f64>,
}

impl<'de> Deserialize<'de> for ExperienceBlock {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => ExperienceBlock {
                total_years: number_in(map.get("total_years")),
                years: number_in(map.get("years")),
            },
            other => ExperienceBlock {
                total_years: None,
                years: number_in(Some(&other)),
            },
        })
    }
}

impl ExperienceBlock {
    fn years(&self) -> f64 {
        [self.total_years, self.years]
            .into_iter()
            .flatten()
            .find(|y| *y != 0.0)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interests(Vec<String>);

impl<'de> Deserialize<'de> for Interests {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(Interests(strings_in(Some(&value))))
    }
}

impl Interests {
    fn to_list(&self) -> Vec<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeSection {
    #[serde(default, deserialize_with = "de_lenient")]
    pub skills: Option<SkillSet>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub education: Option<EducationBlock>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub experience: Option<Vec<ExperienceBlock>>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub interests: Option<Interests>,
}

/// `POST /upload_resume` response. Either a ready `structured_profile` or a
/// loosely shaped extraction spread over several optional sections. Each
/// field is read on its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeUploadResponse {
    #[serde(default, deserialize_with = "de_lenient")]
    pub structured_profile: Option<ProfilePayload>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub skills: Option<SkillSet>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub education: Option<EducationBlock>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub experience: Option<Vec<ExperienceBlock>>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub interests: Option<Interests>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub resume_data: Option<ResumeSection>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub data: Option<ResumeSection>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub resume_text: Option<String>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub message: Option<String>,
}

impl ResumeUploadResponse {
    /// The backend's error message, when the body reports a failure.
    pub fn failure(&self) -> Option<String> {
        if let Some(error) = self.error.as_ref().filter(|e| !e.is_empty()) {
            return Some(error.clone());
        }
        if self.status.as_deref() == Some("error") {
            return Some(
                self.message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Upload failed.".to_string()),
            );
        }
        None
    }
}

fn first_years(entries: Option<&Vec<ExperienceBlock>>) -> Option<f64> {
    entries
        .and_then(|e| e.first())
        .map(ExperienceBlock::years)
        .filter(|y| *y != 0.0)
}

/// Normalises an upload response into a profile. Returns `None` when no
/// usable field was found.
pub fn build_profile_from_resume(response: &ResumeUploadResponse) -> Option<ProfilePayload> {
    if let Some(profile) = &response.structured_profile {
        return Some(profile.clone());
    }

    let resume = response.resume_data.as_ref();
    let data = response.data.as_ref();

    let mut skills = Vec::new();
    if let Some(set) = &response.skills {
        set.collect_into(&mut skills);
    }
    if let Some(set) = resume.and_then(|r| r.skills.as_ref()) {
        set.collect_into(&mut skills);
    }
    if let Some(SkillSet::List(list)) = data.and_then(|d| d.skills.as_ref()) {
        skills.extend(list.iter().cloned());
    }
    let skills = split_list(&skills.join(", "));

    let mut degrees = Vec::new();
    for block in [response.education.as_ref(), resume.and_then(|r| r.education.as_ref())]
        .into_iter()
        .flatten()
    {
        degrees.extend(block.degree.iter().cloned());
        degrees.extend(block.degrees.iter().cloned());
    }
    if let Some(degree) = data
        .and_then(|d| d.education.as_ref())
        .and_then(|e| e.degree.clone())
    {
        degrees.push(degree);
    }
    degrees.retain(|d| !d.trim().is_empty());

    let mut years = first_years(response.experience.as_ref()).unwrap_or(0.0);
    if let Some(override_years) = first_years(resume.and_then(|r| r.experience.as_ref())) {
        years = override_years;
    }

    let interests = [
        response.interests.as_ref(),
        data.and_then(|d| d.interests.as_ref()),
        resume.and_then(|r| r.interests.as_ref()),
    ]
    .into_iter()
    .flatten()
    .map(Interests::to_list)
    .find(|list| !list.is_empty())
    .unwrap_or_default();

    let profile = ProfilePayload {
        skills,
        interests,
        education: Education { degrees },
        experience: experience_for(years),
        resume_text: response.resume_text.clone(),
    };

    if profile.is_empty() {
        None
    } else {
        Some(profile)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Completion
// ────────────────────────────────────────────────────────────────────────────

/// Five equally weighted parts: resume text, skills, education, experience
/// and interests. Returns a percentage.
pub fn profile_completion(profile: &ProfilePayload) -> u8 {
    let parts = [
        profile
            .resume_text
            .as_ref()
            .is_some_and(|t| t.chars().count() > 10),
        !profile.skills.is_empty(),
        !profile.education.degrees.is_empty(),
        !profile.experience.is_empty(),
        !profile.interests.is_empty(),
    ];
    let done = parts.iter().filter(|p| **p).count() as u8;
    done * 20
}
