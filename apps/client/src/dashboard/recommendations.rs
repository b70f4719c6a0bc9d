//! Recommendation model, score normalisation, visibility threshold, per-card
//! skill breakdown and the client-side filters.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dashboard::profile::split_list;
use crate::dom::Document;

/// Entries under this normalised score are hidden when anything clears it.
pub const MATCH_THRESHOLD: f64 = 40.0;
/// How many entries are shown when none clear the threshold.
pub const FALLBACK_COUNT: usize = 3;
const DEFAULT_CONFIDENCE: &str = "Intermediate";

/// Non-numeric scores read as absent.
fn de_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

/// A list of strings, or one comma-separated string.
fn de_skill_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(text) => split_list(&text),
        _ => Vec::new(),
    })
}

/// A list of strings, or a single line.
fn de_lines<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(line) if !line.trim().is_empty() => vec![line],
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub job_title: String,
    #[serde(default, deserialize_with = "de_score")]
    pub match_score: Option<f64>,
    #[serde(default, deserialize_with = "de_skill_list")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "de_skill_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "de_skill_list")]
    pub missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "de_lines")]
    pub explanation: Vec<String>,
    #[serde(default)]
    pub skill_confidence: BTreeMap<String, String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Scores at or below 1 are fractions.
pub fn normalize_score(raw: f64) -> f64 {
    if raw <= 1.0 {
        raw * 100.0
    } else {
        raw
    }
}

impl Recommendation {
    /// Normalised 0..=100 score; a missing score reads as 0.
    pub fn score(&self) -> f64 {
        self.match_score.map(normalize_score).unwrap_or(0.0)
    }

    pub fn display_score(&self) -> i64 {
        self.score().round() as i64
    }

    pub fn title(&self) -> &str {
        if self.job_title.trim().is_empty() {
            "Career Role"
        } else {
            &self.job_title
        }
    }

    /// Confidence for `skill`, defaulting to intermediate.
    pub fn confidence_for(&self, skill: &str) -> &str {
        self.skill_confidence
            .get(skill)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIDENCE)
    }
}

/// Entries scoring at least [`MATCH_THRESHOLD`]; if none do, the first
/// [`FALLBACK_COUNT`] entries in backend order.
pub fn select_visible(recommendations: &[Recommendation]) -> Vec<Recommendation> {
    let suitable: Vec<Recommendation> = recommendations
        .iter()
        .filter(|r| r.score() >= MATCH_THRESHOLD)
        .cloned()
        .collect();
    if suitable.is_empty() {
        recommendations.iter().take(FALLBACK_COUNT).cloned().collect()
    } else {
        suitable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillBreakdown {
    pub required: Vec<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl SkillBreakdown {
    /// Backend lists win when non-empty; otherwise required skills are
    /// compared to the user's skills, case-insensitively.
    pub fn for_recommendation(rec: &Recommendation, user_skills: &[String]) -> Self {
        let known: HashSet<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();
        let has = |skill: &String| known.contains(&skill.to_lowercase());

        let matched = if rec.matched_skills.is_empty() {
            rec.required_skills.iter().filter(|s| has(s)).cloned().collect()
        } else {
            rec.matched_skills.clone()
        };
        let missing = if rec.missing_skills.is_empty() {
            rec.required_skills.iter().filter(|s| !has(s)).cloned().collect()
        } else {
            rec.missing_skills.clone()
        };

        Self {
            required: rec.required_skills.clone(),
            matched,
            missing,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filters
// ────────────────────────────────────────────────────────────────────────────

pub const FILTER_EXPERIENCE: &str = "filterExperience";
pub const FILTER_WORK_TYPE: &str = "filterWorkType";
pub const FILTER_INDUSTRY: &str = "filterIndustry";
pub const FILTER_MATCH_SCORE: &str = "filterMatchScore";
pub const FILTER_LOCATION: &str = "filterLocation";

pub const FILTER_INPUTS: [&str; 5] = [
    FILTER_EXPERIENCE,
    FILTER_WORK_TYPE,
    FILTER_INDUSTRY,
    FILTER_MATCH_SCORE,
    FILTER_LOCATION,
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub experience: String,
    pub work_type: String,
    pub industry: String,
    pub match_score: f64,
    pub location: String,
}

fn equals_ignore_case(field: Option<&String>, wanted: &str) -> bool {
    field.is_some_and(|v| v.trim().to_lowercase() == wanted.to_lowercase())
}

impl FilterState {
    pub fn from_document(document: &dyn Document) -> Self {
        Self {
            experience: document.trimmed_value(FILTER_EXPERIENCE),
            work_type: document.trimmed_value(FILTER_WORK_TYPE),
            industry: document.trimmed_value(FILTER_INDUSTRY),
            match_score: document
                .trimmed_value(FILTER_MATCH_SCORE)
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite())
                .unwrap_or(0.0),
            location: document.trimmed_value(FILTER_LOCATION),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.experience.is_empty()
            || !self.work_type.is_empty()
            || !self.industry.is_empty()
            || self.match_score > 0.0
            || !self.location.is_empty()
    }

    pub fn matches(&self, rec: &Recommendation) -> bool {
        if !self.experience.is_empty()
            && !equals_ignore_case(rec.experience_level.as_ref(), &self.experience)
        {
            return false;
        }
        if !self.work_type.is_empty() && !equals_ignore_case(rec.work_type.as_ref(), &self.work_type)
        {
            return false;
        }
        if !self.industry.is_empty() && !equals_ignore_case(rec.industry.as_ref(), &self.industry) {
            return false;
        }
        if self.match_score > 0.0 && rec.score() < self.match_score {
            return false;
        }
        if !self.location.is_empty() {
            let wanted = self.location.to_lowercase();
            let found = rec
                .location
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(&wanted));
            if !found {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, recommendations: &[Recommendation]) -> Vec<Recommendation> {
        recommendations
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
