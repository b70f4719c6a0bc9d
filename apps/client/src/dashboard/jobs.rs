//! Live job listings fetched for the current profile.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::dashboard::profile::ProfilePayload;

pub const LIVE_JOBS_PATH: &str = "/api/jobs";
pub const LIVE_JOB_RESULTS: u32 = 6;
pub const FALLBACK_QUERY: &str = "software developer";

/// Skills that tend to appear verbatim in listings. A user skill containing
/// one of these is preferred when building the search query.
pub const HIGH_VALUE_SKILLS: [&str; 20] = [
    "python",
    "java",
    "javascript",
    "react",
    "node",
    "aws",
    "docker",
    "kubernetes",
    "machine learning",
    "ai",
    "data science",
    "sql",
    "angular",
    "vue",
    "typescript",
    "go",
    "rust",
    "c++",
    "c#",
    ".net",
];

fn is_high_value(skill: &str) -> bool {
    let skill = skill.to_lowercase();
    HIGH_VALUE_SKILLS.iter().any(|hv| skill.contains(hv))
}

/// Builds the search phrase: the top skill with the first interest, else up
/// to two skills, else up to two interests, else a generic query.
pub fn build_live_query(profile: &ProfilePayload, skills: &[String]) -> String {
    let priority: Vec<&String> = skills.iter().filter(|s| is_high_value(s)).collect();
    let chosen: Vec<&String> = if priority.len() >= 2 {
        priority.into_iter().take(3).collect()
    } else {
        skills.iter().take(3).collect()
    };
    let interests = &profile.interests;

    if let (Some(skill), Some(interest)) = (chosen.first(), interests.first()) {
        return format!("{skill} {interest}");
    }
    if !chosen.is_empty() {
        return chosen
            .iter()
            .take(2)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
    }
    if !interests.is_empty() {
        return interests
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
    }
    FALLBACK_QUERY.to_string()
}

fn de_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveJob {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub salary_min: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
}

impl LiveJob {
    pub fn title(&self) -> &str {
        or_default(&self.job_title, "Job Role")
    }

    pub fn company_name(&self) -> &str {
        or_default(&self.company, "Company")
    }

    pub fn place(&self) -> &str {
        or_default(&self.location, "Location")
    }

    pub fn link(&self) -> &str {
        or_default(&self.redirect_url, "#")
    }

    pub fn salary_label(&self) -> String {
        let amount = |v: Option<f64>| v.filter(|a| *a != 0.0).map(|a| a.to_string());
        match (amount(self.salary_min), amount(self.salary_max)) {
            (None, None) => "Salary not listed".to_string(),
            (min, max) => format!(
                "${} - ${}",
                min.unwrap_or_default(),
                max.unwrap_or_default()
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub live_jobs: Vec<LiveJob>,
    #[serde(default)]
    pub jobs: Vec<LiveJob>,
}

impl JobsResponse {
    /// `live_jobs` when non-empty, else `jobs`.
    pub fn into_jobs(self) -> Vec<LiveJob> {
        if self.live_jobs.is_empty() {
            self.jobs
        } else {
            self.live_jobs
        }
    }
}
