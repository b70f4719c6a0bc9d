//! Market skill demand: how often a skill shows up in live job listings.

use std::collections::BTreeMap;

/// Shown in the skill-gap panel.
pub const GAP_PANEL_LIMIT: usize = 15;
/// Considered for the learning roadmap.
pub const ROADMAP_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandTier {
    High,
    Medium,
    Emerging,
}

impl DemandTier {
    pub fn for_frequency(frequency: u32) -> Self {
        if frequency >= 10 {
            DemandTier::High
        } else if frequency >= 6 {
            DemandTier::Medium
        } else {
            DemandTier::Emerging
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DemandTier::High => "High",
            DemandTier::Medium => "Medium",
            DemandTier::Emerging => "Emerging",
        }
    }

    /// Value of the `data-demand` attribute.
    pub fn attr(self) -> &'static str {
        match self {
            DemandTier::High => "high",
            DemandTier::Medium => "medium",
            DemandTier::Emerging => "low",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            DemandTier::High => "🔴",
            DemandTier::Medium => "🟡",
            DemandTier::Emerging => "🟢",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSkill {
    pub skill: String,
    pub frequency: u32,
    pub tier: DemandTier,
}

impl MarketSkill {
    pub fn job_count(&self) -> String {
        job_count_label(self.frequency)
    }
}

pub fn job_count_label(frequency: u32) -> String {
    if frequency > 100 {
        "100+".to_string()
    } else {
        frequency.to_string()
    }
}

/// Highest demand first; ties keep alphabetical order.
pub fn market_skills(map: &BTreeMap<String, u32>) -> Vec<MarketSkill> {
    let mut skills: Vec<MarketSkill> = map
        .iter()
        .map(|(skill, frequency)| MarketSkill {
            skill: skill.clone(),
            frequency: *frequency,
            tier: DemandTier::for_frequency(*frequency),
        })
        .collect();
    // BTreeMap iteration is already alphabetical; the sort is stable.
    skills.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    skills
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roadmap {
    /// In-demand skills the user already lists.
    pub strengthen: Vec<MarketSkill>,
    /// In-demand skills to learn, in priority order.
    pub learn: Vec<MarketSkill>,
}

impl Roadmap {
    pub fn is_empty(&self) -> bool {
        self.strengthen.is_empty() && self.learn.is_empty()
    }
}

/// Splits the top market skills by whether the user already has them. A
/// substring match in either direction counts.
pub fn build_roadmap(skills: &[MarketSkill], user_skills: &[String]) -> Roadmap {
    let known: Vec<String> = user_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut roadmap = Roadmap::default();
    for skill in skills.iter().take(ROADMAP_LIMIT) {
        let wanted = skill.skill.to_lowercase();
        let has = known
            .iter()
            .any(|k| k.contains(&wanted) || wanted.contains(k.as_str()));
        if has {
            roadmap.strengthen.push(skill.clone());
        } else {
            roadmap.learn.push(skill.clone());
        }
    }
    roadmap
}
