//! Markup for the dashboard panels. All backend text goes through askama's
//! HTML escaping.

use askama::Template;

use crate::dashboard::feedback::{FeedbackEntry, FeedbackRequest, FeedbackVerdict};
use crate::dashboard::jobs::LiveJob;
use crate::dashboard::market::{MarketSkill, Roadmap, GAP_PANEL_LIMIT};
use crate::dashboard::recommendations::{Recommendation, SkillBreakdown};
use crate::errors::ClientError;
use crate::shell::markup::render;

pub const EMPTY_GAP_TEXT: &str = "No gaps calculated yet.";
pub const EMPTY_ROADMAP_HTML: &str = "<li>Complete a profile to generate a learning roadmap.</li>";
const DEFAULT_REASON: &str = "Calculated using skill overlap.";

// ────────────────────────────────────────────────────────────────────────────
// Recommendation cards
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TagView {
    skill: String,
    confidence: String,
    color: &'static str,
}

fn confidence_color(confidence: &str) -> &'static str {
    match confidence {
        "Advanced" => "#28a745",
        "Intermediate" => "#ffc107",
        _ => "#6c757d",
    }
}

#[derive(Debug, Clone)]
struct CardView {
    title: String,
    score: i64,
    explain_id: String,
    matched_count: usize,
    required_count: usize,
    missing_count: usize,
    reason: String,
    headline_confidence: String,
    matched: Vec<TagView>,
    missing: Vec<String>,
    role: String,
    like_id: String,
    dislike_id: String,
}

#[derive(Template)]
#[template(
    source = r##"{% for card in cards %}<article class="recommendation-card">
    <div class="d-flex align-items-start justify-content-between">
        <div>
            <h4>{{ card.title }}</h4>
            <div class="match-score">Match score <span class="score-pill">{{ card.score }}%</span></div>
        </div>
        <i class="fas fa-briefcase text-primary"></i>
    </div>
    <div class="recommendation-explain">
        <button class="btn btn-sm btn-link p-0 text-primary" data-bs-toggle="collapse" href="#{{ card.explain_id }}" role="button" aria-expanded="false" aria-controls="{{ card.explain_id }}">
            <i class="fas fa-info-circle me-1"></i>View explanation
        </button>
        <div class="collapse mt-3" id="{{ card.explain_id }}">
            <div class="alert alert-info mb-0">
                <strong>Why {{ card.score }}%?</strong>
                <ul>
                    <li>{{ card.matched_count }}/{{ card.required_count }} required skills matched</li>
                    <li>{{ card.missing_count }} skills to prioritize learning</li>
                    <li>{{ card.reason }}</li>
                </ul>
            </div>
        </div>
    </div>
    <div class="mt-2">
        <div class="small text-muted">Matched skills{% if !card.headline_confidence.is_empty() %} <span class="confidence-summary">({{ card.headline_confidence }})</span>{% endif %}</div>
        <div class="tag-list">{% if card.matched.is_empty() %}<span class="empty-list">No matches yet</span>{% else %}{% for tag in card.matched %}<span class="tag-item matching" style="border-left: 3px solid {{ tag.color }}" title="{{ tag.confidence }} level">{{ tag.skill }} <small>[{{ tag.confidence }}]</small></span>{% endfor %}{% endif %}</div>
    </div>
    <div class="mt-2">
        <div class="small text-muted">Missing skills</div>
        <div class="tag-list">{% if card.missing.is_empty() %}<span class="empty-list">None identified</span>{% else %}{% for skill in card.missing %}<span class="tag-item missing">{{ skill }}</span>{% endfor %}{% endif %}</div>
    </div>
    <div class="recommendation-actions">
        <button class="btn btn-sm btn-outline-success" id="{{ card.like_id }}" data-feedback="like" data-role="{{ card.role }}">Relevant</button>
        <button class="btn btn-sm btn-outline-secondary" id="{{ card.dislike_id }}" data-feedback="dislike" data-role="{{ card.role }}">Not relevant</button>
    </div>
</article>
{% endfor %}"##,
    ext = "html"
)]
struct RecommendationCardsTemplate {
    cards: Vec<CardView>,
}

/// Rendered cards plus the feedback buttons they carry.
#[derive(Debug, Clone)]
pub struct RenderedCards {
    pub html: String,
    pub buttons: Vec<(String, FeedbackRequest)>,
}

/// `seq` keeps element ids unique across re-renders.
pub fn recommendation_cards(
    recommendations: &[Recommendation],
    user_skills: &[String],
    seq: u64,
) -> Result<RenderedCards, ClientError> {
    let mut buttons = Vec::with_capacity(recommendations.len() * 2);
    let cards = recommendations
        .iter()
        .enumerate()
        .map(|(index, rec)| {
            let breakdown = SkillBreakdown::for_recommendation(rec, user_skills);
            let like_id = format!("fb-{seq}-{index}-{}", FeedbackVerdict::Relevant.action());
            let dislike_id = format!("fb-{seq}-{index}-{}", FeedbackVerdict::NotRelevant.action());
            let role = if rec.job_title.trim().is_empty() {
                "Role".to_string()
            } else {
                rec.job_title.clone()
            };
            for (id, verdict) in [
                (&like_id, FeedbackVerdict::Relevant),
                (&dislike_id, FeedbackVerdict::NotRelevant),
            ] {
                buttons.push((
                    id.clone(),
                    FeedbackRequest {
                        role: role.clone(),
                        feedback: verdict,
                    },
                ));
            }

            CardView {
                title: rec.title().to_string(),
                score: rec.display_score(),
                explain_id: format!("explain-{seq}-{index}"),
                matched_count: breakdown.matched.len(),
                required_count: breakdown.required.len(),
                missing_count: breakdown.missing.len(),
                reason: rec
                    .explanation
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_REASON.to_string()),
                headline_confidence: rec
                    .skill_confidence
                    .values()
                    .next()
                    .cloned()
                    .unwrap_or_default(),
                matched: breakdown
                    .matched
                    .iter()
                    .map(|skill| {
                        let confidence = rec.confidence_for(skill).to_string();
                        TagView {
                            skill: skill.clone(),
                            color: confidence_color(&confidence),
                            confidence,
                        }
                    })
                    .collect(),
                missing: breakdown.missing,
                role,
                like_id,
                dislike_id,
            }
        })
        .collect();

    let html = render(&RecommendationCardsTemplate { cards })?;
    Ok(RenderedCards { html, buttons })
}

// ────────────────────────────────────────────────────────────────────────────
// Market panels
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct DemandView {
    skill: String,
    frequency: u32,
    demand: &'static str,
    marker: &'static str,
}

#[derive(Template)]
#[template(
    source = r#"<div class="market-skills-container">
    <div class="mb-2 market-source"><i class="fas fa-chart-line me-1"></i>Real market demand from Indian job market</div>
    {% for s in skills %}<span class="tag-item market-skill" title="Appears in {{ s.frequency }} real job listings" data-demand="{{ s.demand }}"><strong>{{ s.skill }}</strong> <span class="demand-count">{{ s.marker }} {{ s.frequency }}</span></span>{% endfor %}
</div>"#,
    ext = "html"
)]
struct SkillGapTemplate {
    skills: Vec<DemandView>,
}

pub fn market_gap_html(skills: &[MarketSkill]) -> Result<String, ClientError> {
    let skills = skills
        .iter()
        .take(GAP_PANEL_LIMIT)
        .map(|s| DemandView {
            skill: s.skill.clone(),
            frequency: s.frequency,
            demand: s.tier.attr(),
            marker: s.tier.marker(),
        })
        .collect();
    render(&SkillGapTemplate { skills })
}

#[derive(Debug, Clone)]
struct RoadmapItem {
    skill: String,
    badge: String,
    jobs: String,
}

impl RoadmapItem {
    fn from(skill: &MarketSkill) -> Self {
        Self {
            skill: skill.skill.clone(),
            badge: format!("{} {}", skill.tier.marker(), skill.tier.label()),
            jobs: skill.job_count(),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"{% if !strengthen.is_empty() %}<li class="roadmap-heading roadmap-have"><i class="fas fa-check-circle me-1"></i>Strengthen These (You Have)</li>
{% for item in strengthen %}<li class="roadmap-item"><strong>{{ item.skill }}</strong> <span class="roadmap-demand">{{ item.badge }} demand ({{ item.jobs }} jobs)</span><br><small>Advanced projects to deepen expertise</small></li>
{% endfor %}{% endif %}{% if !learn.is_empty() %}{% if !strengthen.is_empty() %}<li class="roadmap-heading roadmap-learn"><i class="fas fa-graduation-cap me-1"></i>Learn These (Priority Order)</li>
{% endif %}{% for item in learn %}<li class="roadmap-item"><strong>{{ loop.index }}. {{ item.skill }}</strong> <span class="roadmap-demand">{{ item.badge }} demand ({{ item.jobs }} jobs)</span><br><small>Online courses → Real projects → GitHub → Job applications</small></li>
{% endfor %}{% endif %}"#,
    ext = "html"
)]
struct RoadmapTemplate {
    strengthen: Vec<RoadmapItem>,
    learn: Vec<RoadmapItem>,
}

pub fn roadmap_html(roadmap: &Roadmap) -> Result<String, ClientError> {
    if roadmap.is_empty() {
        return Ok("<li>No market skills identified.</li>".to_string());
    }
    render(&RoadmapTemplate {
        strengthen: roadmap.strengthen.iter().map(RoadmapItem::from).collect(),
        learn: roadmap.learn.iter().map(RoadmapItem::from).collect(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback history
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct HistoryRow {
    id: String,
    role: String,
    feedback: String,
    badge: &'static str,
    date: String,
}

#[derive(Template)]
#[template(
    source = r#"{% for row in rows %}<div class="d-flex align-items-center justify-content-between mb-2 p-2 border rounded">
    <div>
        <strong>{{ row.role }}</strong>
        <span class="ms-2 badge bg-{{ row.badge }}">{{ row.feedback }}</span>
        <div class="small text-muted">{{ row.date }}</div>
    </div>
    <button class="btn btn-sm btn-outline-danger delete-feedback" id="delete-feedback-{{ row.id }}" data-feedback-id="{{ row.id }}" title="Delete this feedback"><i class="fas fa-trash-alt"></i></button>
</div>
{% endfor %}"#,
    ext = "html"
)]
struct FeedbackHistoryTemplate {
    rows: Vec<HistoryRow>,
}

pub fn feedback_history_html(entries: &[FeedbackEntry]) -> Result<String, ClientError> {
    let rows = entries
        .iter()
        .map(|e| HistoryRow {
            id: e.id.clone(),
            role: e.role.clone(),
            feedback: e.feedback.clone(),
            badge: if e.is_relevant() { "success" } else { "secondary" },
            date: e.display_date(),
        })
        .collect();
    render(&FeedbackHistoryTemplate { rows })
}

// ────────────────────────────────────────────────────────────────────────────
// Live jobs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct JobView {
    title: String,
    company: String,
    location: String,
    salary: String,
    link: String,
}

#[derive(Template)]
#[template(
    source = r#"{% for job in jobs %}<article class="recommendation-card">
    <div class="d-flex align-items-start justify-content-between">
        <div>
            <h4>{{ job.title }}</h4>
            <div class="match-score">{{ job.company }}</div>
        </div>
        <i class="fas fa-briefcase text-primary"></i>
    </div>
    <div class="explanation-text">
        <div><i class="fas fa-map-marker-alt me-1"></i>{{ job.location }}</div>
        <div><i class="fas fa-dollar-sign me-1"></i>{{ job.salary }}</div>
    </div>
    <div class="recommendation-actions">
        <a class="btn btn-sm btn-outline-primary" href="{{ job.link }}" target="_blank" rel="noopener"><i class="fas fa-external-link-alt me-1"></i>View job</a>
    </div>
</article>
{% endfor %}"#,
    ext = "html"
)]
struct LiveJobsTemplate {
    jobs: Vec<JobView>,
}

pub fn live_jobs_html(jobs: &[LiveJob]) -> Result<String, ClientError> {
    let jobs = jobs
        .iter()
        .map(|j| JobView {
            title: j.title().to_string(),
            company: j.company_name().to_string(),
            location: j.place().to_string(),
            salary: j.salary_label(),
            link: j.link().to_string(),
        })
        .collect();
    render(&LiveJobsTemplate { jobs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::market::{build_roadmap, market_skills};
    use std::collections::BTreeMap;

    fn analyst() -> Recommendation {
        Recommendation {
            job_title: "Data <Analyst>".to_string(),
            match_score: Some(0.72),
            required_skills: vec!["Python".into(), "SQL".into(), "Tableau".into()],
            skill_confidence: [("Python".to_string(), "Advanced".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_card_content_and_escaping() {
        let rendered = recommendation_cards(&[analyst()], &["python".into()], 3).unwrap();
        let html = &rendered.html;

        assert!(html.contains("Data &lt;Analyst&gt;"));
        assert!(!html.contains("<Analyst>"));
        assert!(html.contains("<span class=\"score-pill\">72%</span>"));
        assert!(html.contains("Why 72%?"));
        assert!(html.contains("1/3 required skills matched"));
        assert!(html.contains("2 skills to prioritize learning"));
        assert!(html.contains(DEFAULT_REASON));
        assert!(html.contains("Python <small>[Advanced]</small>"));
        assert!(html.contains("border-left: 3px solid #28a745"));
        assert!(html.contains("<span class=\"tag-item missing\">Tableau</span>"));
        assert!(html.contains("id=\"explain-3-0\""));
    }

    #[test]
    fn test_card_buttons_are_bound_per_verdict() {
        let rendered = recommendation_cards(&[analyst(), Recommendation::default()], &[], 9).unwrap();
        let ids: Vec<_> = rendered.buttons.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["fb-9-0-like", "fb-9-0-dislike", "fb-9-1-like", "fb-9-1-dislike"]);
        assert_eq!(rendered.buttons[1].1.feedback, FeedbackVerdict::NotRelevant);
        assert_eq!(rendered.buttons[2].1.role, "Role");
        assert!(rendered.html.contains("Career Role"));
        assert!(rendered.html.contains("No matches yet"));
    }

    #[test]
    fn test_gap_panel_limits_to_fifteen() {
        let map: BTreeMap<String, u32> = (0..20).map(|i| (format!("skill{i:02}"), i)).collect();
        let html = market_gap_html(&market_skills(&map)).unwrap();
        assert_eq!(html.matches("market-skill\"").count(), GAP_PANEL_LIMIT);
        assert!(html.contains("data-demand=\"high\""));
        assert!(html.contains("data-demand=\"low\""));
    }

    #[test]
    fn test_roadmap_sections() {
        let map: BTreeMap<String, u32> =
            [("Python".to_string(), 150), ("Docker".to_string(), 7)].into_iter().collect();
        let roadmap = build_roadmap(&market_skills(&map), &["python".into()]);
        let html = roadmap_html(&roadmap).unwrap();
        assert!(html.contains("Strengthen These (You Have)"));
        assert!(html.contains("(100+ jobs)"));
        assert!(html.contains("Learn These (Priority Order)"));
        assert!(html.contains("<strong>1. Docker</strong>"));

        let only_learn = build_roadmap(&market_skills(&map), &[]);
        let html = roadmap_html(&only_learn).unwrap();
        assert!(!html.contains("Learn These"));
        assert!(html.contains("<strong>2. Docker</strong>"));
    }

    #[test]
    fn test_feedback_rows_have_delete_buttons() {
        let entries = vec![FeedbackEntry {
            id: "12".into(),
            role: "ML Engineer".into(),
            feedback: "Relevant".into(),
            created_at: Some("2024-03-05T10:15:00".into()),
        }];
        let html = feedback_history_html(&entries).unwrap();
        assert!(html.contains("data-feedback-id=\"12\""));
        assert!(html.contains("id=\"delete-feedback-12\""));
        assert!(html.contains("bg-success"));
        assert!(html.contains("2024-03-05"));
    }

    #[test]
    fn test_live_job_cards() {
        let jobs = vec![LiveJob {
            job_title: Some("Rust Engineer".into()),
            redirect_url: Some("https://jobs.example/1".into()),
            ..Default::default()
        }];
        let html = live_jobs_html(&jobs).unwrap();
        assert!(html.contains("Rust Engineer"));
        assert!(html.contains("Company"));
        assert!(html.contains("Salary not listed"));
        assert!(html.contains("jobs.example"));
        assert!(html.contains("View job"));
    }
}
