//! Landing page: call-to-action buttons, feature-card fade-in and the demo
//! modal shown to visitors without a session.

use std::sync::Arc;

use askama::Template;
use tracing::debug;

use crate::dom::{Document, Navigator};
use crate::shell::markup::{render_or_log, ModalSize, ModalSpec};

pub const REGISTER_URL: &str = "auth.html#register";
pub const LOGIN_URL: &str = "auth.html#login";
pub const FEATURE_CARD: &str = "feature-card";
pub const DEMO_MODAL_ID: &str = "demoModal";

#[derive(Debug, Clone, Copy)]
struct DemoRole {
    title: &'static str,
    score: u8,
    skills: &'static str,
}

const DEMO_ROLES: [DemoRole; 3] = [
    DemoRole {
        title: "Data Analyst",
        score: 86,
        skills: "Python, SQL, Tableau",
    },
    DemoRole {
        title: "Machine Learning Engineer",
        score: 72,
        skills: "Python, TensorFlow, Docker",
    },
    DemoRole {
        title: "Business Intelligence Developer",
        score: 64,
        skills: "SQL, Power BI, Excel",
    },
];

#[derive(Template)]
#[template(
    source = r#"<p class="text-muted">Sample results for a profile with Python, SQL and two years of experience.</p>
{% for role in roles %}<div class="recommendation-card mb-2">
    <div class="d-flex justify-content-between"><h6>{{ role.title }}</h6><span class="score-pill">{{ role.score }}%</span></div>
    <div class="small text-muted">Key skills: {{ role.skills }}</div>
</div>
{% endfor %}<p class="small mb-0">Create an account to get recommendations for your own profile.</p>"#,
    ext = "html"
)]
struct DemoBodyTemplate {
    roles: Vec<DemoRole>,
}

pub struct LandingPage {
    document: Arc<dyn Document>,
    navigator: Arc<dyn Navigator>,
}

impl LandingPage {
    pub fn new(document: Arc<dyn Document>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            document,
            navigator,
        }
    }

    pub fn get_started(&self) {
        self.navigator.navigate(REGISTER_URL);
    }

    pub fn login(&self) {
        self.navigator.navigate(LOGIN_URL);
    }

    /// Hides every feature card until it scrolls into view. Returns how many
    /// cards were prepared.
    pub fn prepare_fade_in(&self) -> usize {
        let cards = self.document.ids_with_class(FEATURE_CARD);
        for id in &cards {
            self.document.set_style(id, "opacity", "0");
            self.document.set_style(id, "transform", "translateY(30px)");
            self.document
                .set_style(id, "transition", "opacity 0.6s ease, transform 0.6s ease");
        }
        debug!("Prepared {} feature cards for fade-in", cards.len());
        cards.len()
    }

    /// Reveals the intersecting feature cards. Other ids are ignored.
    pub fn on_intersect(&self, ids: &[&str]) -> usize {
        let mut revealed = 0;
        for id in ids {
            if !self.document.has_class(id, FEATURE_CARD) {
                continue;
            }
            self.document.set_style(id, "opacity", "1");
            self.document.set_style(id, "transform", "translateY(0)");
            revealed += 1;
        }
        revealed
    }
}

/// Static demo markup for visitors. A signed-in session gets `None`.
pub fn demo_modal(session: Option<&str>) -> Option<String> {
    if session.is_some_and(|s| !s.is_empty()) {
        return None;
    }

    let body_html = render_or_log(
        &DemoBodyTemplate {
            roles: DEMO_ROLES.to_vec(),
        },
        "demo body",
    )?;
    let spec = ModalSpec {
        id: DEMO_MODAL_ID.to_string(),
        title: "See it in action".to_string(),
        body_html,
        footer_html: Some(format!(
            r#"<a class="btn btn-primary" href="{REGISTER_URL}">Get started</a>"#
        )),
        size: ModalSize::Large,
    };
    spec.render().ok()
}
