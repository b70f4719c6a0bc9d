use askama::Template;
use tracing::error;

use crate::errors::ClientError;

/// Renders a template, mapping failures into `ClientError::Render`.
pub fn render<T: Template>(template: &T) -> Result<String, ClientError> {
    template.render().map_err(ClientError::from)
}

/// Renders a template for a fire-and-forget DOM update. A failure is logged
/// and yields `None` so the caller can skip the update.
pub fn render_or_log<T: Template>(template: &T, what: &str) -> Option<String> {
    match template.render() {
        Ok(html) => Some(html),
        Err(e) => {
            error!("Failed to render {}: {}", what, e);
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalSize {
    Default,
    Small,
    Large,
}

impl ModalSize {
    fn css(self) -> &'static str {
        match self {
            ModalSize::Default => "",
            ModalSize::Small => "modal-sm",
            ModalSize::Large => "modal-lg",
        }
    }
}

/// Generic Bootstrap modal. `body_html` and `footer_html` are trusted markup
/// produced by other templates.
#[derive(Template)]
#[template(
    source = r#"<div class="modal fade" id="{{ id }}" tabindex="-1">
    <div class="modal-dialog {{ size_class }}">
        <div class="modal-content">
            <div class="modal-header">
                <h5 class="modal-title">{{ title }}</h5>
                <button type="button" class="btn-close" data-bs-dismiss="modal"></button>
            </div>
            <div class="modal-body">
                {{ body_html|safe }}
            </div>
            {% if has_footer %}<div class="modal-footer">{{ footer_html|safe }}</div>{% endif %}
        </div>
    </div>
</div>"#,
    ext = "html"
)]
struct ModalTemplate {
    id: String,
    size_class: String,
    title: String,
    body_html: String,
    has_footer: bool,
    footer_html: String,
}

pub struct ModalSpec {
    pub id: String,
    pub title: String,
    pub body_html: String,
    pub footer_html: Option<String>,
    pub size: ModalSize,
}

impl ModalSpec {
    pub fn render(&self) -> Result<String, ClientError> {
        render(&ModalTemplate {
            id: self.id.clone(),
            size_class: self.size.css().to_string(),
            title: self.title.clone(),
            body_html: self.body_html.clone(),
            has_footer: self.footer_html.is_some(),
            footer_html: self.footer_html.clone().unwrap_or_default(),
        })
    }
}
