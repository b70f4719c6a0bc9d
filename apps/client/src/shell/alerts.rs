//! Alert capability shared by all components.
//!
//! Every controller receives an `Arc<dyn AlertSink>` at construction. The app
//! shell provides [`GlobalAlerts`]; components embedded in a page without the
//! shell fall back to [`InlineAlerts`] on their own container.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use askama::Template;
use tracing::{error, info, warn};

use crate::dom::Document;
use crate::shell::markup::render_or_log;

pub const GLOBAL_ALERT_CONTAINER: &str = "global-alerts";
const MAX_VISIBLE_ALERTS: usize = 3;
const INLINE_DISMISS_AFTER: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertLevel {
    /// Bootstrap contextual class suffix.
    pub fn css(self) -> &'static str {
        match self {
            AlertLevel::Success => "success",
            AlertLevel::Error => "danger",
            AlertLevel::Warning => "warning",
            AlertLevel::Info => "info",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AlertLevel::Success => "check-circle",
            AlertLevel::Error => "exclamation-circle",
            AlertLevel::Warning => "exclamation-triangle",
            AlertLevel::Info => "info-circle",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AlertLevel::Success => "Success!",
            AlertLevel::Error => "Error!",
            AlertLevel::Warning => "Warning!",
            AlertLevel::Info => "Info:",
        }
    }

    pub fn auto_dismiss_after(self) -> Duration {
        match self {
            AlertLevel::Warning => Duration::from_millis(2500),
            AlertLevel::Error => Duration::from_secs(5),
            AlertLevel::Success | AlertLevel::Info => Duration::from_secs(15),
        }
    }
}

pub trait AlertSink: Send + Sync {
    fn show(&self, level: AlertLevel, message: &str);
}

#[derive(Debug, Clone)]
struct AlertView {
    id: String,
    css: String,
    icon: String,
    title: String,
    message: String,
    level: AlertLevel,
}

impl AlertView {
    fn new(id: String, level: AlertLevel, message: &str, with_title: bool) -> Self {
        Self {
            id,
            css: level.css().to_string(),
            icon: level.icon().to_string(),
            title: if with_title {
                level.title().to_string()
            } else {
                String::new()
            },
            message: message.to_string(),
            level,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"{% for alert in alerts %}<div class="alert alert-{{ alert.css }} alert-dismissible fade show" role="alert" id="{{ alert.id }}">
    <i class="fas fa-{{ alert.icon }} me-2"></i>
    {% if !alert.title.is_empty() %}<strong>{{ alert.title }}</strong> {% endif %}{{ alert.message }}
    <button type="button" class="btn-close" data-bs-dismiss="alert" aria-label="Close"></button>
</div>
{% endfor %}"#,
    ext = "html"
)]
struct AlertStackTemplate {
    alerts: Vec<AlertView>,
}

/// Re-renders `container` from the current alert list.
fn paint(document: &dyn Document, container: &str, alerts: &[AlertView]) {
    let template = AlertStackTemplate {
        alerts: alerts.to_vec(),
    };
    if let Some(html) = render_or_log(&template, "alert stack") {
        document.set_html(container, &html);
    }
}

/// Removes alert `id` after `delay`, when a tokio runtime is available.
fn schedule_dismiss(
    document: Arc<dyn Document>,
    alerts: Arc<Mutex<Vec<AlertView>>>,
    container: String,
    id: String,
    delay: Duration,
) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    handle.spawn(async move {
        tokio::time::sleep(delay).await;
        let snapshot = {
            let mut list = match alerts.lock() {
                Ok(list) => list,
                Err(_) => return,
            };
            let before = list.len();
            list.retain(|a| a.id != id);
            if list.len() == before {
                return;
            }
            list.clone()
        };
        paint(document.as_ref(), &container, &snapshot);
    });
}

/// The app shell's global notification area.
pub struct GlobalAlerts {
    document: Arc<dyn Document>,
    alerts: Arc<Mutex<Vec<AlertView>>>,
    next_id: AtomicU64,
}

impl GlobalAlerts {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self {
            document,
            alerts: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn visible(&self) -> Vec<(AlertLevel, String)> {
        self.alerts
            .lock()
            .map(|list| list.iter().map(|a| (a.level, a.message.clone())).collect())
            .unwrap_or_default()
    }
}

impl AlertSink for GlobalAlerts {
    fn show(&self, level: AlertLevel, message: &str) {
        if self.document.ensure(GLOBAL_ALERT_CONTAINER, "div") {
            self.document.set_attribute(
                GLOBAL_ALERT_CONTAINER,
                "class",
                "position-fixed top-0 end-0 p-3",
            );
            self.document
                .set_style(GLOBAL_ALERT_CONTAINER, "z-index", "1060");
        }

        let id = format!("alert-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let snapshot = {
            let Ok(mut list) = self.alerts.lock() else {
                error!("Alert list lock poisoned; dropping alert: {}", message);
                return;
            };
            // Same-level alerts are replaced; a full stack is cleared.
            if list.len() >= MAX_VISIBLE_ALERTS {
                list.clear();
            } else {
                list.retain(|a| a.level != level);
            }
            list.push(AlertView::new(id.clone(), level, message, true));
            list.clone()
        };

        paint(self.document.as_ref(), GLOBAL_ALERT_CONTAINER, &snapshot);
        schedule_dismiss(
            self.document.clone(),
            self.alerts.clone(),
            GLOBAL_ALERT_CONTAINER.to_string(),
            id,
            level.auto_dismiss_after(),
        );
    }
}

/// Component-local fallback: one alert at a time inside `container`.
pub struct InlineAlerts {
    document: Arc<dyn Document>,
    container: String,
    current: Arc<Mutex<Vec<AlertView>>>,
    next_id: AtomicU64,
}

impl InlineAlerts {
    pub fn new(document: Arc<dyn Document>, container: &str) -> Self {
        Self {
            document,
            container: container.to_string(),
            current: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl AlertSink for InlineAlerts {
    fn show(&self, level: AlertLevel, message: &str) {
        let id = format!(
            "{}-alert-{}",
            self.container,
            self.next_id.fetch_add(1, Ordering::Relaxed)
        );
        let snapshot = vec![AlertView::new(id.clone(), level, message, false)];
        if let Ok(mut current) = self.current.lock() {
            *current = snapshot.clone();
        }

        paint(self.document.as_ref(), &self.container, &snapshot);
        schedule_dismiss(
            self.document.clone(),
            self.current.clone(),
            self.container.clone(),
            id,
            INLINE_DISMISS_AFTER,
        );
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn show(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Error => error!("alert: {}", message),
            AlertLevel::Warning => warn!("alert: {}", message),
            AlertLevel::Success | AlertLevel::Info => info!("alert: {}", message),
        }
    }
}

/// Keeps every alert in order. The CLI prints these after each command.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    shown: Mutex<Vec<(AlertLevel, String)>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(AlertLevel, String)> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<(AlertLevel, String)> {
        self.shown
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }

    pub fn contains(&self, level: AlertLevel, needle: &str) -> bool {
        self.shown()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl AlertSink for RecordingAlerts {
    fn show(&self, level: AlertLevel, message: &str) {
        LogAlerts.show(level, message);
        if let Ok(mut shown) = self.shown.lock() {
            shown.push((level, message.to_string()));
        }
    }
}
