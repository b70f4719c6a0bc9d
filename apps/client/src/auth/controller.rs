//! Login, registration and forgot-password forms.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::auth::validation::{
    calculate_password_strength, is_valid_email, password_requirements, validate_field, Field,
    FieldKind, FormValues, PasswordStrength,
};
use crate::dom::{Document, Navigator};
use crate::errors::ClientError;
use crate::http::ApiClient;
use crate::shell::alerts::{AlertLevel, AlertSink};

pub const DEFAULT_REDIRECT: &str = "/dashboard";
const REDIRECT_DELAY: Duration = Duration::from_secs(1);
const HASH_TABS: [&str; 2] = ["register", "login"];

// ────────────────────────────────────────────────────────────────────────────
// Form model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    ForgotPassword,
}

impl FormKind {
    pub fn form_id(self) -> &'static str {
        match self {
            FormKind::Login => "loginForm",
            FormKind::Register => "registerForm",
            FormKind::ForgotPassword => "forgotPasswordForm",
        }
    }

    pub fn default_action(self) -> &'static str {
        match self {
            FormKind::Login => "/login",
            FormKind::Register => "/register",
            FormKind::ForgotPassword => "/forgot-password",
        }
    }

    pub fn fields(self) -> Vec<Field> {
        match self {
            FormKind::Login => vec![
                Field::new("email", FieldKind::Email),
                Field::new("password", FieldKind::Password),
            ],
            FormKind::Register => vec![
                Field::new("name", FieldKind::Text),
                Field::new("email", FieldKind::Email),
                Field::new("password", FieldKind::Password),
                Field::new("confirm_password", FieldKind::ConfirmPassword),
                Field::new("terms_accepted", FieldKind::Checkbox),
            ],
            FormKind::ForgotPassword => vec![Field::new("email", FieldKind::Email)],
        }
    }

    fn loading_text(self) -> &'static str {
        match self {
            FormKind::Login => "Signing In...",
            FormKind::Register => "Creating account...",
            FormKind::ForgotPassword => "Sending reset email...",
        }
    }

    fn success_text(self) -> &'static str {
        match self {
            FormKind::Login => "Login successful! Redirecting...",
            FormKind::Register => "Account created successfully! Redirecting...",
            FormKind::ForgotPassword => "Password reset instructions sent.",
        }
    }

    fn failure_text(self) -> &'static str {
        match self {
            FormKind::Login => "Login failed. Please try again.",
            FormKind::Register => "Registration failed. Please try again.",
            FormKind::ForgotPassword => "An error occurred. Please try again.",
        }
    }

    fn submit_button(self) -> String {
        format!("{}-submit", self.form_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight.
    Ignored,
    /// Client-side validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    Succeeded { redirect_to: Option<String> },
    Failed { message: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    redirect_url: Option<String>,
    errors: Option<AuthErrors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthErrors {
    List(Vec<String>),
    Fields(BTreeMap<String, FieldMessages>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    fn first(&self) -> Option<&str> {
        match self {
            FieldMessages::One(message) => Some(message.as_str()),
            FieldMessages::Many(messages) => messages.first().map(String::as_str),
        }
    }
}

#[derive(Serialize)]
struct EmailCheckRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct EmailCheckResponse {
    available: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

/// Clears the in-flight flag when the submission finishes, however it ends.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AuthController {
    api: ApiClient,
    document: Arc<dyn Document>,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn AlertSink>,
    submitting: AtomicBool,
    redirect_delay: Duration,
}

impl AuthController {
    pub fn new(
        api: ApiClient,
        document: Arc<dyn Document>,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            api,
            document,
            navigator,
            alerts,
            submitting: AtomicBool::new(false),
            redirect_delay: REDIRECT_DELAY,
        }
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Page load: applies the URL fragment to the tabs.
    pub fn init(&self) {
        let hash = self.navigator.hash();
        if !hash.is_empty() {
            self.select_tab_from_hash(&hash);
        }
    }

    // ── Tabs ────────────────────────────────────────────────────────────────

    /// Activates the tab named by `#register` or `#login`. Any other fragment
    /// leaves the tabs untouched and returns `false`.
    pub fn select_tab_from_hash(&self, hash: &str) -> bool {
        let tab = hash.trim_start_matches('#');
        if !HASH_TABS.contains(&tab) {
            return false;
        }
        self.activate_tab(tab)
    }

    pub fn switch_tab(&self, tab: &str) -> bool {
        let activated = self.activate_tab(tab);
        self.navigator.set_hash(tab);
        activated
    }

    fn activate_tab(&self, tab: &str) -> bool {
        let buttons = self.document.ids_with_attribute("data-tab", tab);
        let form = format!("{tab}-form");
        if buttons.is_empty() || !self.document.exists(&form) {
            debug!("No tab markup for {}", tab);
            return false;
        }

        for id in self.document.ids_with_class("tab-btn") {
            self.document.remove_class(&id, "active");
        }
        for id in self.document.ids_with_class("form-wrapper") {
            self.document.remove_class(&id, "active");
        }
        for id in &buttons {
            self.document.add_class(id, "active");
        }
        self.document.add_class(&form, "active");
        true
    }

    // ── Password helpers ────────────────────────────────────────────────────

    /// Flips an input between `password` and `text`. Toggling the main
    /// password field flips the confirmation field with it.
    pub fn toggle_password_visibility(&self, field_id: &str, toggle_id: &str) -> bool {
        let Some(kind) = self.document.attribute(field_id, "type") else {
            return false;
        };
        let revealing = kind == "password";
        let next = if revealing { "text" } else { "password" };
        self.document.set_attribute(field_id, "type", next);
        self.document.set_attribute(
            &format!("{toggle_id}-icon"),
            "class",
            if revealing { "fas fa-eye-slash" } else { "fas fa-eye" },
        );

        if field_id == "password" && self.document.exists("confirm_password") {
            self.document.set_attribute("confirm_password", "type", next);
        }
        revealing
    }

    pub fn check_password_strength(&self, password: &str) -> PasswordStrength {
        let strength = calculate_password_strength(password);
        let bar = "passwordStrengthBar";
        let text = "passwordStrengthText";
        if !self.document.exists(bar) || !self.document.exists(text) {
            return strength;
        }

        self.document
            .set_style(bar, "width", &format!("{}%", strength.score));
        self.document
            .set_attribute(bar, "class", &format!("progress-bar bg-{}", strength.color));
        self.document
            .set_text(text, &format!("Password strength: {}", strength.label));
        self.document
            .set_attribute(text, "class", &format!("form-text text-{}", strength.color));

        for requirement in password_requirements(password) {
            let (on, off) = if requirement.met {
                ("text-success", "text-danger")
            } else {
                ("text-danger", "text-success")
            };
            self.document.add_class(requirement.id, on);
            self.document.remove_class(requirement.id, off);
            self.document.remove_class(requirement.id, "text-muted");
            self.document.set_attribute(
                &format!("{}-icon", requirement.id),
                "class",
                if requirement.met { "fas fa-check me-1" } else { "fas fa-times me-1" },
            );
        }
        strength
    }

    // ── Field errors ────────────────────────────────────────────────────────

    fn show_field_error(&self, field: &str, message: &str) {
        let error_id = format!("{field}-error");
        self.document.add_class(field, "is-invalid");
        self.document.set_text(&error_id, message);
        self.document.set_style(&error_id, "display", "block");
    }

    fn clear_field_error(&self, field: &str) {
        let error_id = format!("{field}-error");
        self.document.remove_class(field, "is-invalid");
        self.document.set_text(&error_id, "");
        self.document.set_style(&error_id, "display", "none");
    }

    /// Collects the current values of a form's inputs from the document.
    pub fn read_form(&self, kind: FormKind) -> FormValues {
        let mut form = FormValues::new();
        for field in kind.fields() {
            if field.kind == FieldKind::Checkbox {
                if self.document.is_checked(field.name) == Some(true) {
                    form.insert(field.name, "on");
                }
            } else if let Some(value) = self.document.value(field.name) {
                form.insert(field.name, &value);
            }
        }
        form
    }

    fn validate(&self, kind: FormKind, form: &FormValues) -> Vec<FieldError> {
        let enforce_strength = kind == FormKind::Register;
        let mut errors = Vec::new();
        for field in kind.fields() {
            // The terms checkbox is optional markup.
            if field.kind == FieldKind::Checkbox && !self.document.exists(field.name) {
                continue;
            }
            self.clear_field_error(field.name);
            if let Err(message) = validate_field(&field, form, enforce_strength) {
                self.show_field_error(field.name, &message);
                errors.push(FieldError {
                    field: field.name.to_string(),
                    message,
                });
            }
        }
        errors
    }

    // ── Submission ──────────────────────────────────────────────────────────

    fn set_submission_state(&self, kind: FormKind, submitting: bool) {
        let button = kind.submit_button();
        let text = format!("{button}-text");
        let loading = format!("{button}-loading");
        if submitting {
            self.document.hide(&text);
            self.document.show(&loading);
            self.document
                .set_text(&format!("{button}-loading-text"), kind.loading_text());
        } else {
            self.document.show(&text);
            self.document.hide(&loading);
        }
        self.document.set_disabled(&button, submitting);
    }

    pub async fn submit(&self, kind: FormKind, form: FormValues) -> SubmitOutcome {
        if self.is_submitting() {
            debug!("{:?} submit ignored: already in flight", kind);
            return SubmitOutcome::Ignored;
        }

        let errors = self.validate(kind, &form);
        if !errors.is_empty() {
            debug!("{:?} form has {} invalid field(s)", kind, errors.len());
            return SubmitOutcome::Invalid(errors);
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmitOutcome::Ignored;
        }
        let _guard = SubmitGuard(&self.submitting);

        self.set_submission_state(kind, true);
        let outcome = self.send(kind, &form).await;
        self.set_submission_state(kind, false);
        outcome
    }

    async fn send(&self, kind: FormKind, form: &FormValues) -> SubmitOutcome {
        let action = self
            .document
            .attribute(kind.form_id(), "action")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| kind.default_action().to_string());

        info!("Submitting {:?} form to {}", kind, action);
        let response = match self.api.post_form(&action, form.to_pairs()).await {
            Ok(response) => response,
            Err(e) => return self.fail(kind, &e),
        };

        let data: AuthResponse = match response.json() {
            Ok(data) => data,
            Err(e) => {
                warn!("Unreadable {:?} response ({}): {}", kind, response.status, e);
                let err = if response.is_success() {
                    e
                } else {
                    ClientError::Http {
                        status: response.status,
                        message: String::new(),
                    }
                };
                return self.fail(kind, &err);
            }
        };

        if response.is_success() && data.success {
            return self.succeed(kind, form, data).await;
        }

        warn!("{:?} rejected with status {}", kind, response.status);
        let message = self.report_server_errors(kind, &data);
        SubmitOutcome::Failed { message }
    }

    async fn succeed(&self, kind: FormKind, form: &FormValues, data: AuthResponse) -> SubmitOutcome {
        let message = data
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| kind.success_text().to_string());

        if kind == FormKind::ForgotPassword {
            self.show_password_reset_success(form.get("email").trim());
            self.alerts.show(AlertLevel::Success, &message);
            return SubmitOutcome::Succeeded { redirect_to: None };
        }

        self.alerts.show(AlertLevel::Success, &message);
        let target = data
            .redirect_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_REDIRECT.to_string());
        if !self.redirect_delay.is_zero() {
            tokio::time::sleep(self.redirect_delay).await;
        }
        info!("{:?} succeeded, redirecting to {}", kind, target);
        self.navigator.navigate(&target);
        SubmitOutcome::Succeeded {
            redirect_to: Some(target),
        }
    }

    /// Surfaces a `success: false` body. A list of errors becomes one alert
    /// each; a field map is shown next to the fields.
    fn report_server_errors(&self, kind: FormKind, data: &AuthResponse) -> String {
        let fallback = data
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| kind.failure_text().to_string());

        match &data.errors {
            Some(AuthErrors::List(list)) if !list.is_empty() => {
                for message in list {
                    self.alerts.show(AlertLevel::Error, message);
                }
                list.join("; ")
            }
            Some(AuthErrors::Fields(fields)) if !fields.is_empty() => {
                for (field, messages) in fields {
                    if let Some(message) = messages.first() {
                        self.show_field_error(field, message);
                    }
                }
                fallback
            }
            _ => {
                self.alerts.show(AlertLevel::Error, &fallback);
                fallback
            }
        }
    }

    fn fail(&self, kind: FormKind, err: &ClientError) -> SubmitOutcome {
        error!("{:?} submission failed: {}", kind, err);
        let message = match err {
            ClientError::Http { message, .. } if message.is_empty() => {
                kind.failure_text().to_string()
            }
            _ => err.user_message(),
        };
        self.alerts.show(AlertLevel::Error, &message);
        SubmitOutcome::Failed { message }
    }

    fn show_password_reset_success(&self, email: &str) {
        let form = FormKind::ForgotPassword.form_id();
        if !self.document.exists(form) || !self.document.exists("successState") {
            return;
        }
        self.document.hide(form);
        self.document.show("successState");
        self.document.set_text("sentEmail", email);
    }

    // ── Extras ──────────────────────────────────────────────────────────────

    /// Asks the backend whether `email` is free. Returns `None` when no check
    /// was made or the check failed.
    pub async fn check_email_availability(&self, url: &str, email: &str) -> Option<bool> {
        let email = email.trim();
        if url.is_empty() || !is_valid_email(email) {
            return None;
        }

        let response: EmailCheckResponse = match self
            .api
            .post_json(url, &EmailCheckRequest { email })
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Email availability check failed: {}", e);
                return None;
            }
        };

        let available = response.available.unwrap_or(false);
        if available {
            self.clear_field_error("email");
        } else {
            self.show_field_error("email", "This email is already registered");
        }
        Some(available)
    }

    pub fn social_login(&self, provider: &str) -> bool {
        let provider = provider.trim();
        if provider.is_empty() {
            return false;
        }
        self.navigator.navigate(&format!("/auth/social/{provider}"));
        true
    }
}
