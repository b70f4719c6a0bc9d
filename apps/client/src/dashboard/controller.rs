//! The dashboard page: resume upload, manual profile, analysis, filters,
//! market panels, feedback and live jobs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::dashboard::feedback::{
    FeedbackAck, FeedbackBindings, FeedbackHistoryResponse, EMPTY_HISTORY, FEEDBACK_HISTORY_PATH,
    FEEDBACK_NOT_SAVED, FEEDBACK_PATH, HISTORY_UNAVAILABLE,
};
use crate::dashboard::jobs::{build_live_query, JobsResponse, LIVE_JOBS_PATH, LIVE_JOB_RESULTS};
use crate::dashboard::market::{build_roadmap, market_skills};
use crate::dashboard::profile::{
    build_manual_profile, build_profile_from_resume, profile_completion, ManualProfileInput,
    ProfilePayload, ResumeUploadResponse, EMPTY_MANUAL_PROFILE,
};
use crate::dashboard::recommendations::{
    select_visible, FilterState, Recommendation, FILTER_EXPERIENCE, FILTER_INDUSTRY,
    FILTER_LOCATION, FILTER_MATCH_SCORE, FILTER_WORK_TYPE,
};
use crate::dashboard::render::{
    feedback_history_html, live_jobs_html, market_gap_html, recommendation_cards, roadmap_html,
    EMPTY_GAP_TEXT, EMPTY_ROADMAP_HTML,
};
use crate::dashboard::upload::{validate_file, ProgressAnimator, ResumeFile};
use crate::dom::Document;
use crate::errors::ClientError;
use crate::http::ApiClient;
use crate::shell::alerts::{AlertLevel, AlertSink};

pub const UPLOAD_PATH: &str = "/upload_resume";
pub const ANALYZE_PATH: &str = "/analyze_profile";

const PULSE_FOR: Duration = Duration::from_secs(2);
const SHAKE_FOR: Duration = Duration::from_millis(600);
const ANALYSIS_MESSAGE: &str = "Analyzing profile and matching roles...";
const UPLOAD_FAILED: &str = "Upload failed. Please try again.";
const NO_PROFILE_YET: &str = "Choose a resume or manual profile input first.";

// Element ids.
const RECOMMENDATIONS_LIST: &str = "recommendationsList";
const RECOMMENDATIONS_EMPTY: &str = "recommendationsEmpty";
const FILTER_PANEL: &str = "filterPanel";
const RERUN_BUTTON: &str = "rerunAnalysisBtn";
const SKILL_GAP_LIST: &str = "skillGapList";
const ROADMAP_LIST: &str = "roadmapList";
const FEEDBACK_LIST: &str = "feedbackList";
const LIVE_JOBS_LIST: &str = "liveJobsList";
const LIVE_JOBS_EMPTY: &str = "liveJobsEmpty";
const DATA_LAST_UPDATED: &str = "dataLastUpdated";
const UPLOAD_PROGRESS: &str = "uploadProgress";
const UPLOAD_PROGRESS_BAR: &str = "uploadProgressBar";
const DROP_ZONE: &str = "fileDropZone";
const DROP_ZONE_CONTENT: &str = "dropZoneContent";
const LOADING_OVERLAY: &str = "loadingOverlay";
const LOADING_MESSAGE: &str = "loadingOverlayMessage";
const PROFILE_STATUS: &str = "profileStatus";
const PROFILE_PROGRESS_BAR: &str = "profileProgressBar";
const PROFILE_COMPLETION_TEXT: &str = "profileCompletionText";
const INPUT_MODES: &str = "input-modes";

// ────────────────────────────────────────────────────────────────────────────
// Outcomes and wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Rendered { shown: usize },
    /// The backend returned no recommendations.
    Empty,
    /// A newer analysis was issued while this one was in flight.
    Stale,
    Failed { message: String },
    /// Nothing to analyse: an empty manual form, or no profile yet.
    NoProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Another upload was already in flight.
    Ignored,
    /// The file failed the size or type check; nothing was sent.
    Rejected { message: String },
    Failed { message: String },
    /// Parsed, but nothing usable came back.
    NoProfile,
    Analysed(AnalysisOutcome),
}

/// Skill demand counts. Anything but a map of numbers reads as empty.
fn de_frequencies<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, u32>, D::Error> {
    let Value::Object(map) = Value::deserialize(d)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(skill, count)| {
            let count = count
                .as_u64()
                .or_else(|| count.as_f64().filter(|c| *c >= 0.0).map(|c| c.round() as u64))?;
            Some((skill, u32::try_from(count).unwrap_or(u32::MAX)))
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    recommendations: Option<Vec<Recommendation>>,
    #[serde(default, deserialize_with = "de_frequencies")]
    market_skills: BTreeMap<String, u32>,
}

#[derive(Debug, Default)]
struct DashboardState {
    last_profile: Option<ProfilePayload>,
    last_skills: Vec<String>,
    /// The visible set from the last render; filters narrow this, never replace it.
    all_recommendations: Vec<Recommendation>,
    rendered_skills: Vec<String>,
    filters: FilterState,
}

/// Clears the upload flag when the upload step finishes, however it ends.
struct UploadGuard<'a>(&'a AtomicBool);

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct DashboardController {
    api: ApiClient,
    document: Arc<dyn Document>,
    alerts: Arc<dyn AlertSink>,
    state: Mutex<DashboardState>,
    generation: AtomicU64,
    uploading: AtomicBool,
    feedback: FeedbackBindings,
    render_seq: AtomicU64,
    live_jobs_location: String,
}

impl DashboardController {
    pub fn new(
        api: ApiClient,
        document: Arc<dyn Document>,
        alerts: Arc<dyn AlertSink>,
        live_jobs_location: impl Into<String>,
    ) -> Self {
        Self {
            api,
            document,
            alerts,
            state: Mutex::new(DashboardState::default()),
            generation: AtomicU64::new(0),
            uploading: AtomicBool::new(false),
            feedback: FeedbackBindings::new(),
            render_seq: AtomicU64::new(0),
            live_jobs_location: live_jobs_location.into(),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    pub fn last_profile(&self) -> Option<ProfilePayload> {
        self.state.lock().ok()?.last_profile.clone()
    }

    /// The full result set filters are applied to.
    pub fn all_recommendations(&self) -> Vec<Recommendation> {
        self.state
            .lock()
            .map(|s| s.all_recommendations.clone())
            .unwrap_or_default()
    }

    fn remember_profile(&self, profile: &ProfilePayload) {
        if let Ok(mut state) = self.state.lock() {
            state.last_profile = Some(profile.clone());
            state.last_skills = profile.skills.clone();
        }
    }

    // ── Page helpers ────────────────────────────────────────────────────────

    fn set_profile_status(&self, status: &str) {
        self.document.set_text(PROFILE_STATUS, status);
    }

    fn show_loading_overlay(&self, message: &str) {
        self.document.set_text(LOADING_MESSAGE, message);
        self.document.show(LOADING_OVERLAY);
    }

    fn hide_loading_overlay(&self) {
        self.document.hide(LOADING_OVERLAY);
    }

    /// Adds `class` to `id` and takes it off again after `duration`.
    fn flash_class(&self, id: &str, class: &str, duration: Duration) -> bool {
        if !self.document.add_class(id, class) {
            return false;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return true;
        };
        let document = self.document.clone();
        let (id, class) = (id.to_string(), class.to_string());
        handle.spawn(async move {
            tokio::time::sleep(duration).await;
            document.remove_class(&id, &class);
        });
        true
    }

    /// Pulse-highlights a section.
    pub fn scroll_to_section(&self, section_id: &str) -> bool {
        self.flash_class(section_id, "animate-pulse", PULSE_FOR)
    }

    fn shake_drop_zone(&self) {
        self.flash_class(DROP_ZONE, "animate-shake", SHAKE_FOR);
    }

    fn paint_html(&self, id: &str, markup: Result<String, ClientError>, what: &str) -> bool {
        match markup {
            Ok(html) => self.document.set_html(id, &html),
            Err(e) => {
                error!("Failed to render {}: {}", what, e);
                false
            }
        }
    }

    pub fn update_profile_completion(&self, profile: &ProfilePayload) -> u8 {
        let percent = profile_completion(profile);
        self.document
            .set_style(PROFILE_PROGRESS_BAR, "width", &format!("{percent}%"));
        self.document
            .set_attribute(PROFILE_PROGRESS_BAR, "aria-valuenow", &percent.to_string());
        self.document
            .set_text(PROFILE_COMPLETION_TEXT, &format!("{percent}% complete"));
        percent
    }

    // ── Resume upload ───────────────────────────────────────────────────────

    fn show_upload_progress(&self) {
        self.document.hide(DROP_ZONE_CONTENT);
        self.document.show(UPLOAD_PROGRESS);
    }

    fn hide_upload_progress(&self) {
        self.document.hide(UPLOAD_PROGRESS);
        self.document.show(DROP_ZONE_CONTENT);
    }

    fn upload_failed(&self, message: String) -> UploadOutcome {
        self.alerts.show(AlertLevel::Error, &message);
        self.shake_drop_zone();
        UploadOutcome::Failed { message }
    }

    pub async fn handle_file_upload(&self, file: ResumeFile) -> UploadOutcome {
        let profile = match self.upload_resume(file).await {
            Ok(profile) => profile,
            Err(outcome) => return outcome,
        };

        self.set_profile_status("Resume parsed");
        self.remember_profile(&profile);
        let skills = profile.skills.clone();
        UploadOutcome::Analysed(self.submit_profile_for_analysis(profile, skills).await)
    }

    /// The guarded part of an upload: validation, the request and the
    /// progress section. Analysis runs after the guard is released.
    async fn upload_resume(&self, file: ResumeFile) -> Result<ProfilePayload, UploadOutcome> {
        if self
            .uploading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Upload of {} ignored: another upload is in flight", file.name);
            return Err(UploadOutcome::Ignored);
        }
        let _guard = UploadGuard(&self.uploading);

        if let Err(e) = validate_file(&file.name, file.size()) {
            let message = e.user_message();
            warn!("Rejected {}: {}", file.name, message);
            self.alerts.show(AlertLevel::Error, &message);
            self.shake_drop_zone();
            return Err(UploadOutcome::Rejected { message });
        }

        info!("Uploading {} ({} bytes)", file.name, file.size());
        self.show_upload_progress();
        let mut animator = ProgressAnimator::start(self.document.clone(), UPLOAD_PROGRESS_BAR);
        let result = self
            .api
            .upload::<ResumeUploadResponse>(UPLOAD_PATH, file.to_part())
            .await;
        animator.stop();
        self.document.set_style(UPLOAD_PROGRESS_BAR, "width", "100%");

        let outcome = match result {
            Ok(response) => self.read_upload_response(&response),
            Err(e) => {
                error!("Resume upload failed: {}", e);
                let message = match e {
                    ClientError::Http { message, .. } if !message.is_empty() => message,
                    _ => UPLOAD_FAILED.to_string(),
                };
                Err(self.upload_failed(message))
            }
        };
        self.hide_upload_progress();
        outcome
    }

    fn read_upload_response(
        &self,
        response: &ResumeUploadResponse,
    ) -> Result<ProfilePayload, UploadOutcome> {
        if let Some(message) = response.failure() {
            warn!("Resume analysis reported an error: {}", message);
            return Err(self.upload_failed(message));
        }

        self.alerts.show(
            AlertLevel::Success,
            "Resume uploaded successfully. Building your profile...",
        );
        build_profile_from_resume(response).ok_or_else(|| {
            self.alerts.show(
                AlertLevel::Warning,
                "Resume parsed, but no usable profile data was found. Try manual profile input.",
            );
            UploadOutcome::NoProfile
        })
    }

    // ── Manual profile ──────────────────────────────────────────────────────

    pub fn read_manual_profile(&self) -> ManualProfileInput {
        ManualProfileInput {
            education_level: self.document.trimmed_value("educationLevel"),
            years_experience: self.document.trimmed_value("yearsExperience"),
            skills: self.document.value("skillsInput").unwrap_or_default(),
            interests: self.document.value("interestArea").unwrap_or_default(),
        }
    }

    pub async fn handle_manual_profile(&self, input: &ManualProfileInput) -> AnalysisOutcome {
        let Some(profile) = build_manual_profile(input) else {
            self.alerts.show(AlertLevel::Warning, EMPTY_MANUAL_PROFILE);
            return AnalysisOutcome::NoProfile;
        };

        self.remember_profile(&profile);
        self.set_profile_status("Manual profile ready");
        let skills = profile.skills.clone();
        self.submit_profile_for_analysis(profile, skills).await
    }

    // ── Analysis ────────────────────────────────────────────────────────────

    /// Only the response to the most recent call is applied; earlier ones
    /// come back as [`AnalysisOutcome::Stale`].
    pub async fn submit_profile_for_analysis(
        &self,
        profile: ProfilePayload,
        user_skills: Vec<String>,
    ) -> AnalysisOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.show_loading_overlay(ANALYSIS_MESSAGE);
        self.update_profile_completion(&profile);

        info!(
            "Analysing profile #{} ({} skills, {} interests)",
            token,
            profile.skills.len(),
            profile.interests.len()
        );
        let result = self
            .api
            .post_json::<_, AnalysisResponse>(ANALYZE_PATH, &profile)
            .await;

        if self.generation.load(Ordering::SeqCst) != token {
            debug!("Discarding stale analysis #{}", token);
            return AnalysisOutcome::Stale;
        }

        let outcome = match result {
            Ok(response) => {
                self.apply_analysis(response, &profile, &user_skills, token)
                    .await
            }
            Err(e) => {
                error!("Profile analysis failed: {}", e);
                let message = "Profile analysis failed. Please try again.".to_string();
                self.alerts.show(AlertLevel::Error, &message);
                AnalysisOutcome::Failed { message }
            }
        };
        if self.generation.load(Ordering::SeqCst) == token {
            self.hide_loading_overlay();
        }
        outcome
    }

    async fn apply_analysis(
        &self,
        response: AnalysisResponse,
        profile: &ProfilePayload,
        user_skills: &[String],
        token: u64,
    ) -> AnalysisOutcome {
        let recommendations = response.recommendations.unwrap_or_default();
        let outcome = if recommendations.is_empty() {
            self.alerts.show(
                AlertLevel::Warning,
                "No recommendations returned. Try adding skills.",
            );
            self.show_empty_recommendations();
            AnalysisOutcome::Empty
        } else {
            let shown = self.render_recommendations(&recommendations, user_skills);
            self.set_profile_status("Recommendations ready");
            AnalysisOutcome::Rendered { shown }
        };

        self.render_market_panels(&response.market_skills, user_skills);
        self.fetch_live_jobs(profile, user_skills, Some(token))
            .await;
        outcome
    }

    pub async fn get_personalized_recommendations(&self) -> AnalysisOutcome {
        let last = self
            .state
            .lock()
            .ok()
            .and_then(|s| s.last_profile.clone().map(|p| (p, s.last_skills.clone())));
        let Some((profile, skills)) = last else {
            self.alerts.show(AlertLevel::Warning, NO_PROFILE_YET);
            self.scroll_to_section(INPUT_MODES);
            return AnalysisOutcome::NoProfile;
        };
        self.submit_profile_for_analysis(profile, skills).await
    }

    pub async fn rerun_analysis(&self) -> AnalysisOutcome {
        self.get_personalized_recommendations().await
    }

    // ── Recommendations and filters ─────────────────────────────────────────

    fn show_empty_recommendations(&self) {
        self.document.hide(RECOMMENDATIONS_LIST);
        self.document.show(RECOMMENDATIONS_EMPTY);
    }

    /// Renders the visible subset and keeps it as the set filters work on.
    /// Returns how many cards were shown.
    pub fn render_recommendations(
        &self,
        recommendations: &[Recommendation],
        user_skills: &[String],
    ) -> usize {
        if !self.document.exists(RECOMMENDATIONS_LIST) || !self.document.exists(RECOMMENDATIONS_EMPTY)
        {
            return 0;
        }

        let visible = select_visible(recommendations);
        let shown = self.paint_cards(&visible, user_skills);
        if let Ok(mut state) = self.state.lock() {
            state.all_recommendations = visible;
            state.rendered_skills = user_skills.to_vec();
            state.filters = FilterState::default();
        }

        self.document.show(FILTER_PANEL);
        self.document.set_style(RERUN_BUTTON, "display", "inline-block");
        shown
    }

    fn paint_cards(&self, recommendations: &[Recommendation], user_skills: &[String]) -> usize {
        if recommendations.is_empty() {
            self.feedback.rebind(Vec::new());
            self.show_empty_recommendations();
            return 0;
        }

        let seq = self.render_seq.fetch_add(1, Ordering::Relaxed) + 1;
        match recommendation_cards(recommendations, user_skills, seq) {
            Ok(rendered) => {
                self.document.set_html(RECOMMENDATIONS_LIST, &rendered.html);
                self.feedback.rebind(rendered.buttons);
                self.document.show(RECOMMENDATIONS_LIST);
                self.document.hide(RECOMMENDATIONS_EMPTY);
                recommendations.len()
            }
            Err(e) => {
                error!("Failed to render recommendation cards: {}", e);
                0
            }
        }
    }

    /// Narrows the last result set with the filter inputs. Never calls the
    /// backend. Returns how many cards remain.
    pub fn apply_filters(&self) -> usize {
        let filters = FilterState::from_document(self.document.as_ref());
        let (all, skills) = match self.state.lock() {
            Ok(mut state) => {
                state.filters = filters.clone();
                (state.all_recommendations.clone(), state.rendered_skills.clone())
            }
            Err(_) => return 0,
        };
        if all.is_empty() {
            return 0;
        }

        let filtered = filters.apply(&all);
        debug!("Filters kept {} of {} recommendations", filtered.len(), all.len());
        self.paint_cards(&filtered, &skills)
    }

    pub fn clear_filters(&self) -> usize {
        for id in [FILTER_EXPERIENCE, FILTER_WORK_TYPE, FILTER_INDUSTRY, FILTER_LOCATION] {
            self.document.set_value(id, "");
        }
        self.document.set_value(FILTER_MATCH_SCORE, "0");
        self.apply_filters()
    }

    // ── Market panels ───────────────────────────────────────────────────────

    pub fn render_market_panels(&self, demand: &BTreeMap<String, u32>, user_skills: &[String]) {
        if demand.is_empty() {
            debug!("No market skills in analysis response");
            self.document.set_text(SKILL_GAP_LIST, EMPTY_GAP_TEXT);
            self.document.set_html(ROADMAP_LIST, EMPTY_ROADMAP_HTML);
            return;
        }

        let skills = market_skills(demand);
        self.paint_html(SKILL_GAP_LIST, market_gap_html(&skills), "skill gap panel");
        let roadmap = build_roadmap(&skills, user_skills);
        self.paint_html(ROADMAP_LIST, roadmap_html(&roadmap), "roadmap");
    }

    // ── Feedback ────────────────────────────────────────────────────────────

    /// Submits the feedback bound to `button_id`. Each button submits at most
    /// once; later clicks return `false` without a request.
    pub async fn click_feedback(&self, button_id: &str) -> bool {
        let Some(request) = self.feedback.take(button_id) else {
            debug!("Feedback button {} has no binding", button_id);
            return false;
        };
        self.document.set_disabled(button_id, true);

        info!("Feedback '{}' for {}", request.feedback.label(), request.role);
        let ack = match self
            .api
            .post_json::<_, FeedbackAck>(FEEDBACK_PATH, &request)
            .await
        {
            Ok(ack) => ack,
            Err(e) => {
                error!("Feedback submission failed: {}", e);
                self.alerts.show(AlertLevel::Error, FEEDBACK_NOT_SAVED);
                return false;
            }
        };

        match ack.verdict() {
            Ok(message) => {
                self.alerts.show(AlertLevel::Success, message);
                self.load_feedback_history().await;
                true
            }
            Err(message) => {
                warn!("Feedback rejected: {}", message);
                self.alerts.show(AlertLevel::Error, message);
                false
            }
        }
    }

    /// Returns the number of entries shown.
    pub async fn load_feedback_history(&self) -> usize {
        if !self.document.exists(FEEDBACK_LIST) {
            return 0;
        }

        match self
            .api
            .get::<FeedbackHistoryResponse>(FEEDBACK_HISTORY_PATH, &[])
            .await
        {
            Ok(response) if response.history.is_empty() => {
                self.document.set_text(FEEDBACK_LIST, EMPTY_HISTORY);
                0
            }
            Ok(response) => {
                let painted = self.paint_html(
                    FEEDBACK_LIST,
                    feedback_history_html(&response.history),
                    "feedback history",
                );
                if painted {
                    response.history.len()
                } else {
                    0
                }
            }
            Err(e) => {
                warn!("Feedback history unavailable: {}", e);
                self.document.set_text(FEEDBACK_LIST, HISTORY_UNAVAILABLE);
                0
            }
        }
    }

    /// Deletes one history entry. Asking the user to confirm is up to the
    /// caller.
    pub async fn delete_feedback(&self, feedback_id: &str) -> bool {
        let path = format!("{FEEDBACK_HISTORY_PATH}/{feedback_id}");
        match self.api.delete::<Value>(&path).await {
            Ok(_) => {
                info!("Deleted feedback {}", feedback_id);
                self.alerts
                    .show(AlertLevel::Success, "Feedback deleted successfully");
                self.load_feedback_history().await;
                true
            }
            Err(e) => {
                error!("Deleting feedback {} failed: {}", feedback_id, e);
                self.alerts
                    .show(AlertLevel::Error, "Could not delete feedback.");
                false
            }
        }
    }

    // ── Live jobs ───────────────────────────────────────────────────────────

    fn show_live_jobs_empty(&self) {
        self.document.hide(LIVE_JOBS_LIST);
        self.document.show(LIVE_JOBS_EMPTY);
    }

    /// Returns the number of job cards shown.
    pub async fn load_live_jobs(&self, profile: &ProfilePayload, user_skills: &[String]) -> usize {
        self.fetch_live_jobs(profile, user_skills, None).await
    }

    /// With a `token`, results are dropped once a newer analysis has been
    /// issued.
    async fn fetch_live_jobs(
        &self,
        profile: &ProfilePayload,
        user_skills: &[String],
        token: Option<u64>,
    ) -> usize {
        if !self.document.exists(LIVE_JOBS_LIST) || !self.document.exists(LIVE_JOBS_EMPTY) {
            return 0;
        }

        let query = build_live_query(profile, user_skills);
        debug!("Loading live jobs for '{}'", query);
        let params = [
            ("query", query),
            ("location", self.live_jobs_location.clone()),
            ("results", LIVE_JOB_RESULTS.to_string()),
        ];
        let result = self.api.get::<JobsResponse>(LIVE_JOBS_PATH, &params).await;
        if let Some(token) = token {
            if self.generation.load(Ordering::SeqCst) != token {
                debug!("Discarding live jobs for stale analysis #{}", token);
                return 0;
            }
        }
        let jobs = match result {
            Ok(response) => response.into_jobs(),
            Err(e) => {
                warn!("Live jobs unavailable: {}", e);
                self.show_live_jobs_empty();
                return 0;
            }
        };
        if jobs.is_empty() {
            self.show_live_jobs_empty();
            return 0;
        }

        if !self.paint_html(LIVE_JOBS_LIST, live_jobs_html(&jobs), "live jobs") {
            self.show_live_jobs_empty();
            return 0;
        }
        self.document.show(LIVE_JOBS_LIST);
        self.document.hide(LIVE_JOBS_EMPTY);
        let stamp = chrono::Local::now().format("%H:%M");
        self.document
            .set_text(DATA_LAST_UPDATED, &format!("• Last refreshed: {stamp}"));
        jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryDocument};
    use crate::http::mock::{MockResponse, MockTransport};
    use crate::http::Method;
    use crate::shell::alerts::RecordingAlerts;
    use serde_json::json;

    struct Harness {
        transport: Arc<MockTransport>,
        doc: Arc<MemoryDocument>,
        alerts: Arc<RecordingAlerts>,
        controller: DashboardController,
    }

    fn dashboard_doc() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        for id in [
            RECOMMENDATIONS_LIST,
            FILTER_PANEL,
            LIVE_JOBS_LIST,
            UPLOAD_PROGRESS,
            LOADING_OVERLAY,
        ] {
            doc = doc.with(id, Element::new("div").class("d-none"));
        }
        for id in [
            RECOMMENDATIONS_EMPTY,
            LIVE_JOBS_EMPTY,
            SKILL_GAP_LIST,
            ROADMAP_LIST,
            FEEDBACK_LIST,
            DATA_LAST_UPDATED,
            UPLOAD_PROGRESS_BAR,
            DROP_ZONE,
            DROP_ZONE_CONTENT,
            LOADING_MESSAGE,
            PROFILE_STATUS,
            PROFILE_PROGRESS_BAR,
            PROFILE_COMPLETION_TEXT,
            RERUN_BUTTON,
            INPUT_MODES,
        ] {
            doc = doc.with(id, Element::new("div"));
        }
        for id in [
            FILTER_EXPERIENCE,
            FILTER_WORK_TYPE,
            FILTER_INDUSTRY,
            FILTER_MATCH_SCORE,
            FILTER_LOCATION,
        ] {
            doc = doc.with(id, Element::new("input"));
        }
        doc
    }

    fn harness() -> Harness {
        let transport = Arc::new(MockTransport::new());
        let doc = Arc::new(dashboard_doc());
        let alerts = Arc::new(RecordingAlerts::new());
        let controller = DashboardController::new(
            ApiClient::new(transport.clone(), Some("tok".to_string())),
            doc.clone(),
            alerts.clone(),
            "India",
        );
        Harness {
            transport,
            doc,
            alerts,
            controller,
        }
    }

    fn profile(skills: &[&str]) -> ProfilePayload {
        ProfilePayload {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn analysis(titles: &[(&str, f64)]) -> serde_json::Value {
        let recs: Vec<_> = titles
            .iter()
            .map(|(title, score)| json!({"job_title": title, "match_score": score}))
            .collect();
        json!({"recommendations": recs, "market_skills": {"Python": 12, "Docker": 4}})
    }

    #[tokio::test]
    async fn test_manual_profile_rejected_without_request() {
        let h = harness();
        let outcome = h
            .controller
            .handle_manual_profile(&ManualProfileInput::default())
            .await;

        assert_eq!(outcome, AnalysisOutcome::NoProfile);
        assert!(h.alerts.contains(AlertLevel::Warning, EMPTY_MANUAL_PROFILE));
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_manual_profile_is_analysed_and_rendered() {
        let h = harness();
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("Data Analyst", 0.82), ("Chef", 0.1)])),
        );
        h.transport.route(
            Method::Get,
            LIVE_JOBS_PATH,
            MockResponse::json(json!({"live_jobs": [{"job_title": "Python Developer"}]})),
        );
        h.doc.insert("skillsInput", Element::new("input").value("Python, SQL"));
        h.doc.insert("interestArea", Element::new("input").value("Finance"));

        let input = h.controller.read_manual_profile();
        let outcome = h.controller.handle_manual_profile(&input).await;

        assert_eq!(outcome, AnalysisOutcome::Rendered { shown: 1 });
        let list = h.doc.html(RECOMMENDATIONS_LIST).unwrap();
        assert!(list.contains("Data Analyst"));
        assert!(!list.contains("Chef"));
        assert!(!h.doc.has_class(RECOMMENDATIONS_LIST, "d-none"));
        assert!(!h.doc.has_class(FILTER_PANEL, "d-none"));
        assert_eq!(h.doc.style(RERUN_BUTTON, "display").unwrap(), "inline-block");
        assert_eq!(h.doc.text(PROFILE_STATUS).unwrap(), "Recommendations ready");
        assert_eq!(h.doc.text(PROFILE_COMPLETION_TEXT).unwrap(), "40% complete");
        assert!(h.doc.has_class(LOADING_OVERLAY, "d-none"));

        assert!(h.doc.html(SKILL_GAP_LIST).unwrap().contains("Python"));
        assert!(h.doc.html(ROADMAP_LIST).unwrap().contains("Strengthen These"));

        let jobs = h.transport.requests_to(Method::Get, LIVE_JOBS_PATH);
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0]
            .query
            .contains(&("query".to_string(), "Python Finance".to_string())));
        assert!(jobs[0]
            .query
            .contains(&("location".to_string(), "India".to_string())));
        assert!(h.doc.html(LIVE_JOBS_LIST).unwrap().contains("Python Developer"));
        assert!(h
            .doc
            .text(DATA_LAST_UPDATED)
            .unwrap()
            .starts_with("• Last refreshed: "));

        assert_eq!(h.controller.last_profile().unwrap().interests, vec!["Finance"]);
    }

    #[tokio::test]
    async fn test_empty_analysis_shows_empty_state_and_plain_panels() {
        let h = harness();
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(json!({"recommendations": []})),
        );
        h.transport
            .route(Method::Get, LIVE_JOBS_PATH, MockResponse::json(json!({"jobs": []})));

        let outcome = h
            .controller
            .submit_profile_for_analysis(profile(&["Python"]), vec!["Python".into()])
            .await;

        assert_eq!(outcome, AnalysisOutcome::Empty);
        assert!(h.alerts.contains(AlertLevel::Warning, "No recommendations returned"));
        assert!(!h.doc.has_class(RECOMMENDATIONS_EMPTY, "d-none"));
        assert_eq!(h.doc.text(SKILL_GAP_LIST).unwrap(), EMPTY_GAP_TEXT);
        assert_eq!(h.doc.html(ROADMAP_LIST).unwrap(), EMPTY_ROADMAP_HTML);
        assert!(!h.doc.has_class(LIVE_JOBS_EMPTY, "d-none"));
    }

    #[tokio::test]
    async fn test_failed_analysis_alerts_and_hides_overlay() {
        let h = harness();
        h.transport
            .route(Method::Post, ANALYZE_PATH, MockResponse::network_failure());

        let outcome = h
            .controller
            .submit_profile_for_analysis(profile(&["Python"]), vec![])
            .await;

        assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
        assert!(h
            .alerts
            .contains(AlertLevel::Error, "Profile analysis failed. Please try again."));
        assert!(h.doc.has_class(LOADING_OVERLAY, "d-none"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_analysis_is_discarded() {
        let h = harness();
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("Old Role", 0.9)])).delayed(Duration::from_millis(200)),
        );
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("New Role", 0.9)])),
        );

        let (first, second) = tokio::join!(
            h.controller
                .submit_profile_for_analysis(profile(&["Go"]), vec![]),
            h.controller
                .submit_profile_for_analysis(profile(&["Rust"]), vec![]),
        );

        assert_eq!(first, AnalysisOutcome::Stale);
        assert_eq!(second, AnalysisOutcome::Rendered { shown: 1 });
        let list = h.doc.html(RECOMMENDATIONS_LIST).unwrap();
        assert!(list.contains("New Role"));
        assert!(!list.contains("Old Role"));
        assert!(h.doc.has_class(LOADING_OVERLAY, "d-none"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_jobs_of_superseded_analysis_are_dropped() {
        let h = harness();
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("Old Role", 0.9)])),
        );
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("New Role", 0.9)])),
        );
        h.transport.route(
            Method::Get,
            LIVE_JOBS_PATH,
            MockResponse::json(json!({"live_jobs": [{"job_title": "Old Opening"}]}))
                .delayed(Duration::from_millis(300)),
        );
        h.transport.route(
            Method::Get,
            LIVE_JOBS_PATH,
            MockResponse::json(json!({"live_jobs": [{"job_title": "New Opening"}]})),
        );

        let (first, second) = tokio::join!(
            h.controller
                .submit_profile_for_analysis(profile(&["Go"]), vec![]),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                h.controller
                    .submit_profile_for_analysis(profile(&["Rust"]), vec![])
                    .await
            },
        );

        assert_eq!(first, AnalysisOutcome::Rendered { shown: 1 });
        assert_eq!(second, AnalysisOutcome::Rendered { shown: 1 });
        assert_eq!(h.transport.requests_to(Method::Get, LIVE_JOBS_PATH).len(), 2);
        let jobs = h.doc.html(LIVE_JOBS_LIST).unwrap();
        assert!(jobs.contains("New Opening"));
        assert!(!jobs.contains("Old Opening"));
        assert!(h.doc.html(RECOMMENDATIONS_LIST).unwrap().contains("New Role"));
    }

    #[tokio::test]
    async fn test_filters_narrow_without_losing_full_set() {
        let h = harness();
        let recs = vec![
            Recommendation {
                job_title: "Remote Analyst".into(),
                match_score: Some(0.9),
                work_type: Some("Remote".into()),
                ..Default::default()
            },
            Recommendation {
                job_title: "Office Analyst".into(),
                match_score: Some(0.6),
                work_type: Some("Onsite".into()),
                ..Default::default()
            },
        ];
        assert_eq!(h.controller.render_recommendations(&recs, &[]), 2);

        h.doc.set_value(FILTER_WORK_TYPE, "remote");
        assert_eq!(h.controller.apply_filters(), 1);
        let list = h.doc.html(RECOMMENDATIONS_LIST).unwrap();
        assert!(list.contains("Remote Analyst"));
        assert!(!list.contains("Office Analyst"));

        h.doc.set_value(FILTER_MATCH_SCORE, "95");
        assert_eq!(h.controller.apply_filters(), 0);
        assert!(!h.doc.has_class(RECOMMENDATIONS_EMPTY, "d-none"));
        assert_eq!(h.controller.all_recommendations().len(), 2);

        assert_eq!(h.controller.clear_filters(), 2);
        assert_eq!(h.doc.value(FILTER_MATCH_SCORE).unwrap(), "0");
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_button_submits_once_and_refreshes_history() {
        let h = harness();
        h.transport
            .route(Method::Post, FEEDBACK_PATH, MockResponse::json(json!({"success": true})));
        h.transport.route(
            Method::Get,
            FEEDBACK_HISTORY_PATH,
            MockResponse::json(json!({"history": [
                {"id": 3, "role": "Data Analyst", "feedback": "Relevant", "created_at": "2024-03-05"}
            ]})),
        );
        let recs = vec![Recommendation {
            job_title: "Data Analyst".into(),
            match_score: Some(0.7),
            ..Default::default()
        }];
        h.controller.render_recommendations(&recs, &[]);

        assert!(h.controller.click_feedback("fb-1-0-like").await);
        assert!(!h.controller.click_feedback("fb-1-0-like").await);

        let posted = h.transport.requests_to(Method::Post, FEEDBACK_PATH);
        assert_eq!(posted.len(), 1);
        assert!(matches!(
            &posted[0].body,
            crate::http::RequestBody::Json(body)
                if *body == json!({"role": "Data Analyst", "feedback": "Relevant"})
        ));
        assert!(h.alerts.contains(AlertLevel::Success, "Feedback saved."));
        assert!(h
            .doc
            .html(FEEDBACK_LIST)
            .unwrap()
            .contains("data-feedback-id=\"3\""));
    }

    #[tokio::test]
    async fn test_feedback_rejected_by_backend_is_reported() {
        let h = harness();
        h.transport.route(
            Method::Post,
            FEEDBACK_PATH,
            MockResponse::json(json!({"success": false, "message": "Role unknown"})),
        );
        let recs = vec![Recommendation {
            job_title: "Data Analyst".into(),
            match_score: Some(0.7),
            ..Default::default()
        }];
        h.controller.render_recommendations(&recs, &[]);

        assert!(!h.controller.click_feedback("fb-1-0-dislike").await);
        assert!(h.alerts.contains(AlertLevel::Error, "Role unknown"));
        assert!(h.transport.requests_to(Method::Get, FEEDBACK_HISTORY_PATH).is_empty());
    }

    #[tokio::test]
    async fn test_feedback_history_empty_and_unavailable() {
        let h = harness();
        h.transport
            .route(Method::Get, FEEDBACK_HISTORY_PATH, MockResponse::json(json!({"history": []})));
        assert_eq!(h.controller.load_feedback_history().await, 0);
        assert_eq!(h.doc.text(FEEDBACK_LIST).unwrap(), EMPTY_HISTORY);

        let h = harness();
        h.transport.route(
            Method::Get,
            FEEDBACK_HISTORY_PATH,
            MockResponse::status(500, json!({"error": "db down"})),
        );
        assert_eq!(h.controller.load_feedback_history().await, 0);
        assert_eq!(h.doc.text(FEEDBACK_LIST).unwrap(), HISTORY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_delete_feedback() {
        let h = harness();
        h.transport.route(
            Method::Delete,
            "/api/feedback/7",
            MockResponse::json(json!({"success": true})),
        );
        h.transport
            .route(Method::Get, FEEDBACK_HISTORY_PATH, MockResponse::json(json!({"history": []})));

        assert!(h.controller.delete_feedback("7").await);
        assert!(h
            .alerts
            .contains(AlertLevel::Success, "Feedback deleted successfully"));
        assert_eq!(h.transport.requests_to(Method::Get, FEEDBACK_HISTORY_PATH).len(), 1);

        h.transport.route(
            Method::Delete,
            "/api/feedback/8",
            MockResponse::status(404, json!({"error": "not found"})),
        );
        assert!(!h.controller.delete_feedback("8").await);
        assert!(h.alerts.contains(AlertLevel::Error, "Could not delete feedback."));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_before_network() {
        let h = harness();
        let file = ResumeFile::new("cv.pdf", vec![0; 5 * 1024 * 1024 + 1]);

        let outcome = h.controller.handle_file_upload(file).await;

        assert_eq!(
            outcome,
            UploadOutcome::Rejected {
                message: "File size must be less than 5MB".into()
            }
        );
        assert!(h
            .alerts
            .contains(AlertLevel::Error, "File size must be less than 5MB"));
        assert!(h.transport.requests().is_empty());
        assert!(h.doc.has_class(DROP_ZONE, "animate-shake"));
        assert!(!h.controller.is_uploading());
    }

    #[tokio::test]
    async fn test_unsupported_file_type_is_rejected_before_network() {
        let h = harness();
        let file = ResumeFile::new("photo.png", vec![1, 2, 3]);

        let outcome = h.controller.handle_file_upload(file).await;

        let message = "Please upload a PDF, DOC, DOCX, or TXT file";
        assert_eq!(
            outcome,
            UploadOutcome::Rejected {
                message: message.into()
            }
        );
        assert!(h.alerts.contains(AlertLevel::Error, message));
        assert!(h.transport.requests_to(Method::Post, UPLOAD_PATH).is_empty());
        assert!(h.doc.has_class(UPLOAD_PROGRESS, "d-none"));
        assert!(!h.controller.is_uploading());
    }

    #[tokio::test]
    async fn test_upload_builds_profile_and_analyses() {
        let h = harness();
        h.transport.route(
            Method::Post,
            UPLOAD_PATH,
            MockResponse::json(json!({
                "skills": {"technical_skills": ["Python"], "soft_skills": ["Communication"]},
                "resume_text": "Experienced analyst with Python"
            })),
        );
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("Data Analyst", 75.0)])),
        );
        h.transport
            .route(Method::Get, LIVE_JOBS_PATH, MockResponse::json(json!({})));

        let outcome = h
            .controller
            .handle_file_upload(ResumeFile::new("cv.txt", b"Python".to_vec()))
            .await;

        assert_eq!(
            outcome,
            UploadOutcome::Analysed(AnalysisOutcome::Rendered { shown: 1 })
        );
        assert!(h
            .alerts
            .contains(AlertLevel::Success, "Resume uploaded successfully"));
        assert_eq!(h.doc.style(UPLOAD_PROGRESS_BAR, "width").unwrap(), "100%");
        assert!(h.doc.has_class(UPLOAD_PROGRESS, "d-none"));
        assert!(!h.doc.has_class(DROP_ZONE_CONTENT, "d-none"));
        assert_eq!(
            h.controller.last_profile().unwrap().skills,
            vec!["Python", "Communication"]
        );
        let upload = &h.transport.requests_to(Method::Post, UPLOAD_PATH)[0];
        assert!(matches!(
            &upload.body,
            crate::http::RequestBody::Multipart(part) if part.field == "resume"
        ));
    }

    #[tokio::test]
    async fn test_upload_with_mixed_field_shapes_is_analysed() {
        let h = harness();
        h.transport.route(
            Method::Post,
            UPLOAD_PATH,
            MockResponse::json(json!({
                "skills": "Python, SQL",
                "education": {"degree": "B.Sc"},
                "interests": ["Finance", null],
                "experience": "three years"
            })),
        );
        h.transport.route(
            Method::Post,
            ANALYZE_PATH,
            MockResponse::json(analysis(&[("Data Analyst", 0.8)])),
        );
        h.transport
            .route(Method::Get, LIVE_JOBS_PATH, MockResponse::json(json!({})));

        let outcome = h
            .controller
            .handle_file_upload(ResumeFile::new("cv.pdf", vec![1]))
            .await;

        assert_eq!(
            outcome,
            UploadOutcome::Analysed(AnalysisOutcome::Rendered { shown: 1 })
        );
        assert!(!h.alerts.contains(AlertLevel::Error, UPLOAD_FAILED));
        let profile = h.controller.last_profile().unwrap();
        assert_eq!(profile.skills, vec!["Python", "SQL"]);
        assert_eq!(profile.education.degrees, vec!["B.Sc"]);
        assert_eq!(profile.interests, vec!["Finance"]);
        assert!(profile.experience.is_empty());
    }

    #[tokio::test]
    async fn test_upload_error_body_is_reported() {
        let h = harness();
        h.transport.route(
            Method::Post,
            UPLOAD_PATH,
            MockResponse::json(json!({"status": "error", "message": "Unreadable PDF"})),
        );

        let outcome = h
            .controller
            .handle_file_upload(ResumeFile::new("cv.pdf", vec![1]))
            .await;

        assert_eq!(
            outcome,
            UploadOutcome::Failed {
                message: "Unreadable PDF".into()
            }
        );
        assert!(h.alerts.contains(AlertLevel::Error, "Unreadable PDF"));
        assert!(h.transport.requests_to(Method::Post, ANALYZE_PATH).is_empty());
        assert!(h.doc.has_class(UPLOAD_PROGRESS, "d-none"));
    }

    #[tokio::test]
    async fn test_upload_without_usable_data_warns() {
        let h = harness();
        h.transport
            .route(Method::Post, UPLOAD_PATH, MockResponse::json(json!({"status": "ok"})));

        let outcome = h
            .controller
            .handle_file_upload(ResumeFile::new("cv.pdf", vec![1]))
            .await;

        assert_eq!(outcome, UploadOutcome::NoProfile);
        assert!(h.alerts.contains(AlertLevel::Warning, "no usable profile data"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_upload_is_ignored() {
        let h = harness();
        h.transport.route(
            Method::Post,
            UPLOAD_PATH,
            MockResponse::json(json!({})).delayed(Duration::from_millis(100)),
        );

        let (first, second) = tokio::join!(
            h.controller
                .handle_file_upload(ResumeFile::new("a.pdf", vec![1])),
            h.controller
                .handle_file_upload(ResumeFile::new("b.pdf", vec![1])),
        );

        assert_eq!(first, UploadOutcome::NoProfile);
        assert_eq!(second, UploadOutcome::Ignored);
        assert_eq!(h.transport.requests_to(Method::Post, UPLOAD_PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_without_profile_warns() {
        let h = harness();
        let outcome = h.controller.rerun_analysis().await;
        assert_eq!(outcome, AnalysisOutcome::NoProfile);
        assert!(h.alerts.contains(AlertLevel::Warning, NO_PROFILE_YET));
        assert!(h.doc.has_class(INPUT_MODES, "animate-pulse"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_is_removed_after_two_seconds() {
        let h = harness();
        assert!(h.controller.scroll_to_section(INPUT_MODES));
        assert!(h.doc.has_class(INPUT_MODES, "animate-pulse"));
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(!h.doc.has_class(INPUT_MODES, "animate-pulse"));
        assert!(!h.controller.scroll_to_section("missing-section"));
    }
}
