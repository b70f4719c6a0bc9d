//! Dashboard page: profile input, recommendations and the panels around them.

pub mod controller;
pub mod feedback;
pub mod jobs;
pub mod market;
pub mod profile;
pub mod recommendations;
pub mod render;
pub mod upload;

pub use controller::{AnalysisOutcome, DashboardController, UploadOutcome};
pub use profile::{build_manual_profile, build_profile_from_resume, ManualProfileInput, ProfilePayload};
pub use recommendations::{normalize_score, select_visible, FilterState, Recommendation, SkillBreakdown};
pub use upload::{validate_file, ResumeFile};
