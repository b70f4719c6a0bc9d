mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_client::auth::{calculate_password_strength, password_requirements};
use career_client::dashboard::profile::split_list;
use career_client::dashboard::{DashboardController, ManualProfileInput, ProfilePayload, ResumeFile};
use career_client::dom::{Document, Element, MemoryDocument};
use career_client::http::{ApiClient, ReqwestTransport};
use career_client::shell::RecordingAlerts;
use career_client::Config;

use crate::cli::{Cli, Commands, FeedbackAction};

/// Panels printed after a command, as (element id, heading).
const PANELS: [(&str, &str); 6] = [
    ("profileCompletionText", "Profile"),
    ("recommendationsList", "Recommendations"),
    ("skillGapList", "Market skill gaps"),
    ("roadmapList", "Learning roadmap"),
    ("liveJobsList", "Live jobs"),
    ("feedbackList", "Feedback history"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let level = if cli.verbose { "debug" } else { config.rust_log.as_str() };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("career_client={level}"))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("career-client v{} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    if let Commands::Strength { password } = &cli.command {
        print_strength(password);
        return Ok(());
    }

    let transport = ReqwestTransport::new(
        config.api_url.clone(),
        config.request_timeout_secs.map(Duration::from_secs),
    )
    .context("Failed to build HTTP client")?;
    let api = ApiClient::new(Arc::new(transport), config.csrf_token.clone());
    let document = Arc::new(dashboard_page());
    let alerts = Arc::new(RecordingAlerts::new());
    let dashboard = DashboardController::new(
        api,
        document.clone(),
        alerts.clone(),
        config.live_jobs_location.clone(),
    );

    match cli.command {
        Commands::Upload { path } => {
            let file = ResumeFile::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let outcome = dashboard.handle_file_upload(file).await;
            info!("Upload finished: {:?}", outcome);
        }
        Commands::Analyze {
            skills,
            interests,
            education,
            years,
        } => {
            let input = ManualProfileInput {
                education_level: education,
                years_experience: years,
                skills,
                interests,
            };
            let outcome = dashboard.handle_manual_profile(&input).await;
            info!("Analysis finished: {:?}", outcome);
        }
        Commands::Feedback { action } => match action {
            FeedbackAction::List => {
                dashboard.load_feedback_history().await;
            }
            FeedbackAction::Delete { id } => {
                dashboard.delete_feedback(&id).await;
            }
        },
        Commands::Jobs { skills, interests } => {
            let profile = ProfilePayload {
                skills: split_list(&skills),
                interests: split_list(&interests),
                ..Default::default()
            };
            let shown = dashboard.load_live_jobs(&profile, &profile.skills).await;
            info!("{} live jobs", shown);
        }
        Commands::Strength { .. } => {}
    }

    for (level, message) in alerts.take() {
        println!("[{:?}] {}", level, message);
    }
    print_panels(document.as_ref());
    Ok(())
}

/// The dashboard elements the controller writes to.
fn dashboard_page() -> MemoryDocument {
    let page = MemoryDocument::new();
    for id in [
        "recommendationsList",
        "recommendationsEmpty",
        "filterPanel",
        "rerunAnalysisBtn",
        "skillGapList",
        "roadmapList",
        "feedbackList",
        "liveJobsList",
        "liveJobsEmpty",
        "dataLastUpdated",
        "uploadProgress",
        "uploadProgressBar",
        "fileDropZone",
        "dropZoneContent",
        "loadingOverlay",
        "loadingOverlayMessage",
        "profileStatus",
        "profileProgressBar",
        "profileCompletionText",
    ] {
        page.insert(id, Element::new("div"));
    }
    page
}

fn print_panels(document: &dyn Document) {
    for (id, heading) in PANELS {
        let content = document
            .html(id)
            .filter(|c| !c.trim().is_empty())
            .or_else(|| document.text(id))
            .unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        if document.has_class(id, "d-none") {
            continue;
        }
        println!("\n== {heading} ==\n{}", content.trim());
    }
}

fn print_strength(password: &str) {
    let strength = calculate_password_strength(password);
    println!("{} ({}/100)", strength.label, strength.score);
    for requirement in password_requirements(password) {
        let mark = if requirement.met { "x" } else { " " };
        println!("[{mark}] {}", requirement.id);
    }
}
