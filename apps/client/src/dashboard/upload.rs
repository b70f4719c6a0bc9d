//! Resume file checks and the cosmetic upload progress bar.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dom::Document;
use crate::errors::ClientError;
use crate::http::FilePart;

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];
pub const UPLOAD_FIELD: &str = "resume";

const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_STEP_MAX: f64 = 20.0;
const PROGRESS_CEILING: f64 = 90.0;

/// Text after the last dot, lowercased. A name without a dot is its own
/// extension.
fn extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or("").to_ascii_lowercase()
}

/// Size and type checks, run before any network call.
pub fn validate_file(name: &str, size: u64) -> Result<(), ClientError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(ClientError::FileRejected(
            "File size must be less than 5MB".to_string(),
        ));
    }
    if !ALLOWED_EXTENSIONS.contains(&extension(name).as_str()) {
        return Err(ClientError::FileRejected(
            "Please upload a PDF, DOC, DOCX, or TXT file".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Runs [`validate_file`] against the file's metadata before reading it.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let size = tokio::fs::metadata(path).await?.len();
        validate_file(&name, size)?;

        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn content_type(&self) -> &'static str {
        match extension(&self.name).as_str() {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    pub fn to_part(&self) -> FilePart {
        FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: self.name.clone(),
            content_type: self.content_type().to_string(),
            bytes: self.bytes.clone(),
        }
    }
}

/// Synthetic progress: a random step every tick, capped below 100 until the
/// upload finishes. Not tied to bytes sent.
pub struct ProgressAnimator {
    progress: Arc<Mutex<f64>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressAnimator {
    pub fn start(document: Arc<dyn Document>, bar: &str) -> Self {
        Self::start_with_rng(document, bar, StdRng::from_entropy())
    }

    pub fn start_with_rng(document: Arc<dyn Document>, bar: &str, mut rng: StdRng) -> Self {
        let progress = Arc::new(Mutex::new(0.0));
        document.set_style(bar, "width", "0%");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return Self {
                progress,
                task: None,
            };
        };

        let shared = progress.clone();
        let bar = bar.to_string();
        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(PROGRESS_TICK);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let step = rng.gen_range(0.0..PROGRESS_STEP_MAX);
                let value = {
                    let Ok(mut current) = shared.lock() else {
                        return;
                    };
                    *current = (*current + step).min(PROGRESS_CEILING);
                    *current
                };
                document.set_style(&bar, "width", &format!("{value}%"));
                if value >= PROGRESS_CEILING {
                    debug!("Upload progress stalled at {}%", PROGRESS_CEILING);
                    break;
                }
            }
        });

        Self {
            progress,
            task: Some(task),
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress.lock().map(|p| *p).unwrap_or(0.0)
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
