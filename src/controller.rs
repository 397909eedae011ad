// src/controller.rs
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::client::{ClassificationBackend, ReportDownload, ReportFormat};
use crate::config::AppConfig;
use crate::errors::{ClientError, ErrorKind, Result};
use crate::models::UploadedFile;
use crate::notify::{Notification, Severity};
use crate::state::{ClientState, SubmissionKind};
use crate::tasks::{SubmissionSlots, Ticket};
use crate::taxonomy::TaxonomyLevel;
use crate::validation::{validate_question, validate_upload};
use crate::view::{self, Element};

pub const CLASSIFY_OK: &str = "Question classified successfully!";
pub const CLASSIFY_TRANSPORT: &str = "An error occurred while classifying the question";
pub const UPLOAD_OK: &str = "Questions processed successfully! You can now download the PDF report.";
pub const UPLOAD_TRANSPORT: &str = "An error occurred while processing the file";

/// Where an upload came from. All of them end up in [`Controller::submit_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    Browse,
    Drop,
    Input,
}

impl UploadSource {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "browse" => UploadSource::Browse,
            "drop" => UploadSource::Drop,
            _ => UploadSource::Input,
        }
    }
}

/// Re-rendered panels pushed to websocket subscribers after a state change.
#[derive(Debug, Clone, Serialize)]
pub struct ViewUpdate {
    pub reason: &'static str,
    pub panels: Vec<PanelHtml>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelHtml {
    pub id: String,
    pub html: String,
}

/// A spawned submission.
pub struct Submission {
    pub ticket: Ticket,
    pub handle: JoinHandle<()>,
}

/// Clears the loading indicator if the task is dropped before it finishes.
struct LoadingGuard {
    state: Arc<RwLock<ClientState>>,
    kind: SubmissionKind,
    generation: u64,
    armed: bool,
}

impl LoadingGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let state = self.state.clone();
        let (kind, generation) = (self.kind, self.generation);
        if let Ok(mut guard) = state.try_write() {
            guard.finish_loading(kind, generation);
        } else if let Ok(rt) = tokio::runtime::Handle::try_current() {
            rt.spawn(async move {
                state.write().await.finish_loading(kind, generation);
            });
        }
    }
}

/// Owns the client state and drives both submission flows against the backend.
#[derive(Clone)]
pub struct Controller {
    state: Arc<RwLock<ClientState>>,
    backend: Arc<dyn ClassificationBackend>,
    slots: Arc<SubmissionSlots>,
    config: Arc<AppConfig>,
    updates: broadcast::Sender<ViewUpdate>,
}

impl Controller {
    pub fn new(config: Arc<AppConfig>, backend: Arc<dyn ClassificationBackend>) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            state: Arc::new(RwLock::new(ClientState::default())),
            backend,
            slots: Arc::new(SubmissionSlots::new()),
            config,
            updates,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.updates.subscribe()
    }

    /// Logs in to the backend when credentials are configured. A failed
    /// login is logged, not fatal.
    pub async fn connect(&self) {
        let Some(credentials) = &self.config.backend.credentials else {
            log::info!("No backend credentials configured, skipping login");
            return;
        };
        if let Err(e) = self.backend.login(credentials).await {
            log::error!("Backend login failed: {}", e);
        }
    }

    fn notification(&self, message: impl Into<String>, severity: Severity) -> Notification {
        Notification::new(message, severity, self.config.notification_ttl())
    }

    async fn notify_error(&self, err: &ClientError, transport_fallback: &str) {
        if err.kind() == ErrorKind::Transport {
            log::error!("Submission failed: {}", err);
        }
        let message = err.user_message(transport_fallback);
        self.state.write().await.notify(self.notification(message, Severity::Error));
    }

    pub async fn snapshot(&self) -> ClientState {
        let mut state = self.state.write().await;
        state.prune(Utc::now());
        state.clone()
    }

    pub async fn render_page(&self) -> Element {
        let state = self.snapshot().await;
        view::render_page(&state, &self.config.upload.allowed_extensions, Utc::now())
    }

    fn publish(&self, reason: &'static str, state: &ClientState) {
        let now = Utc::now();
        let mut panels = vec![
            PanelHtml {
                id: "resultSection".to_string(),
                html: view::render_classification(state.classification.as_ref(), state.classification_visible)
                    .to_html(),
            },
            PanelHtml {
                id: "fileResultSection".to_string(),
                html: view::render_upload_result(state.upload.as_ref(), state.upload_visible, state.download_ready)
                    .to_html(),
            },
        ];
        panels.push(PanelHtml { id: "loadingOverlay".to_string(), html: view::render_loading(state).to_html() });
        if let Some(n) = state.active_notification(now) {
            panels.push(PanelHtml { id: "notification".to_string(), html: view::render_notification(n).to_html() });
        }
        // No subscribers is fine.
        let _ = self.updates.send(ViewUpdate { reason, panels });
    }

    pub async fn switch_tab(&self, key: &str) {
        let mut state = self.state.write().await;
        state.switch_tab(key);
        self.publish("tab", &state);
    }

    /// Puts an example prompt for `level` into the question box.
    pub async fn fill_example(&self, level: &str) -> Result<()> {
        let level = TaxonomyLevel::lookup(level)
            .ok_or_else(|| ClientError::Validation(format!("Unknown taxonomy level '{}'", level)))?;
        let mut state = self.state.write().await;
        state.question_draft = format!("Example {} question...", level.name().to_lowercase());
        Ok(())
    }

    /// Validates and sends a single question. Validation failures notify
    /// the user and never reach the backend.
    pub async fn submit_question(&self, raw: &str) -> Result<Submission> {
        let question = match validate_question(raw) {
            Ok(q) => q,
            Err(e) => {
                self.notify_error(&e, CLASSIFY_TRANSPORT).await;
                return Err(e);
            }
        };

        let ticket = self.slots.begin(SubmissionKind::Classify);
        {
            let mut state = self.state.write().await;
            state.question_draft = question.clone();
            state.begin_loading(ticket.kind, ticket.generation);
            self.publish("loading", &state);
        }
        log::info!("Classify submission {} (#{})", ticket.id, ticket.generation);

        let this = self.clone();
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move { this.run_classify(task_ticket, question).await });
        self.slots.attach(&ticket, handle.abort_handle());
        Ok(Submission { ticket, handle })
    }

    async fn run_classify(&self, ticket: Ticket, question: String) {
        let guard = self.loading_guard(&ticket);
        let outcome = self.backend.classify(&question).await;

        {
            let mut state = self.state.write().await;
            if !self.slots.is_current(&ticket) {
                log::debug!("Dropping stale classify result {}", ticket.id);
                guard.disarm();
                return;
            }
            state.finish_loading(ticket.kind, ticket.generation);
            match outcome {
                Ok(result) => {
                    state.show_classification(result);
                    state.notify(self.notification(CLASSIFY_OK, Severity::Success));
                }
                Err(e) => {
                    if e.kind() == ErrorKind::Transport {
                        log::error!("Classify {} failed: {}", ticket.id, e);
                    }
                    state.clear_classification();
                    state.notify(self.notification(e.user_message(CLASSIFY_TRANSPORT), Severity::Error));
                }
            }
            self.publish("classify", &state);
        }
        guard.disarm();
        self.slots.complete(&ticket);
    }

    /// Validates and uploads a spreadsheet, whichever surface it came from.
    pub async fn submit_file(&self, file: UploadedFile, source: UploadSource) -> Result<Submission> {
        log::info!("Upload of '{}' ({} bytes) via {:?}", file.name, file.size(), source);
        if let Err(e) = validate_upload(&file, &self.config.upload) {
            self.notify_error(&e, UPLOAD_TRANSPORT).await;
            return Err(e);
        }

        let ticket = self.slots.begin(SubmissionKind::Upload);
        {
            let mut state = self.state.write().await;
            state.begin_loading(ticket.kind, ticket.generation);
            self.publish("loading", &state);
        }
        log::info!("Upload submission {} (#{})", ticket.id, ticket.generation);

        let this = self.clone();
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move { this.run_upload(task_ticket, file).await });
        self.slots.attach(&ticket, handle.abort_handle());
        Ok(Submission { ticket, handle })
    }

    async fn run_upload(&self, ticket: Ticket, file: UploadedFile) {
        let guard = self.loading_guard(&ticket);
        let outcome = self.backend.upload_report(&file).await;

        {
            let mut state = self.state.write().await;
            if !self.slots.is_current(&ticket) {
                log::debug!("Dropping stale upload result {}", ticket.id);
                guard.disarm();
                return;
            }
            state.finish_loading(ticket.kind, ticket.generation);
            match outcome {
                Ok(analysis) => {
                    log::info!(
                        "Upload {} analysed {} questions",
                        ticket.id,
                        analysis.total_questions
                    );
                    state.show_upload(file.name, analysis);
                    state.notify(self.notification(UPLOAD_OK, Severity::Success));
                }
                Err(e) => {
                    if e.kind() == ErrorKind::Transport {
                        log::error!("Upload {} failed: {}", ticket.id, e);
                    }
                    state.clear_upload();
                    state.notify(self.notification(e.user_message(UPLOAD_TRANSPORT), Severity::Error));
                }
            }
            self.publish("upload", &state);
        }
        guard.disarm();
        self.slots.complete(&ticket);
    }

    fn loading_guard(&self, ticket: &Ticket) -> LoadingGuard {
        LoadingGuard {
            state: self.state.clone(),
            kind: ticket.kind,
            generation: ticket.generation,
            armed: true,
        }
    }

    pub async fn download(&self, format: ReportFormat) -> Result<ReportDownload> {
        self.backend.download_report(format).await
    }
}
