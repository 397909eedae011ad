// src/state.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ClassificationResult, UploadAnalysis};
use crate::notify::Notification;

/// Tab keys and the panel id each one activates.
pub const TABS: [(&str, &str); 2] = [("single", "Single Question"), ("file", "Upload Spreadsheet")];

pub fn panel_id(key: &str) -> String {
    format!("{}-tab", key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Classify,
    Upload,
}

impl SubmissionKind {
    pub fn loading_text(self) -> &'static str {
        match self {
            SubmissionKind::Classify => "Analyzing your question...",
            SubmissionKind::Upload => "Processing your questions file...",
        }
    }
}

/// Which tab button and which panel are active. They usually agree, except
/// when a button names a panel that does not exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabState {
    pub active_button: String,
    pub active_panel: Option<String>,
    panels: Vec<String>,
}

impl Default for TabState {
    fn default() -> Self {
        let panels: Vec<String> = TABS.iter().map(|(key, _)| panel_id(key)).collect();
        Self {
            active_button: TABS[0].0.to_string(),
            active_panel: panels.first().cloned(),
            panels,
        }
    }
}

impl TabState {
    pub fn with_panels(panels: Vec<String>, initial: &str) -> Self {
        let mut tabs = Self { active_button: String::new(), active_panel: None, panels };
        tabs.activate(initial);
        tabs
    }

    fn activate(&mut self, key: &str) {
        let target = panel_id(key);
        self.active_button = key.to_string();
        self.active_panel = self.panels.iter().find(|p| **p == target).cloned();
    }

    pub fn is_button_active(&self, key: &str) -> bool {
        self.active_button == key
    }

    pub fn is_panel_active(&self, panel: &str) -> bool {
        self.active_panel.as_deref() == Some(panel)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadView {
    pub filename: String,
    pub analysis: UploadAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loading {
    pub kind: SubmissionKind,
    pub generation: u64,
    pub text: String,
}

/// Everything the page shows. Rendering is a pure function of this value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientState {
    pub tabs: TabState,
    pub classification: Option<ClassificationResult>,
    pub classification_visible: bool,
    pub upload: Option<UploadView>,
    pub upload_visible: bool,
    pub download_ready: bool,
    pub loading: Vec<Loading>,
    pub notification: Option<Notification>,
    pub question_draft: String,
}

impl ClientState {
    /// Activates the tab named `key` and hides both result panels.
    pub fn switch_tab(&mut self, key: &str) {
        self.tabs.activate(key);
        self.classification_visible = false;
        self.upload_visible = false;
    }

    pub fn begin_loading(&mut self, kind: SubmissionKind, generation: u64) {
        self.loading.retain(|l| l.kind != kind);
        self.loading.push(Loading { kind, generation, text: kind.loading_text().to_string() });
    }

    /// Clears the indicator only if it still belongs to `generation`.
    pub fn finish_loading(&mut self, kind: SubmissionKind, generation: u64) {
        self.loading.retain(|l| !(l.kind == kind && l.generation == generation));
    }

    pub fn is_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    /// Text of the most recently started submission.
    pub fn loading_text(&self) -> Option<&str> {
        self.loading.last().map(|l| l.text.as_str())
    }

    pub fn show_classification(&mut self, result: ClassificationResult) {
        self.classification = Some(result);
        self.classification_visible = true;
    }

    pub fn clear_classification(&mut self) {
        self.classification = None;
        self.classification_visible = false;
    }

    pub fn show_upload(&mut self, filename: String, analysis: UploadAnalysis) {
        self.upload = Some(UploadView { filename, analysis });
        self.download_ready = true;
        self.upload_visible = true;
    }

    pub fn clear_upload(&mut self) {
        self.upload = None;
        self.download_ready = false;
        self.upload_visible = false;
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Drops the notification once it has expired.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
        }
    }

    /// Visible notification at `now`, if any.
    pub fn active_notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }
}
