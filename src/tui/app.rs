use anyhow::Result;
use async_channel::{Receiver, Sender};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ImageEditor;
use crate::config::Config;
use crate::core::{data_url, DataUrl, EditResult, Session, VintageError};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Main view with both image panes
    Main,
    /// Typing the path of a photo to open
    Input,
}

/// Outcome of work running off the UI loop
#[derive(Debug)]
pub enum TaskOutcome {
    FileLoaded(Result<DataUrl, VintageError>),
    EditFinished(Result<EditResult, VintageError>),
}

/// TUI application state
pub struct App {
    /// Current mode
    pub mode: AppMode,

    /// Configuration
    pub config: Config,

    /// The editing session shown in the panes
    pub session: Session,

    /// Current path input
    pub input: String,

    /// Cursor position in input
    pub cursor_pos: usize,

    /// Status message
    pub status_message: Option<String>,

    /// Path of the last saved edit
    pub saved_path: Option<PathBuf>,

    /// Whether to quit
    pub should_quit: bool,

    editor: Arc<dyn ImageEditor>,
    tx: Sender<TaskOutcome>,
    rx: Receiver<TaskOutcome>,
}

impl App {
    pub fn new(config: Config, editor: Arc<dyn ImageEditor>) -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self {
            mode: AppMode::Main,
            config,
            session: Session::new(),
            input: String::new(),
            cursor_pos: 0,
            status_message: None,
            saved_path: None,
            should_quit: false,
            editor,
            tx,
            rx,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Start reading a photo in the background
    pub fn start_select(&mut self, path: PathBuf) {
        if let Err(e) = self.session.begin_select(&path) {
            self.set_status(e.to_string());
            return;
        }
        self.saved_path = None;
        self.set_status(format!("Loading {}...", path.display()));

        self.spawn_reporting(
            async move { data_url::encode_file(&path).await },
            TaskOutcome::FileLoaded,
        );
    }

    /// Start the vintage edit in the background
    pub fn start_edit(&mut self) {
        let request = match self.session.begin_edit() {
            Ok(request) => request,
            Err(VintageError::Busy) => {
                self.set_status(VintageError::Busy.to_string());
                return;
            }
            // Already recorded in the session
            Err(_) => return,
        };
        self.saved_path = None;
        self.set_status("Applying filter...");

        let editor = Arc::clone(&self.editor);
        self.spawn_reporting(
            async move { editor.submit_edit(&request).await },
            TaskOutcome::EditFinished,
        );
    }

    /// Run `work` on its own task and always report back, even if it panics,
    /// so the session never stays busy
    fn spawn_reporting<T, F>(&self, work: F, outcome: fn(Result<T, VintageError>) -> TaskOutcome)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, VintageError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(work).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Background task failed: {}", e);
                    Err(VintageError::TaskFailed(e.to_string()))
                }
            };
            if tx.send(outcome(result)).await.is_err() {
                tracing::debug!("UI closed before background task finished");
            }
        });
    }

    /// Commit a finished background task to the session
    pub fn apply(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::FileLoaded(result) => {
                self.session.finish_select(result);
                if self.session.error().is_none() {
                    self.set_status("Photo loaded. Press e to create the vintage look");
                } else {
                    self.status_message = None;
                }
            }
            TaskOutcome::EditFinished(result) => {
                self.session.finish_edit(result);
                if self.session.edited_image().is_some() {
                    self.set_status("Vintage look ready. Press s to save");
                } else {
                    self.status_message = None;
                }
            }
        }
    }

    /// Apply every finished task without waiting
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Wait for the next finished task
    #[cfg(test)]
    pub async fn next_outcome(&mut self) -> Option<TaskOutcome> {
        self.rx.recv().await.ok()
    }

    /// Save the edited image to the output directory
    pub async fn save_edited(&mut self) -> Result<()> {
        let Some(edited) = self.session.edited_image().cloned() else {
            self.set_status("Nothing to save yet");
            return Ok(());
        };

        let path = PathBuf::from(&self.config.output.directory).join(self.session.download_name());
        data_url::save(&edited, &path).await?;

        self.set_status(format!("Saved to {}", path.display()));
        self.saved_path = Some(path);
        Ok(())
    }
}
