//! The hello page.
//!
//! Mounting starts one fetch; the resolved message is stored in view state
//! and shows up in the next render. Unmounting cancels a fetch still in
//! flight so disposed state is never written.

use crate::client::MessageSource;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Progress of the page's single fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    /// Not mounted yet.
    #[default]
    Idle,
    /// Fetch in flight.
    Pending,
    /// Message received.
    Loaded,
    /// Fetch failed; the message stays empty.
    Failed,
    /// Unmounted before the fetch finished.
    Cancelled,
}

#[derive(Debug, Default)]
struct ViewState {
    message: String,
    status: FetchStatus,
}

/// Page that displays the backend's message.
pub struct HelloPage<S: MessageSource> {
    source: Arc<S>,
    view: Arc<RwLock<ViewState>>,
    task: Option<JoinHandle<()>>,
    mounted: bool,
}

impl<S: MessageSource> HelloPage<S> {
    /// Create an unmounted page.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            view: Arc::new(RwLock::new(ViewState::default())),
            task: None,
            mounted: false,
        }
    }

    /// Mount the page, starting its one fetch. Later calls do nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.view.write().status = FetchStatus::Pending;

        let source = Arc::clone(&self.source);
        let view = Arc::clone(&self.view);

        self.task = Some(tokio::spawn(async move {
            let result = source.fetch_message().await;

            let mut view = view.write();
            if view.status != FetchStatus::Pending {
                debug!(status = ?view.status, "page no longer waiting, dropping fetch result");
                return;
            }
            match result {
                Ok(message) => {
                    view.message = message;
                    view.status = FetchStatus::Loaded;
                }
                Err(e) => {
                    error!(error = %e, "Error fetching data");
                    view.status = FetchStatus::Failed;
                }
            }
        }));
    }

    /// Wait for the fetch to finish, if one is running.
    pub async fn settle(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!(error = %e, "fetch task failed");
                }
            }
        }
    }

    /// Unmount the page, cancelling a fetch still in flight.
    pub fn unmount(&mut self) {
        {
            let mut view = self.view.write();
            if view.status == FetchStatus::Pending {
                view.status = FetchStatus::Cancelled;
            }
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Current message; empty until a fetch succeeds.
    pub fn message(&self) -> String {
        self.view.read().message.clone()
    }

    /// Current fetch status.
    pub fn status(&self) -> FetchStatus {
        self.view.read().status
    }

    /// Render the page as HTML.
    pub fn render(&self) -> String {
        let view = self.view.read();
        format!(
            concat!(
                r#"<div style="text-align: center; margin-top: 50px">"#,
                "<h1>Hello World!</h1>",
                "<p>Response from Backend: {}</p>",
                "</div>"
            ),
            escape_html(&view.message)
        )
    }
}

impl<S: MessageSource> Drop for HelloPage<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
