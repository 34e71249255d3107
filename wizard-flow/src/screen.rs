use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result};

/// Result of running one screen for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Id of the screen that produced this result (filled in by the flow).
    #[serde(default)]
    pub page_id: String,
    /// Text to show the user.
    pub response: Option<String>,
    /// Where the flow should go next.
    pub next: NavAction,
    /// Short progress note kept on the session for observability.
    pub status_message: Option<String>,
}

impl ScreenResult {
    pub fn new(response: Option<String>, next: NavAction) -> Self {
        Self {
            page_id: String::new(),
            response,
            next,
            status_message: None,
        }
    }

    pub fn new_with_status(
        response: Option<String>,
        next: NavAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            page_id: String::new(),
            response,
            next,
            status_message,
        }
    }
}

/// What should happen after a screen handles a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavAction {
    /// Stay on this page and wait for more input.
    Stay,
    /// Move to the next page along the flow's edges, then wait for input.
    Continue,
    /// Move to the next page and run it immediately with the same context.
    ContinueAndRun,
    /// Jump to a named page. Unguarded: no prerequisite check is made.
    GoTo(String),
    /// Return to the previously visited page.
    Back,
    /// The flow is complete.
    End,
}

/// One named page of the flow.
#[async_trait]
pub trait Screen: Send + Sync {
    /// Stable page tag used for routing and session bookkeeping.
    fn id(&self) -> &str;

    /// Handle one request on this page.
    async fn run(&self, context: Context) -> Result<ScreenResult>;
}
