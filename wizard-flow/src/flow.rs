use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{
    context::Context,
    error::{FlowError, Result},
    screen::{NavAction, Screen, ScreenResult},
    storage::Session,
};

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Directed edge between two pages of the flow
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<EdgeCondition>,
}

/// A flow of named pages. This is the page router: a flat dispatch over page
/// tags plus the forward edges between them. Any page may be jumped to via
/// `NavAction::GoTo` with no prerequisite check.
pub struct Flow {
    pub id: String,
    screens: DashMap<String, Arc<dyn Screen>>,
    edges: Mutex<Vec<Edge>>,
    start_page_id: Mutex<Option<String>>,
}

impl Flow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            screens: DashMap::new(),
            edges: Mutex::new(Vec::new()),
            start_page_id: Mutex::new(None),
        }
    }

    /// Add a screen to the flow. The first screen added becomes the start page.
    pub fn add_screen(&self, screen: Arc<dyn Screen>) -> &Self {
        let page_id = screen.id().to_string();
        let is_first = self.screens.is_empty();
        self.screens.insert(page_id.clone(), screen);

        if is_first {
            *self.start_page_id.lock().unwrap() = Some(page_id);
        }

        self
    }

    pub fn set_start_page(&self, page_id: impl Into<String>) -> &Self {
        let page_id = page_id.into();
        if self.screens.contains_key(&page_id) {
            *self.start_page_id.lock().unwrap() = Some(page_id);
        }
        self
    }

    /// Add an unconditional forward edge between pages
    pub fn add_edge(&self, from: impl Into<String>, to: impl Into<String>) -> &Self {
        self.edges.lock().unwrap().push(Edge {
            from: from.into(),
            to: to.into(),
            condition: None,
        });
        self
    }

    /// Add a conditional forward edge. Conditional edges are evaluated in
    /// insertion order, before any unconditional edge from the same page.
    pub fn add_conditional_edge<F>(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: F,
    ) -> &Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.edges.lock().unwrap().push(Edge {
            from: from.into(),
            to: to.into(),
            condition: Some(Arc::new(condition)),
        });
        self
    }

    /// Run exactly the session's current page once and apply the resulting
    /// navigation to the session (current page, visited-page history).
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        let result = self
            .run_screen(&session.current_page, session.context.clone())
            .await?;

        session.status_message = result.status_message.clone();

        debug!(
            flow = %self.id,
            page = %result.page_id,
            next = ?result.next,
            "page executed"
        );

        match &result.next {
            NavAction::Stay => {
                session.current_page = result.page_id.clone();
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NavAction::Continue => {
                if let Some(next_page) = self.find_next_page(&result.page_id, &session.context) {
                    session.history.push(result.page_id.clone());
                    session.current_page = next_page;
                } else {
                    session.current_page = result.page_id.clone();
                }
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NavAction::ContinueAndRun => {
                if let Some(next_page) = self.find_next_page(&result.page_id, &session.context) {
                    session.history.push(result.page_id.clone());
                    session.current_page = next_page;
                    // Run the next page in the same session so context updates
                    // made here are visible to it.
                    return Box::pin(self.execute_session(session)).await;
                }
                session.current_page = result.page_id.clone();
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NavAction::GoTo(target) => {
                if !self.screens.contains_key(target) {
                    return Err(FlowError::PageNotFound(target.clone()));
                }
                if *target != result.page_id {
                    session.history.push(result.page_id.clone());
                }
                session.current_page = target.clone();
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NavAction::Back => {
                // Pop back to the previously visited page. With nothing to pop
                // we stay put rather than invent a destination.
                match session.history.pop() {
                    Some(previous) => session.current_page = previous,
                    None => session.current_page = result.page_id.clone(),
                }
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NavAction::End => {
                session.current_page = result.page_id.clone();
                Ok(ExecutionResult {
                    response: result.response,
                    status: ExecutionStatus::Completed,
                })
            }
        }
    }

    async fn run_screen(&self, page_id: &str, context: Context) -> Result<ScreenResult> {
        let screen = self
            .screens
            .get(page_id)
            .ok_or_else(|| FlowError::PageNotFound(page_id.to_string()))?;

        let mut result = screen.run(context).await?;
        result.page_id = page_id.to_string();
        Ok(result)
    }

    /// Find the next page along the edges from `current`, honoring edge
    /// conditions.
    pub fn find_next_page(&self, current: &str, context: &Context) -> Option<String> {
        let edges = self.edges.lock().unwrap();

        for edge in edges.iter() {
            if edge.from == current {
                match &edge.condition {
                    Some(condition) if condition(context) => return Some(edge.to.clone()),
                    Some(_) => continue,
                    None => return Some(edge.to.clone()),
                }
            }
        }
        None
    }

    pub fn start_page_id(&self) -> Option<String> {
        self.start_page_id.lock().unwrap().clone()
    }

    pub fn get_screen(&self, page_id: &str) -> Option<Arc<dyn Screen>> {
        self.screens.get(page_id).map(|entry| entry.clone())
    }

    pub fn contains_page(&self, page_id: &str) -> bool {
        self.screens.contains_key(page_id)
    }
}

/// Builder for flows
pub struct FlowBuilder {
    flow: Flow,
}

impl FlowBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            flow: Flow::new(id),
        }
    }

    pub fn add_screen(self, screen: Arc<dyn Screen>) -> Self {
        self.flow.add_screen(screen);
        self
    }

    pub fn add_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.flow.add_edge(from, to);
        self
    }

    pub fn add_conditional_edge<F>(
        self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: F,
    ) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.flow.add_conditional_edge(from, to, condition);
        self
    }

    pub fn set_start_page(self, page_id: impl Into<String>) -> Self {
        self.flow.set_start_page(page_id);
        self
    }

    pub fn build(self) -> Flow {
        self.flow
    }
}

/// Outcome of one `execute_session` call
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone)]
pub enum ExecutionStatus {
    /// Waiting for user input to continue
    WaitingForInput,
    /// Flow completed
    Completed,
    /// Error surfaced by a screen
    Error(String),
}
