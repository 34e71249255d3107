use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{Context, error::Result, flow::Flow};

/// One user's traversal of a flow. Everything lives in memory; deleting the
/// session discards all of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub flow_id: String,
    pub current_page: String,
    /// Pages visited before the current one, for back navigation.
    #[serde(default)]
    pub history: Vec<String>,
    /// Last progress note produced by a screen.
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(skip)]
    pub context: Context,
}

impl Session {
    pub fn new_from_page(sid: String, page: &str) -> Self {
        Self {
            id: sid,
            flow_id: "default".to_string(),
            current_page: page.to_string(),
            history: Vec::new(),
            status_message: None,
            context: Context::new(),
        }
    }

    pub fn new(page: &str) -> Self {
        Self::new_from_page(Uuid::new_v4().to_string(), page)
    }
}

/// Trait for storing and retrieving flows
#[async_trait]
pub trait FlowStorage: Send + Sync {
    async fn save(&self, id: String, flow: Arc<Flow>) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Arc<Flow>>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of FlowStorage
#[derive(Default)]
pub struct InMemoryFlowStorage {
    flows: Arc<DashMap<String, Arc<Flow>>>,
}

impl InMemoryFlowStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlowStorage for InMemoryFlowStorage {
    async fn save(&self, id: String, flow: Arc<Flow>) -> Result<()> {
        self.flows.insert(id, flow);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Arc<Flow>>> {
        Ok(self.flows.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.flows.remove(id);
        Ok(())
    }
}

/// In-memory implementation of SessionStorage
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
