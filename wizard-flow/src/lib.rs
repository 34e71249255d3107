pub mod context;
pub mod error;
pub mod flow;
pub mod runner;
pub mod screen;
pub mod storage;
pub mod wizard;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use flow::{ExecutionResult, ExecutionStatus, Flow, FlowBuilder};
pub use runner::FlowRunner;
pub use screen::{NavAction, Screen, ScreenResult};
pub use storage::{
    FlowStorage, InMemoryFlowStorage, InMemorySessionStorage, Session, SessionStorage,
};
pub use wizard::{Advance, Retreat, Wizard, WizardCursor};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoScreen {
        id: String,
        next: NavAction,
    }

    #[async_trait]
    impl Screen for EchoScreen {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, context: Context) -> Result<ScreenResult> {
            let input: String = context.get("input").await.unwrap_or_default();
            context.set("output", format!("seen: {input}")).await;
            Ok(ScreenResult::new(
                Some(format!("{} done", self.id)),
                self.next.clone(),
            ))
        }
    }

    fn screen(id: &str, next: NavAction) -> Arc<EchoScreen> {
        Arc::new(EchoScreen {
            id: id.to_string(),
            next,
        })
    }

    #[tokio::test]
    async fn single_page_execution() {
        let flow = FlowBuilder::new("test_flow")
            .add_screen(screen("start", NavAction::End))
            .build();

        let mut session = Session::new("start");
        session.context.set("input", "hello").await;

        let result = flow.execute_session(&mut session).await.unwrap();
        assert!(matches!(result.status, ExecutionStatus::Completed));
        assert_eq!(result.response.as_deref(), Some("start done"));

        let output: String = session.context.get("output").await.unwrap();
        assert_eq!(output, "seen: hello");
    }

    #[tokio::test]
    async fn continue_follows_edges_and_records_history() {
        let flow = FlowBuilder::new("test_flow")
            .add_screen(screen("one", NavAction::Continue))
            .add_screen(screen("two", NavAction::Continue))
            .add_edge("one", "two")
            .build();

        let mut session = Session::new("one");

        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "two");
        assert_eq!(session.history, vec!["one".to_string()]);

        // "two" has no outgoing edge: the session stays there.
        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "two");
    }

    #[tokio::test]
    async fn conditional_edge_routes_on_context() {
        let flow = FlowBuilder::new("test_flow")
            .add_screen(screen("gate", NavAction::Continue))
            .add_screen(screen("skip", NavAction::Stay))
            .add_screen(screen("full", NavAction::Stay))
            .add_conditional_edge("gate", "skip", |ctx| {
                ctx.get_sync::<bool>("ready").unwrap_or(false)
            })
            .add_edge("gate", "full")
            .build();

        let mut session = Session::new("gate");
        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "full");

        let mut session = Session::new("gate");
        session.context.set("ready", true).await;
        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "skip");
    }

    #[tokio::test]
    async fn back_pops_history_and_stays_put_when_empty() {
        let flow = FlowBuilder::new("test_flow")
            .add_screen(screen("one", NavAction::Continue))
            .add_screen(screen("two", NavAction::Back))
            .add_edge("one", "two")
            .build();

        let mut session = Session::new("one");
        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "two");

        flow.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "one");
        assert!(session.history.is_empty());

        // From "one" the history is empty; a Back-producing page would stay.
        let back_only = FlowBuilder::new("back_only")
            .add_screen(screen("lone", NavAction::Back))
            .build();
        let mut session = Session::new("lone");
        back_only.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_page, "lone");
    }

    #[tokio::test]
    async fn goto_unknown_page_is_an_error() {
        let flow = FlowBuilder::new("test_flow")
            .add_screen(screen("one", NavAction::GoTo("nowhere".to_string())))
            .build();

        let mut session = Session::new("one");
        let err = flow.execute_session(&mut session).await.unwrap_err();
        assert!(matches!(err, FlowError::PageNotFound(p) if p == "nowhere"));
    }

    #[tokio::test]
    async fn storage_roundtrip() {
        let flow_storage = InMemoryFlowStorage::new();
        let session_storage = InMemorySessionStorage::new();

        let flow = Arc::new(Flow::new("test"));
        flow_storage
            .save("test".to_string(), flow.clone())
            .await
            .unwrap();
        assert!(flow_storage.get("test").await.unwrap().is_some());

        let session = Session::new_from_page("session1".to_string(), "start");
        session_storage.save(session).await.unwrap();
        assert!(session_storage.get("session1").await.unwrap().is_some());

        session_storage.delete("session1").await.unwrap();
        assert!(session_storage.get("session1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn runner_loads_executes_and_saves() {
        let flow = Arc::new(
            FlowBuilder::new("test_flow")
                .add_screen(screen("one", NavAction::Continue))
                .add_screen(screen("two", NavAction::End))
                .add_edge("one", "two")
                .build(),
        );
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let session = Session::new_from_page("s1".to_string(), "one");
        storage.save(session).await.unwrap();

        let runner = FlowRunner::new(flow, storage.clone());
        runner.run("s1").await.unwrap();

        let saved = storage.get("s1").await.unwrap().unwrap();
        assert_eq!(saved.current_page, "two");

        let err = runner.run("missing").await.unwrap_err();
        assert!(matches!(err, FlowError::SessionNotFound(_)));
    }
}
