mod model;
mod screens;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use wizard_flow::{
    Flow, FlowBuilder, FlowStorage, InMemoryFlowStorage, InMemorySessionStorage, Session,
    SessionStorage,
};

use crate::model::{DocumentChecklist, EntryRequirements, Traveler, progress_percent};
use crate::screens::{
    ArrivalTaxScreen, BorderControlScreen, CustomsDeclarationScreen, DestinationScreen,
    DocumentUploadScreen, HealthPassScreen, InformationConfirmationScreen, InsuranceScreen,
    PaymentScreen, QrCodeScreen, TravelerSetupScreen, VisaApplicationScreen, pages, session_keys,
};

#[derive(Clone)]
struct AppState {
    flow_storage: Arc<dyn FlowStorage>,
    session_storage: Arc<dyn SessionStorage>,
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    session_id: Option<String>,
    content: String,
}

#[derive(Debug, Serialize)]
struct ExecuteResponse {
    session_id: String,
    response: Option<String>,
    status: String,
}

#[derive(Debug, Serialize)]
struct TravelerProgress {
    id: Uuid,
    name: String,
    is_minor: bool,
    documents: DocumentChecklist,
    entry_requirements: EntryRequirements,
    completed_flags: usize,
}

#[derive(Debug, Serialize)]
struct ProgressResponse {
    session_id: String,
    percent: u8,
    travelers: Vec<TravelerProgress>,
}

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prearrival_service=debug,wizard_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let flow_storage: Arc<dyn FlowStorage> = Arc::new(InMemoryFlowStorage::new());
    // All session state is in memory; logout discards it and nothing survives
    // a restart.
    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());

    flow_storage
        .save("default".to_string(), Arc::new(build_flow()))
        .await
        .expect("failed to save default flow");

    let app_state = AppState {
        flow_storage,
        session_storage,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/execute", post(execute_flow))
        .route("/session/{id}", get(get_session).delete(logout))
        .route("/session/{id}/progress", get(get_progress))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;

    info!("Server running on http://0.0.0.0:3000");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn execute_flow(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, StatusCode> {
    let session_id_provided = request.session_id.is_some();
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if session_id_provided && Uuid::parse_str(&session_id).is_err() {
        error!(session_id = %session_id, "Invalid session ID format");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            // A provided but unknown id is an error; sessions are only created
            // when the client asks for a fresh one.
            if session_id_provided {
                error!(session_id = %session_id, "Session not found");
                return Err(StatusCode::NOT_FOUND);
            }
            info!(session_id = %session_id, "Creating new session");
            Session::new_from_page(session_id.clone(), pages::DESTINATION)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    session
        .context
        .set(session_keys::USER_INPUT, request.content)
        .await;

    let flow = get_default_flow(state.flow_storage.clone()).await?;

    let result = match flow.execute_session(&mut session).await {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to execute flow");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    if let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "Failed to save session");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(session_id = %session_id, status = ?result.status, "Request completed");

    Ok(Json(ExecuteResponse {
        session_id,
        response: result.response,
        status: format!("{:?}", result.status),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, StatusCode> {
    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ProgressResponse>, StatusCode> {
    let session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let travelers: Vec<Traveler> = session
        .context
        .get(session_keys::TRAVELERS)
        .await
        .unwrap_or_default();

    Ok(Json(ProgressResponse {
        session_id,
        percent: progress_percent(&travelers),
        travelers: travelers
            .iter()
            .map(|t| TravelerProgress {
                id: t.id,
                name: t.display_name(),
                is_minor: t.is_minor,
                documents: t.documents,
                entry_requirements: t.entry_requirements,
                completed_flags: t.completed_flags(),
            })
            .collect(),
    }))
}

/// Logout: the session and every traveler record in it are discarded.
async fn logout(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.session_storage.delete(&session_id).await {
        Ok(()) => {
            info!(session_id = %session_id, "Session discarded");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to delete session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn build_flow() -> Flow {
    let builder = FlowBuilder::new("prearrival_documentation")
        .add_screen(Arc::new(DestinationScreen))
        .add_screen(Arc::new(TravelerSetupScreen))
        .add_screen(Arc::new(DocumentUploadScreen))
        .add_screen(Arc::new(InformationConfirmationScreen))
        .add_screen(Arc::new(VisaApplicationScreen))
        .add_screen(Arc::new(CustomsDeclarationScreen))
        .add_screen(Arc::new(HealthPassScreen))
        .add_screen(Arc::new(InsuranceScreen))
        .add_screen(Arc::new(ArrivalTaxScreen))
        .add_screen(Arc::new(PaymentScreen))
        .add_screen(Arc::new(QrCodeScreen))
        // Not on the forward path; reachable only by an explicit jump.
        .add_screen(Arc::new(BorderControlScreen));

    // Re-selecting the destination with an existing group skips traveler
    // setup, so the traveler records survive a country change.
    let builder = builder
        .add_conditional_edge(pages::DESTINATION, pages::DOCUMENT_UPLOAD, |ctx| {
            ctx.get_sync::<Vec<Traveler>>(session_keys::TRAVELERS)
                .map(|group| !group.is_empty())
                .unwrap_or(false)
        })
        .add_edge(pages::DESTINATION, pages::TRAVELER_SETUP)
        .add_edge(pages::TRAVELER_SETUP, pages::DOCUMENT_UPLOAD)
        .add_edge(pages::DOCUMENT_UPLOAD, pages::INFORMATION_CONFIRMATION)
        .add_edge(pages::INFORMATION_CONFIRMATION, pages::VISA_APPLICATION)
        .add_edge(pages::VISA_APPLICATION, pages::CUSTOMS_DECLARATION)
        .add_edge(pages::CUSTOMS_DECLARATION, pages::HEALTH_PASS)
        .add_edge(pages::HEALTH_PASS, pages::INSURANCE)
        .add_edge(pages::INSURANCE, pages::ARRIVAL_TAX)
        .add_edge(pages::ARRIVAL_TAX, pages::PAYMENT)
        .add_edge(pages::PAYMENT, pages::QR_CODE);

    builder.set_start_page(pages::DESTINATION).build()
}

async fn get_default_flow(flow_storage: Arc<dyn FlowStorage>) -> Result<Arc<Flow>, StatusCode> {
    match flow_storage.get("default").await {
        Ok(Some(flow)) => Ok(flow),
        Ok(None) => {
            error!("Default flow not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!("Failed to get flow: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_flow::{ExecutionResult, ExecutionStatus};

    async fn step(flow: &Flow, session: &mut Session, input: &str) -> ExecutionResult {
        session
            .context
            .set(session_keys::USER_INPUT, input)
            .await;
        flow.execute_session(session).await.unwrap()
    }

    async fn group(session: &Session) -> Vec<Traveler> {
        session
            .context
            .get(session_keys::TRAVELERS)
            .await
            .unwrap_or_default()
    }

    const PERSONAL: &str = r#"{"first_name": "Mina", "last_name": "Okafor", "passport_number": "P1234567", "nationality": "NG"}"#;
    const DEPARTURE: &str = r#"{"departure_country": "NG", "departure_city": "Lagos"}"#;
    const ACCOMMODATION: &str = r#"{"name": "Hotel Aster", "city": "Tokyo"}"#;
    const CONTACT: &str = r#"{"email": "mina@example.com"}"#;

    #[tokio::test(start_paused = true)]
    async fn full_flow_reaches_full_progress_and_completion() {
        let flow = build_flow();
        let mut session = Session::new(pages::DESTINATION);

        step(&flow, &mut session, r#"{"country": "jp"}"#).await;
        assert_eq!(session.current_page, pages::TRAVELER_SETUP);

        step(&flow, &mut session, r#"{"count": 2, "minors": [false, true]}"#).await;
        assert_eq!(session.current_page, pages::DOCUMENT_UPLOAD);
        assert_eq!(group(&session).await.len(), 2);

        for _ in 0..(2 * 3) {
            step(&flow, &mut session, r#"{"uploaded": true}"#).await;
        }
        assert_eq!(session.current_page, pages::INFORMATION_CONFIRMATION);

        for _ in 0..2 {
            step(&flow, &mut session, PERSONAL).await;
            step(&flow, &mut session, DEPARTURE).await;
            step(&flow, &mut session, ACCOMMODATION).await;
            step(&flow, &mut session, CONTACT).await;
        }
        assert_eq!(session.current_page, pages::VISA_APPLICATION);

        for _ in 0..2 {
            step(
                &flow,
                &mut session,
                r#"{"purpose": "tourism", "duration_days": 14}"#,
            )
            .await;
            step(&flow, &mut session, r#"{"agreed": true}"#).await;
        }
        assert_eq!(session.current_page, pages::CUSTOMS_DECLARATION);

        for _ in 0..2 {
            step(
                &flow,
                &mut session,
                r#"{"carrying_restricted_goods": false}"#,
            )
            .await;
            step(&flow, &mut session, r#"{"declared": true}"#).await;
        }
        assert_eq!(session.current_page, pages::HEALTH_PASS);

        for _ in 0..2 {
            step(
                &flow,
                &mut session,
                r#"{"has_symptoms": false, "vaccinated": true}"#,
            )
            .await;
            step(&flow, &mut session, r#"{"confirmed": true}"#).await;
        }
        assert_eq!(session.current_page, pages::INSURANCE);

        for _ in 0..2 {
            step(&flow, &mut session, r#"{"plan": "basic"}"#).await;
            step(&flow, &mut session, r#"{"agreed": true}"#).await;
        }
        assert_eq!(session.current_page, pages::ARRIVAL_TAX);

        for _ in 0..2 {
            step(&flow, &mut session, r#"{"acknowledged": true}"#).await;
        }
        assert_eq!(session.current_page, pages::PAYMENT);

        // One adult pays, the minor is exempt; payment runs straight into
        // certificate issuance.
        let result = step(&flow, &mut session, r#"{"method": "card"}"#).await;
        assert!(matches!(result.status, ExecutionStatus::Completed));
        assert_eq!(session.current_page, pages::QR_CODE);
        assert!(result.response.unwrap().contains("api.qrserver.com"));

        assert_eq!(progress_percent(&group(&session).await), 100);
    }

    #[tokio::test]
    async fn country_change_after_setup_skips_setup_and_keeps_travelers() {
        let flow = build_flow();
        let mut session = Session::new(pages::DESTINATION);

        step(&flow, &mut session, r#"{"country": "jp"}"#).await;
        step(&flow, &mut session, r#"{"count": 3}"#).await;
        let ids: Vec<_> = group(&session).await.iter().map(|t| t.id).collect();

        step(&flow, &mut session, r#"{"navigate": "destination"}"#).await;
        assert_eq!(session.current_page, pages::DESTINATION);

        step(&flow, &mut session, r#"{"country": "fr"}"#).await;
        assert_eq!(session.current_page, pages::DOCUMENT_UPLOAD);

        let after: Vec<_> = group(&session).await.iter().map(|t| t.id).collect();
        assert_eq!(after, ids);
    }

    #[tokio::test]
    async fn back_from_first_sub_step_returns_to_previous_page() {
        let flow = build_flow();
        let mut session = Session::new(pages::DESTINATION);

        step(&flow, &mut session, r#"{"country": "jp"}"#).await;
        step(&flow, &mut session, r#"{"count": 1}"#).await;
        assert_eq!(session.current_page, pages::DOCUMENT_UPLOAD);

        step(&flow, &mut session, "back").await;
        assert_eq!(session.current_page, pages::TRAVELER_SETUP);
    }

    #[tokio::test]
    async fn any_page_can_be_jumped_to_without_prerequisites() {
        let flow = build_flow();
        let mut session = Session::new(pages::DESTINATION);

        // Straight to the certificate page from a fresh session: the router
        // does not re-validate prerequisites.
        step(&flow, &mut session, r#"{"navigate": "qr_code"}"#).await;
        assert_eq!(session.current_page, pages::QR_CODE);

        let result = step(&flow, &mut session, "").await;
        assert!(result.response.unwrap().contains("No traveler group"));

        step(&flow, &mut session, r#"{"navigate": "border_control"}"#).await;
        assert_eq!(session.current_page, pages::BORDER_CONTROL);
    }
}
