//! HTTP endpoints.
//!
//! SQLite, the blocking language-model client and the OCR subprocess all run
//! on the blocking thread pool.

use axum::extract::rejection::FormRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use rxdesk_core::dialogue::render::APOLOGY;
use rxdesk_core::{ChatReply, ChatTurn, RecordForm, RxDeskResult};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ServerError;

/// Shown instead of the listing when the database cannot be used.
pub const DB_FAILURE_TEXT: &str = "Database Connection Failed.";

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.settings.server.max_upload_bytes;

    Router::new()
        .route("/", get(list_patients))
        .route("/patients", get(list_patients))
        .route("/add", post(add_patient))
        .route("/update", post(update_patient))
        .route("/delete/:reference", get(delete_patient))
        .route("/chat", post(chat))
        .route("/scan_prescription", post(scan_prescription))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run a desk operation on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> RxDeskResult<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

async fn list_patients(State(state): State<AppState>) -> Response {
    let desk = state.desk.clone();
    match run_blocking(move || desk.listing()).await {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Listing failed");
            (StatusCode::INTERNAL_SERVER_ERROR, DB_FAILURE_TEXT).into_response()
        }
    }
}

/// Unwrap a submitted record form, reporting bad submissions as JSON errors.
fn record_form(form: Result<Form<RecordForm>, FormRejection>) -> Result<RecordForm, ServerError> {
    form.map(|Form(form)| form)
        .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))
}

async fn add_patient(
    State(state): State<AppState>,
    form: Result<Form<RecordForm>, FormRejection>,
) -> Result<Redirect, ServerError> {
    let form = record_form(form)?;
    let reference = form.reference.clone();
    let desk = state.desk.clone();
    run_blocking(move || desk.add_record(form)).await?;

    tracing::info!(reference = %reference, "Record added");
    Ok(Redirect::to("/"))
}

async fn update_patient(
    State(state): State<AppState>,
    form: Result<Form<RecordForm>, FormRejection>,
) -> Result<Redirect, ServerError> {
    let form = record_form(form)?;
    let reference = form.reference.clone();
    let desk = state.desk.clone();
    run_blocking(move || desk.update_record(form)).await?;

    tracing::info!(reference = %reference, "Record updated");
    Ok(Redirect::to("/"))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Redirect, ServerError> {
    let desk = state.desk.clone();
    let target = reference.clone();
    run_blocking(move || desk.delete_record(&target)).await?;

    tracing::info!(reference = %reference, "Record deleted");
    Ok(Redirect::to("/"))
}

async fn chat(State(state): State<AppState>, Json(turn): Json<ChatTurn>) -> Response {
    let desk = state.desk.clone();
    let today = state.today();

    match run_blocking(move || desk.chat(&turn, today)).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Chat failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ChatReply::text(APOLOGY))).into_response()
        }
    }
}

async fn scan_prescription(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::InvalidRequest(format!("Failed to read file data: {}", e)))?;
            image = Some(bytes.to_vec());
        }
    }

    let Some(image) = image else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No file uploaded" })),
        )
            .into_response());
    };

    let desk = state.desk.clone();
    let size = image.len();
    let scan = run_blocking(move || desk.scan_prescription(&image)).await?;

    tracing::info!(bytes = size, found_name = !scan.pname.is_empty(), "Prescription scanned");
    Ok(Json(scan).into_response())
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let desk = state.desk.clone();
    let database_ok = run_blocking(move || desk.open_database().map(|_| ()))
        .await
        .is_ok();

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database_ok { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": if database_ok { "ok" } else { "unavailable" },
        })),
    )
}
