use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

use plangen_core::client::{ClientError, LessonPlanClient};
use plangen_core::document::LessonPlanDocument;
use plangen_core::export::legacy_document;
use plangen_core::form::{Attachment, FormField, FormInput, mime_type_for_path};
use plangen_core::render::print_page;

use crate::pages::{self, Notice};

const BUSY_NOTICE: &str =
    "A lesson plan is already being generated. Please wait for it to finish.";

/// Upper bound for a multipart submission, exemplar included.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn busy() -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: "generation already in progress".to_string(),
        }
    }

    /// Map a failed model call. The detail is logged by the client; the
    /// response carries only the generic message.
    pub fn upstream(err: &ClientError) -> Self {
        let status = if err.is_missing_credential() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::BAD_GATEWAY
        };
        Self {
            status,
            message: err.user_message().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// What the single browser session is looking at.
#[derive(Debug, Default)]
pub struct Session {
    pub form: FormInput,
    pub document: Option<LessonPlanDocument>,
    pub notice: Option<Notice>,
}

#[derive(Clone)]
pub struct AppState {
    client: LessonPlanClient,
    session: Arc<Mutex<Session>>,
    /// Held for the duration of a model call; a second caller gets 409.
    busy: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(client: LessonPlanClient) -> Self {
        Self {
            client,
            session: Arc::new(Mutex::new(Session::default())),
            busy: Arc::new(Mutex::new(())),
        }
    }

    fn try_begin(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.busy.try_lock().map_err(|_| {
            tracing::warn!("rejecting request: generation already in progress");
            AppError::busy()
        })
    }

    /// Browser-route variant of [`AppState::try_begin`]: a busy server
    /// leaves a banner for the next page load instead of a JSON 409.
    async fn try_begin_or_notice(&self) -> Result<MutexGuard<'_, ()>, Redirect> {
        match self.busy.try_lock() {
            Ok(guard) => Ok(guard),
            Err(_) => {
                tracing::warn!("form submitted while a generation is in progress");
                self.session.lock().await.notice = Some(Notice::Error(BUSY_NOTICE.to_string()));
                Err(Redirect::to("/"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/extract", post(extract))
        .route("/print", get(print))
        .route("/export/doc", get(export_doc))
        .route("/reset", post(reset))
        .route("/api/generate", post(api_generate))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(client: LessonPlanClient, bind: &str, port: u16) -> Result<()> {
    tracing::info!(
        backend = client.backend_name(),
        model = %client.settings().model,
        "using generation backend"
    );
    let app = build_router(AppState::new(client));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("plangen serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("plangen serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
    }
}

// ---------------------------------------------------------------------------
// Multipart form parsing
// ---------------------------------------------------------------------------

/// Text fields and the optional uploaded file from a form submission.
/// An empty file input (no file chosen) yields no attachment.
async fn read_form(mut multipart: Multipart) -> Result<(FormInput, Option<Attachment>), AppError> {
    let mut form = FormInput::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(AppError::bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "exemplar" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let declared = field
                .content_type()
                .filter(|ct| *ct != "application/octet-stream")
                .map(str::to_string);
            let data = field.bytes().await.map_err(AppError::bad_request)?;
            if data.is_empty() {
                continue;
            }
            let mime_type =
                declared.unwrap_or_else(|| mime_type_for_path(Path::new(&file_name)).to_string());
            upload = Some(Attachment::new(data.to_vec(), mime_type));
        } else if let Some(f) = FormField::from_name(&name) {
            let value = field.text().await.map_err(AppError::bad_request)?;
            form.set(f, value);
        } else {
            tracing::debug!(field = %name, "ignoring unknown form field");
        }
    }

    Ok((form, upload))
}

/// Merge a submission with the session: a fresh upload replaces the
/// stored exemplar, otherwise the stored one is kept.
fn submitted_form(
    session: &Session,
    mut form: FormInput,
    upload: Option<Attachment>,
) -> FormInput {
    match upload {
        Some(a) => form.attach_exemplar(a),
        None => form.exemplar = session.form.exemplar.clone(),
    }
    form
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session.lock().await;
    let notice = session.notice.take();
    let html = match &session.document {
        Some(doc) => pages::result_page(doc),
        None => pages::form_page(&session.form, notice.as_ref()),
    };
    Html(html)
}

async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let (fields, upload) = read_form(multipart).await?;
    let _busy = match state.try_begin_or_notice().await {
        Ok(guard) => guard,
        Err(redirect) => return Ok(redirect),
    };

    let form = {
        let mut session = state.session.lock().await;
        let form = submitted_form(&session, fields, upload);
        session.form = form.clone();
        form
    };

    let missing = form.missing_required();
    if !missing.is_empty() {
        let labels: Vec<String> = missing.into_iter().map(FormField::label).collect();
        let mut session = state.session.lock().await;
        session.notice = Some(Notice::Error(format!(
            "Please fill in: {}",
            labels.join(", ")
        )));
        return Ok(Redirect::to("/"));
    }

    let result = state.client.generate_lesson_plan(&form).await;

    let mut session = state.session.lock().await;
    match result {
        Ok(doc) => {
            tracing::info!(days = doc.days.len(), "lesson plan ready");
            session.document = Some(doc);
            session.notice = None;
        }
        Err(e) => {
            session.form.reset();
            session.document = None;
            session.notice = Some(Notice::Error(e.user_message().to_string()));
        }
    }
    Ok(Redirect::to("/"))
}

async fn extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let (fields, upload) = read_form(multipart).await?;
    let _busy = match state.try_begin_or_notice().await {
        Ok(guard) => guard,
        Err(redirect) => return Ok(redirect),
    };

    let form = {
        let mut session = state.session.lock().await;
        let form = submitted_form(&session, fields, upload);
        session.form = form.clone();
        form
    };

    let Some(exemplar) = &form.exemplar else {
        let mut session = state.session.lock().await;
        session.notice = Some(Notice::Error(
            "Attach an exemplar document before extracting standards.".to_string(),
        ));
        return Ok(Redirect::to("/"));
    };

    let result = state.client.extract_standards(exemplar).await;

    let mut session = state.session.lock().await;
    match result {
        Ok(extracted) => {
            session.form.apply_extracted(&extracted);
            session.notice = Some(Notice::Info(
                "Standards extracted from the exemplar.".to_string(),
            ));
        }
        Err(e) => {
            session.notice = Some(Notice::Error(e.user_message().to_string()));
        }
    }
    Ok(Redirect::to("/"))
}

async fn current_document(state: &AppState) -> Result<LessonPlanDocument, AppError> {
    state
        .session
        .lock()
        .await
        .document
        .clone()
        .ok_or_else(|| AppError::not_found("no lesson plan has been generated yet"))
}

async fn print(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let doc = current_document(&state).await?;
    Ok(Html(print_page(&doc)))
}

/// `Content-Disposition` value; non-ASCII names use the RFC 5987 form.
fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        return format!("attachment; filename=\"{file_name}\"");
    }
    let mut encoded = String::with_capacity(file_name.len() * 3);
    for b in file_name.bytes() {
        if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
            encoded.push(b as char);
        } else {
            encoded.push_str(&format!("%{b:02X}"));
        }
    }
    format!("attachment; filename=\"Lesson_Plan.doc\"; filename*=UTF-8''{encoded}")
}

async fn export_doc(State(state): State<AppState>) -> Result<Response, AppError> {
    let doc = current_document(&state).await?;
    let artifact = legacy_document(&doc);
    let disposition = HeaderValue::from_str(&content_disposition(&artifact.file_name))
        .map_err(AppError::bad_request)?;
    tracing::info!(file = %artifact.file_name, "exporting lesson plan");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(artifact.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

async fn reset(State(state): State<AppState>) -> Redirect {
    *state.session.lock().await = Session::default();
    Redirect::to("/")
}

async fn api_generate(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> Result<Json<LessonPlanDocument>, AppError> {
    let _busy = state.try_begin()?;
    let doc = state
        .client
        .generate_lesson_plan(&form)
        .await
        .map_err(|e| AppError::upstream(&e))?;
    Ok(Json(doc))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
