use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::constants::MAX_UPLOAD_BYTES;
use crate::errors::SubmitError;
use crate::form::{FormField, FormInput};
use crate::images::UploadedImage;
use crate::openai::ChatClient;
use crate::prompt::ImageMode;
use crate::submission::{Brief, Submission};
use crate::template::PromptTemplate;

const PAGE_TITLE: &str = "Design Project Assistant";

// Shared application state. Immutable; every request brings its own form.
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    client: ChatClient,
}

impl AppState {
    pub fn new(template_dir: impl Into<PathBuf>, client: ChatClient) -> Self {
        AppState {
            templates: Arc::new(create_minijinja_env(template_dir.into())),
            client,
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env(template_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&template_dir));
        // Watch the templates directory for changes
        notifier.watch_path(&template_dir, true);
        Ok(env)
    })
}

#[derive(Debug)]
enum WebError {
    Form(MultipartError),
    Render(minijinja::Error),
}

impl From<MultipartError> for WebError {
    fn from(e: MultipartError) -> Self {
        WebError::Form(e)
    }
}

impl From<minijinja::Error> for WebError {
    fn from(e: minijinja::Error) -> Self {
        WebError::Render(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Form(e) => {
                warn!("Rejected form post: {}", e);
                // 413 when the body limit is hit, 400 otherwise.
                (e.status(), format!("Invalid form: {}", e)).into_response()
            }
            WebError::Render(e) => {
                error!("Failed to get or render template: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!("Internal Server Error: {}", e)),
                )
                    .into_response()
            }
        }
    }
}

/// Everything a form post carries. Uploads stay raw until submission so a
/// bad file is reported in the result column instead of rejecting the post.
/// The key is rendered back into its password input so it survives autofill.
#[derive(Debug, Default)]
struct PostedForm {
    form: FormInput,
    uploads: Vec<(String, Vec<u8>)>,
    template: PromptTemplate,
    api_key: Option<String>,
    image_mode: ImageMode,
}

impl PostedForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut posted = PostedForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "images" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file is chosen.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    posted.uploads.push((file_name, bytes.to_vec()));
                }
                "api_key" => posted.api_key = Some(field.text().await?),
                "context" => posted.template.context = field.text().await?,
                "message" => posted.template.message = field.text().await?,
                "forward_images" => {
                    field.text().await?;
                    posted.image_mode = ImageMode::Forward;
                }
                other => match FormField::from_key(other) {
                    Some(form_field) => posted.form.set(form_field, field.text().await?),
                    None => warn!(field = other, "Ignoring unknown form field"),
                },
            }
        }
        Ok(posted)
    }

    fn to_submission(&self) -> Result<Submission, SubmitError> {
        let images = self
            .uploads
            .iter()
            .map(|(name, bytes)| UploadedImage::from_upload(name.clone(), bytes.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Submission {
            form: self.form.clone(),
            images,
            template: self.template.clone(),
            api_key: self.api_key.clone(),
            image_mode: self.image_mode,
        })
    }
}

#[derive(Serialize)]
struct FieldView {
    key: &'static str,
    section: &'static str,
    first_in_section: bool,
    question: &'static str,
    placeholder: &'static str,
    long: bool,
    value: String,
}

fn field_views(form: &FormInput) -> Vec<FieldView> {
    let mut previous_section = "";
    FormField::ALL
        .into_iter()
        .map(|field| {
            let first_in_section = field.section() != previous_section;
            previous_section = field.section();
            FieldView {
                key: field.key(),
                section: field.section(),
                first_in_section,
                question: field.question(),
                placeholder: field.sample_answer(),
                long: field.is_long_text(),
                value: form.get(field).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutcomeView {
    Warning { message: String },
    Error { message: String },
    Brief { brief: Brief, degraded: bool },
}

impl From<&SubmitError> for OutcomeView {
    fn from(e: &SubmitError) -> Self {
        if e.is_warning() {
            OutcomeView::Warning {
                message: e.to_string(),
            }
        } else {
            OutcomeView::Error {
                message: e.to_string(),
            }
        }
    }
}

#[derive(Serialize)]
struct DebugView {
    request: String,
    response: Option<String>,
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Runs one submission for the page, keeping the request for the debugging
/// panel whether or not the model answered.
async fn run_submission(client: &ChatClient, posted: &PostedForm) -> (OutcomeView, Option<DebugView>) {
    let submission = match posted.to_submission() {
        Ok(submission) => submission,
        Err(e) => return (OutcomeView::from(&e), None),
    };
    let attempt = submission.attempt(client).await;
    let error_body = attempt.error_body().map(str::to_string);

    match attempt.result {
        Ok(report) => {
            let debug = DebugView {
                request: pretty(&report.request),
                response: Some(pretty(&report.response)),
            };
            (
                OutcomeView::Brief {
                    brief: report.brief,
                    degraded: report.degraded,
                },
                Some(debug),
            )
        }
        Err(e) => {
            let debug = attempt.request.map(|request| DebugView {
                request: pretty(&request),
                response: error_body,
            });
            (OutcomeView::from(&e), debug)
        }
    }
}

fn render_page(
    state: &AppState,
    posted: &PostedForm,
    outcome: Option<OutcomeView>,
    debug: Option<DebugView>,
) -> Result<Html<String>, WebError> {
    let env = state.templates.acquire_env()?;
    let tmpl = env.get_template("index.html")?;
    let html = tmpl.render(minijinja::context! {
        title => PAGE_TITLE,
        fields => field_views(&posted.form),
        context => &posted.template.context,
        message => &posted.template.message,
        forward_images => posted.image_mode == ImageMode::Forward,
        api_key => posted.api_key.as_deref().unwrap_or_default(),
        outcome => outcome,
        debug => debug,
    })?;
    Ok(Html(html))
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render_page(&state, &PostedForm::default(), None, None)
}

async fn autofill_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, WebError> {
    let mut posted = PostedForm::read(multipart).await?;
    posted.form.apply_autofill();
    render_page(&state, &posted, None, None)
}

async fn submit_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, WebError> {
    let posted = PostedForm::read(multipart).await?;
    info!(
        images = posted.uploads.len(),
        mode = ?posted.image_mode,
        "Received submission"
    );
    let (outcome, debug) = run_submission(&state.client, &posted).await;
    render_page(&state, &posted, Some(outcome), debug)
}

pub fn build_router(state: AppState, static_dir: impl Into<PathBuf>) -> Router {
    // Serve static files from the `static` directory
    let static_files_service = ServeDir::new(static_dir.into()).not_found_service(
        tower::service_fn(|_req: Request| async {
            Ok::<_, Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        }),
    );

    Router::new()
        .route("/", get(index_handler))
        .route("/autofill", post(autofill_handler))
        .route("/submit", post(submit_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(
    port: u16,
    template_dir: PathBuf,
    static_dir: PathBuf,
    client: ChatClient,
) -> Result<()> {
    info!(url = client.url(), model = client.model(), "Using chat completion endpoint");
    let app = build_router(AppState::new(template_dir, client), static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    // Bind using tokio::net::TcpListener
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
