use crate::pages;
use crate::session::{SessionHandle, SessionStore};
use axum::{
    body::Body,
    extract::{rejection::FormRejection, State},
    http::{HeaderMap, Response as HttpResponse, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use medchat_auth::CredentialStore;
use medchat_protocol::{
    serialize_json, ChatReply, HealthReport, HealthStatus, Notice,
    HEALTH_SCHEMA_VERSION,
};
use medchat_resolver::AnswerResolver;
use serde::Deserialize;
use std::sync::Arc;

pub(crate) const EMPTY_MESSAGE_REPLY: &str = "Please type a message!";

/// Everything the handlers share. Built once at startup.
pub struct AppState {
    resolver: AnswerResolver,
    credentials: CredentialStore,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(resolver: AnswerResolver, credentials: CredentialStore) -> Self {
        Self {
            resolver,
            credentials,
            sessions: SessionStore::new(),
        }
    }

    /// Replace the session table, e.g. to use a different capacity.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ChatForm {
    message: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/home", get(home))
        .route("/logout", post(logout))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to("/login")
}

async fn signup_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    Html(pages::signup_page(&pending_notices(&state, &headers)))
}

async fn login_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    Html(pages::login_page(&pending_notices(&state, &headers)))
}

async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let session = state.sessions.existing(&headers);
    let user = session.as_ref().and_then(|s| state.sessions.user(&s.id));
    Html(pages::home_page(
        &pending_notices(&state, &headers),
        user.as_deref(),
    ))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, StatusCode> {
    let Form(form) = form.map_err(bad_form)?;
    let session = open_session(&state, &headers)?;

    let target = match state.credentials.signup(&form.username, &form.password) {
        Ok(()) => {
            state.sessions.flash(
                &session.id,
                Notice::success("Sign-up successful! You can now log in."),
            );
            "/login"
        }
        Err(err) => {
            state.sessions.flash(&session.id, Notice::error(err.to_string()));
            "/signup"
        }
    };
    Ok(session.attach(Redirect::to(target).into_response()))
}

async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, StatusCode> {
    let Form(form) = form.map_err(bad_form)?;
    let session = open_session(&state, &headers)?;

    let target = match state.credentials.login(&form.username, &form.password) {
        Ok(()) => {
            state.sessions.set_user(&session.id, &form.username);
            state
                .sessions
                .flash(&session.id, Notice::success("Login successful!"));
            "/home"
        }
        Err(err) => {
            state.sessions.flash(&session.id, Notice::error(err.to_string()));
            "/login"
        }
    };
    Ok(session.attach(Redirect::to(target).into_response()))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let session = open_session(&state, &headers)?;
    state.sessions.clear(&session.id);
    state
        .sessions
        .flash(&session.id, Notice::success("You have been logged out."));
    Ok(session.attach(Redirect::to("/login").into_response()))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Result<Response, StatusCode> {
    let message = form
        .ok()
        .and_then(|Form(form)| form.message)
        .filter(|message| !message.is_empty());

    let Some(message) = message else {
        return build_response(StatusCode::OK, &ChatReply::new(EMPTY_MESSAGE_REPLY));
    };

    log::info!("Received message: {message}");
    let reply = state.resolver.answer(&message).await;
    log::info!("Generated response: {reply}");
    build_response(StatusCode::OK, &ChatReply::new(reply))
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let records = state.resolver.store().len();
    let report = HealthReport {
        schema_version: HEALTH_SCHEMA_VERSION,
        status: if records > 0 {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        },
        records,
        users: state.credentials.user_count(),
        generator: state.resolver.generator().describe(),
    };
    build_response(StatusCode::OK, &report)
}

fn pending_notices(state: &AppState, headers: &HeaderMap) -> Vec<Notice> {
    state
        .sessions
        .existing(headers)
        .map(|session| state.sessions.take_notices(&session.id))
        .unwrap_or_default()
}

fn open_session(state: &AppState, headers: &HeaderMap) -> Result<SessionHandle, StatusCode> {
    state.sessions.open(headers).map_err(|err| {
        log::error!("Failed to create session id: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn bad_form(rejection: FormRejection) -> StatusCode {
    log::debug!("Rejected form submission: {rejection}");
    StatusCode::BAD_REQUEST
}

pub(crate) fn build_response<T: serde::Serialize>(
    status: StatusCode,
    payload: &T,
) -> Result<Response, StatusCode> {
    let bytes = serialize_json(payload)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
