//! HTTP routes and the access guard filter

use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::AUTHORIZATION;
use warp::http::{HeaderMap, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::auth::credential::PasswordHasher;
use crate::auth::guard::AccessGuard;
use crate::auth::token::{Claims, TokenCodec};
use crate::config::ServerConfig;
use crate::constants::MAX_BODY_BYTES;
use crate::error::GymGuardError;
use crate::handlers::auth::AccountService;
use crate::security::headers::with_api_security_headers;
use crate::storage::CredentialRepository;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub guard: AccessGuard,
}

impl AppState {
    /// Build the auth components once from startup configuration
    pub fn from_config(
        config: &ServerConfig,
        repository: Arc<dyn CredentialRepository>,
    ) -> crate::error::Result<Self> {
        let codec = Arc::new(TokenCodec::new(
            &config.token_secret,
            config.mac_algorithm,
            config.token_lifetime,
        )?);
        let hasher = Arc::new(PasswordHasher::new(config.hashing_cost)?);

        let cost = hasher.cost();
        log::info!(
            "Tokens: {} with {}s lifetime; passwords: Argon2id m={}KiB t={} p={}",
            codec.algorithm(),
            codec.lifetime().as_secs(),
            cost.memory_kib,
            cost.iterations,
            cost.parallelism
        );
        let accounts =
            AccountService::new(repository, hasher, codec.clone(), config.min_auth_duration)?;

        Ok(Self {
            accounts,
            guard: AccessGuard::new(codec),
        })
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Raised by [`with_identity`] for any guard rejection
#[derive(Debug)]
pub struct Unauthorized;

impl warp::reject::Reject for Unauthorized {}

/// Extracts the verified claims of the caller or rejects with [`Unauthorized`]
pub fn with_identity(
    guard: AccessGuard,
) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let guard = guard.clone();
        async move {
            let auth_header = headers
                .get(AUTHORIZATION)
                .map(|value| value.to_str().unwrap_or_default());
            guard
                .authorize(auth_header)
                .map_err(|_| warp::reject::custom(Unauthorized))
        }
    })
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All routes with CORS, rejection handling and security headers applied
pub fn routes(
    state: Arc<AppState>,
    allowed_origins: &[String],
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "message": "Backend is alive" })));

    let register = warp::path("register")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_register);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_login);

    let dashboard = warp::path("dashboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_identity(state.guard.clone()))
        .map(|claims: Claims| {
            warp::reply::json(&json!({
                "message": "Welcome to dashboard",
                "logged_in_user": claims,
            }))
        });

    let cors = warp::cors()
        .allow_origins(allowed_origins.iter().map(String::as_str))
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"])
        .allow_credentials(true);

    health
        .or(register)
        .or(login)
        .or(dashboard)
        .with(cors)
        .recover(handle_rejection)
        .map(|reply| with_api_security_headers(reply))
}

async fn handle_register(
    request: RegisterRequest,
    state: Arc<AppState>,
) -> Result<Response, Infallible> {
    let result = state
        .accounts
        .register(&request.name, &request.email, &request.password)
        .await;

    Ok(match result {
        Ok(account) => warp::reply::with_status(
            warp::reply::json(&json!({
                "message": "User registered successfully",
                "user": account,
            })),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => error_response(&e),
    })
}

async fn handle_login(request: LoginRequest, state: Arc<AppState>) -> Result<Response, Infallible> {
    Ok(match state.accounts.login(&request.email, &request.password).await {
        Ok(outcome) => warp::reply::json(&json!({
            "status": "success",
            "user": outcome.user,
            "token": outcome.token,
            "expires_at": outcome.expires_at,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": message })), status)
        .into_response()
}

/// Map a crate error onto a response without exposing internals
pub fn error_response(err: &GymGuardError) -> Response {
    match err {
        GymGuardError::CredentialMismatch => {
            detail(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        GymGuardError::Unauthorized | GymGuardError::Token(_) => {
            detail(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        GymGuardError::ValidationError(msg) => detail(StatusCode::BAD_REQUEST, msg),
        GymGuardError::AccountExists => detail(StatusCode::CONFLICT, &err.to_string()),
        other => {
            log::error!("Request failed: {}", other);
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Turn warp rejections into JSON responses
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let response = if err.find::<Unauthorized>().is_some() {
        detail(StatusCode::UNAUTHORIZED, "Unauthorized")
    } else if err.is_not_found() {
        detail(StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        detail(StatusCode::FORBIDDEN, "Origin not allowed")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        detail(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
    {
        detail(StatusCode::BAD_REQUEST, "Invalid request body")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        detail(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(response)
}
