//!
//! chalet HTTP server
//! ------------------
//! This module defines the Axum-based HTTP API for chalet.
//!
//! Responsibilities:
//! - Registration and login endpoints issuing signed bearer tokens.
//! - Bearer-token middleware attaching the caller identity to each request
//!   before any handler logic runs.
//! - Rental listing/creation/update with ownership enforcement on mutation.
//! - Multipart picture ingestion through the upload sandbox.
//! - Message creation against rentals.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{
    is_owner, register, resolve_from_credentials, AuthenticatedCaller, RegisterRequest, TokenIssuer,
};
use crate::store::{
    MemoryMessageStore, MemoryRentalStore, MemoryUserStore, Message, Rental, SharedMessageStore,
    SharedRentalStore, SharedUserStore, User,
};
use crate::uploads::FileIngestor;

/// Shared server state injected into all handlers.
///
/// Stores are trait objects so the persistence backend stays swappable; the
/// token issuer and upload ingestor are immutable after startup and safe for
/// unsynchronized concurrent reads.
#[derive(Clone)]
pub struct AppState {
    pub users: SharedUserStore,
    pub rentals: SharedRentalStore,
    pub messages: SharedMessageStore,
    pub issuer: Arc<TokenIssuer>,
    pub ingestor: Arc<FileIngestor>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            rentals: Arc::new(MemoryRentalStore::new()),
            messages: Arc::new(MemoryMessageStore::new()),
            issuer: Arc::new(TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            ingestor: Arc::new(FileIngestor::new(&config.upload_dir, &config.public_base_url)),
        }
    }
}

/// Build the full application router over the given state.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/user/{id}", get(get_user))
        .route("/api/rentals", get(list_rentals).post(create_rental))
        .route("/api/rentals/{id}", get(get_rental).put(update_rental))
        .route("/api/messages", post(create_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/", get(|| async { "chalet ok" }))
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

/// Start the chalet HTTP server from environment configuration.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(
        upload_dir = %config.upload_dir,
        public_base = %config.public_base_url,
        token_ttl_secs = config.token_ttl.as_secs(),
        "chalet starting on {}", addr
    );
    let state = AppState::from_config(&config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Bearer-token gate for all authenticated routes. Verifies the token and
/// attaches the caller to the request; absent or invalid tokens never reach a
/// handler.
async fn require_bearer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return AppError::unauthorized("missing_token", "authentication required").into_response();
    };
    match state.issuer.verify(token) {
        Ok(subject) => {
            req.extensions_mut().insert(AuthenticatedCaller { subject });
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

// ---- DTOs ----

/// Outbound identity view; never carries the password hash.
#[derive(Debug, Serialize)]
struct UserDto {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self { id: u.id, name: u.name, email: u.email, created_at: u.created_at, updated_at: u.updated_at }
    }
}

#[derive(Debug, Serialize)]
struct RentalDto {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    surface: u32,
    price: f64,
    picture: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Rental> for RentalDto {
    fn from(r: Rental) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            surface: r.surface,
            price: r.price,
            picture: r.picture,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ---- Auth endpoints ----

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    // Adaptive hashing is CPU-bound; keep it off the reactor.
    let users = state.users.clone();
    let user = tokio::task::spawn_blocking(move || register(&*users, &payload))
        .await
        .map_err(|e| AppError::internal("join".to_string(), e.to_string()))??;
    info!(email = %user.email, "user registered");
    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let users = state.users.clone();
    let subject = tokio::task::spawn_blocking(move || {
        resolve_from_credentials(&*users, &payload.email, &payload.password)
    })
    .await
    .map_err(|e| AppError::internal("join".to_string(), e.to_string()))??;
    let token = state.issuer.issue(&subject)?;
    info!(subject = %subject, "login succeeded");
    Ok(Json(json!({ "token": token })))
}

async fn me(State(state): State<AppState>, caller: AuthenticatedCaller) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_email(&caller.subject)
        .ok_or_else(|| AppError::not_found("user_missing", "user not found"))?;
    Ok(Json(UserDto::from(user)))
}

async fn get_user(
    State(state): State<AppState>,
    _caller: AuthenticatedCaller,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(id)
        .ok_or_else(|| AppError::not_found("user_missing", "user not found"))?;
    Ok(Json(UserDto::from(user)))
}

// ---- Rental endpoints ----

async fn list_rentals(State(state): State<AppState>, _caller: AuthenticatedCaller) -> impl IntoResponse {
    let rentals: Vec<RentalDto> = state.rentals.find_all().into_iter().map(RentalDto::from).collect();
    Json(json!({ "rentals": rentals }))
}

async fn get_rental(
    State(state): State<AppState>,
    _caller: AuthenticatedCaller,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let rental = state
        .rentals
        .find_by_id(id)
        .ok_or_else(|| AppError::not_found("rental_missing", "rental not found"))?;
    Ok(Json(RentalDto::from(rental)))
}

/// Fields accepted by the multipart rental create/update forms.
#[derive(Debug, Default)]
struct RentalForm {
    name: Option<String>,
    surface: Option<u32>,
    price: Option<f64>,
    description: Option<String>,
    picture: Option<(String, Vec<u8>)>,
}

async fn read_rental_form(mut multipart: Multipart) -> AppResult<RentalForm> {
    let mut form = RentalForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid("bad_multipart".to_string(), e.to_string()))?
    {
        let Some(field_name) = field.name().map(str::to_string) else { continue };
        match field_name.as_str() {
            "name" => form.name = Some(text_field(field).await?),
            "surface" => {
                let raw = text_field(field).await?;
                form.surface = Some(raw.parse().map_err(|_| {
                    AppError::invalid("bad_surface", "surface must be a positive integer")
                })?);
            }
            "price" => {
                let raw = text_field(field).await?;
                form.price = Some(raw.parse().map_err(|_| {
                    AppError::invalid("bad_price", "price must be a number")
                })?);
            }
            "description" => form.description = Some(text_field(field).await?),
            "picture" => {
                let original = field.file_name().unwrap_or("picture").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid("bad_multipart".to_string(), e.to_string()))?;
                form.picture = Some((original, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::invalid("bad_multipart".to_string(), e.to_string()))
}

fn validate_rental_fields(name: &str, surface: u32, price: f64, description: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid("bad_name", "name cannot be blank"));
    }
    if description.trim().is_empty() {
        return Err(AppError::invalid("bad_description", "description cannot be blank"));
    }
    if surface == 0 {
        return Err(AppError::invalid("bad_surface", "surface must be greater than 0"));
    }
    if !(price > 0.0) {
        return Err(AppError::invalid("bad_price", "price must be positive"));
    }
    Ok(())
}

async fn create_rental(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_rental_form(multipart).await?;
    let name = form.name.ok_or_else(|| AppError::invalid("bad_name", "name cannot be blank"))?;
    let surface = form.surface.ok_or_else(|| AppError::invalid("bad_surface", "surface is required"))?;
    let price = form.price.ok_or_else(|| AppError::invalid("bad_price", "price is required"))?;
    let description = form
        .description
        .ok_or_else(|| AppError::invalid("bad_description", "description cannot be blank"))?;
    validate_rental_fields(&name, surface, price, &description)?;
    let (original, bytes) = form
        .picture
        .ok_or_else(|| AppError::invalid("missing_picture", "picture is required"))?;

    let owner = state
        .users
        .find_by_email(&caller.subject)
        .ok_or_else(|| AppError::not_found("owner_missing", "owner not found"))?;

    let picture_url = state.ingestor.store(&bytes, &original)?;

    let now = Utc::now();
    let rental = Rental {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name,
        surface,
        price,
        description,
        picture: Some(picture_url),
        created_at: now,
        updated_at: now,
    };
    let rental = state.rentals.save(rental)?;
    info!(rental_id = %rental.id, owner = %caller.subject, "rental created");
    Ok((StatusCode::CREATED, Json(json!({ "message": "Rental created!" }))))
}

async fn update_rental(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    // Ownership gate before anything else mutates or writes.
    if !is_owner(&*state.rentals, &*state.users, id, &caller.subject)? {
        return Err(AppError::forbidden("not_owner", "caller does not own this rental"));
    }
    let form = read_rental_form(multipart).await?;
    let name = form.name.ok_or_else(|| AppError::invalid("bad_name", "name cannot be blank"))?;
    let surface = form.surface.ok_or_else(|| AppError::invalid("bad_surface", "surface is required"))?;
    let price = form.price.ok_or_else(|| AppError::invalid("bad_price", "price is required"))?;
    let description = form
        .description
        .ok_or_else(|| AppError::invalid("bad_description", "description cannot be blank"))?;
    validate_rental_fields(&name, surface, price, &description)?;

    let mut rental = state
        .rentals
        .find_by_id(id)
        .ok_or_else(|| AppError::not_found("rental_missing", "rental not found"))?;

    // Picture is optional on update; a new one goes through the sandbox first.
    if let Some((original, bytes)) = form.picture {
        if !bytes.is_empty() {
            rental.picture = Some(state.ingestor.store(&bytes, &original)?);
        }
    }
    rental.name = name;
    rental.surface = surface;
    rental.price = price;
    rental.description = description;
    rental.updated_at = Utc::now();
    state.rentals.save(rental)?;
    info!(rental_id = %id, owner = %caller.subject, "rental updated");
    Ok(Json(json!({ "message": "Rental updated!" })))
}

// ---- Message endpoints ----

#[derive(Debug, Deserialize)]
struct MessagePayload {
    rental_id: Uuid,
    user_id: Uuid,
    message: String,
}

async fn create_message(
    State(state): State<AppState>,
    _caller: AuthenticatedCaller,
    Json(payload): Json<MessagePayload>,
) -> AppResult<impl IntoResponse> {
    if payload.message.trim().is_empty() {
        return Err(AppError::invalid("bad_message", "message cannot be blank"));
    }
    if state.rentals.find_by_id(payload.rental_id).is_none() {
        return Err(AppError::not_found("rental_missing", "rental not found"));
    }
    if state.users.find_by_id(payload.user_id).is_none() {
        return Err(AppError::not_found("user_missing", "user not found"));
    }
    let now = Utc::now();
    state.messages.save(Message {
        id: Uuid::new_v4(),
        rental_id: payload.rental_id,
        user_id: payload.user_id,
        message: payload.message,
        created_at: now,
        updated_at: now,
    })?;
    Ok(Json(json!({ "message": "Message sent with success" })))
}
