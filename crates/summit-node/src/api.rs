//! HTTP API for the demon list.
//!
//! Status mapping: not-found 404, duplicate 409, malformed or
//! invariant-violating input 400, bad credentials 403, storage failure
//! 500, success 200 (201 for account registration). Error bodies are
//! `{"error": "..."}` JSON.

use crate::account::Account;
use crate::error::{Error, Result};
use crate::node::NodeState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use summit_core::{
    Completion, CompletionState, Demon, DemonEdit, LeaderboardRow, MoveOutcome, PositionRecord,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

type AppState = Arc<NodeState>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Demons
        .route("/api/demons", get(list_demons))
        .route("/api/demons", post(create_demon))
        .route("/api/demons/:id", patch(edit_demon))
        .route("/api/demons/:id", delete(delete_demon))
        .route("/api/demons/:id/position", patch(move_demon))
        .route("/api/demons/:id/history", get(demon_history))
        // Completions
        .route("/api/completions", get(list_completions))
        .route("/api/completions", post(submit_completion))
        .route("/api/completions/:id", patch(update_completion))
        // Leaderboard
        .route("/api/leaderboard", get(leaderboard))
        // Accounts
        .route("/api/login", post(login))
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts", post(register))
        .route("/api/accounts/:username/ban", patch(set_ban))
        // Static frontend assets
        .nest_service("/public", ServeDir::new(&state.config.public_dir))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Reject absent, non-positive, or absurd positions before they reach the
/// list.
fn parse_position(position: Option<i64>) -> Result<u32> {
    match position {
        Some(p) if p >= 1 && p <= u32::MAX as i64 => Ok(p as u32),
        _ => Err(Error::InvalidInput(
            "position must be a positive integer".to_string(),
        )),
    }
}

/// Missing and empty required fields both reject as 400.
fn require(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::InvalidInput(format!("{} is required", field))),
    }
}

// --- Demon endpoints ---

async fn list_demons(State(state): State<AppState>) -> Json<Vec<Demon>> {
    Json(state.demons.demons().await)
}

#[derive(Debug, Deserialize)]
struct CreateDemonRequest {
    id: Option<String>,
    name: Option<String>,
    position: Option<i64>,
    difficulty: Option<String>,
    creator: Option<String>,
    verifier: Option<String>,
}

async fn create_demon(
    State(state): State<AppState>,
    Json(req): Json<CreateDemonRequest>,
) -> Result<Json<Value>> {
    let id = require(req.id, "id")?;
    let name = require(req.name, "name")?;
    let position = parse_position(req.position)?;

    let mut demon = Demon::new(id, name);
    demon.difficulty = req.difficulty;
    demon.creator = req.creator;
    demon.verifier = req.verifier;

    state.demons.insert(demon, position).await?;
    Ok(Json(json!({ "success": true })))
}

async fn edit_demon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(edit): Json<DemonEdit>,
) -> Result<Json<Demon>> {
    let demon = state.demons.edit(&id, edit).await?;
    Ok(Json(demon))
}

async fn delete_demon(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    state.demons.remove(&id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct MoveDemonRequest {
    position: Option<i64>,
}

async fn move_demon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveDemonRequest>,
) -> Result<Json<Value>> {
    let position = parse_position(req.position)?;
    let body = match state.demons.move_to(&id, position).await? {
        MoveOutcome::Moved { from, to } => {
            json!({ "changed": true, "from": from, "position": to })
        }
        MoveOutcome::Unchanged => json!({ "changed": false, "position": position }),
    };
    Ok(Json(body))
}

async fn demon_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PositionRecord>>> {
    let records = state.demons.history(&id).await?;
    Ok(Json(records))
}

// --- Completion endpoints ---

async fn list_completions(State(state): State<AppState>) -> Json<Vec<Completion>> {
    Json(state.completions.all().await)
}

#[derive(Debug, Deserialize)]
struct SubmitCompletionRequest {
    user: Option<String>,
    demon: Option<String>,
    evidence: Option<String>,
}

async fn submit_completion(
    State(state): State<AppState>,
    Json(req): Json<SubmitCompletionRequest>,
) -> Result<Json<Completion>> {
    let user = require(req.user, "user")?;
    let demon = require(req.demon, "demon")?;
    let evidence = require(req.evidence, "evidence")?;

    let completion = state.completions.submit(user, demon, evidence).await?;
    Ok(Json(completion))
}

#[derive(Debug, Deserialize)]
struct UpdateCompletionRequest {
    state: Option<String>,
}

async fn update_completion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompletionRequest>,
) -> Result<Json<Completion>> {
    let target = match req.state.as_deref() {
        Some("approved") => CompletionState::Approved,
        Some("rejected") => CompletionState::Rejected,
        Some("invalidated") => CompletionState::Invalidated,
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown completion state: {}",
                other.unwrap_or("(missing)")
            )))
        }
    };

    let completion = state
        .completions
        .transition(&id, target, &state.demons)
        .await?;
    Ok(Json(completion))
}

// --- Leaderboard ---

async fn leaderboard(State(state): State<AppState>) -> Json<Vec<LeaderboardRow>> {
    let completions = state.completions.all().await;
    Json(state.demons.ranking(&completions).await)
}

// --- Account endpoints ---

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let username = require(req.username, "username")?;
    let password = require(req.password, "password")?;
    let role = require(req.role, "role")?;

    state
        .accounts
        .register(Account::new(username, password, role))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    username: String,
    role: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let username = require(req.username, "username")?;
    let password = require(req.password, "password")?;

    let account = state.accounts.login(&username, &password).await?;
    Ok(Json(LoginResponse {
        username: account.username,
        role: account.role,
    }))
}

/// Account listing entry - passwords never leave the server.
#[derive(Debug, Serialize)]
struct AccountInfo {
    username: String,
    role: String,
    banned: bool,
}

async fn list_accounts(State(state): State<AppState>) -> Json<Vec<AccountInfo>> {
    let accounts = state
        .accounts
        .all()
        .await
        .into_iter()
        .map(|a| AccountInfo {
            username: a.username,
            role: a.role,
            banned: a.banned,
        })
        .collect();
    Json(accounts)
}

#[derive(Debug, Deserialize)]
struct BanRequest {
    banned: Option<bool>,
}

async fn set_ban(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<BanRequest>,
) -> Result<Json<Value>> {
    let banned = req
        .banned
        .ok_or_else(|| Error::InvalidInput("banned must be true or false".to_string()))?;
    let account = state.accounts.set_banned(&username, banned).await?;
    Ok(Json(json!({ "success": true, "banned": account.banned })))
}
