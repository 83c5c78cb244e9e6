//! Authentication routes for register, login, and logout.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use biblio_core::auth::{hash_password, verify_password};
use biblio_core::authz::Role;
use biblio_db::{SessionRepository, UserRepository};
use biblio_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Creates the auth routes that require an authenticated session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/logout", get(logout))
}

/// POST /register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    // Username and password are required
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_credentials",
                "message": "Username and password are required"
            })),
        )
            .into_response();
    }

    // The original registration form lets the caller pick a role
    let role = match payload.role.as_deref() {
        None | Some("") => Role::DEFAULT,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => role,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_role",
                        "message": "Role must be one of: student, teacher, admin"
                    })),
                )
                    .into_response();
            }
        },
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let username = payload.username.trim();

    // Check if username already exists
    match user_repo.username_exists(username).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "username_taken",
                    "message": "This username is already taken"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking username");
            return internal_error("An error occurred during registration");
        }
    }

    // Hash password
    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    // Create user
    let user = match user_repo
        .create(username, &password_hash, role.into())
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, username = %user.username, "New user registered");

    (
        StatusCode::CREATED,
        Json(json!({
            "user": {
                "id": user.id,
                "username": user.username,
                "role": Role::from(&user.role).as_str()
            },
            "message": "Registration successful. Please log in."
        })),
    )
        .into_response()
}

/// POST /login - Authenticate a user and start a session.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Unknown user and wrong password are deliberately indistinguishable
    let user = match user_repo.find_by_username(payload.username.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(username = %payload.username, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    let role = Role::from(&user.role);
    let token = match state.tokens.issue(user.id, &user.username, role.as_str()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to issue session token");
            return internal_error("An error occurred during login");
        }
    };

    // Record the session server-side so logout can revoke it
    let sessions = SessionRepository::new((*state.db).clone());
    let expires_at = Utc::now() + Duration::seconds(state.tokens.expires_in());
    if let Err(e) = sessions.create(user.id, &token, expires_at).await {
        error!(error = %e, "Failed to record session");
        return internal_error("An error occurred during login");
    }

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            username: user.username,
            role: role.as_str().to_string(),
        },
        token,
        expires_in: state.tokens.expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /logout - Revoke the current session.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
) -> impl IntoResponse {
    // The middleware already validated this header; re-read it for the raw
    // token so the session row can be revoked.
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")));

    let Some(token) = token else {
        return internal_error("An error occurred during logout");
    };

    let sessions = SessionRepository::new((*state.db).clone());
    if let Err(e) = sessions.revoke(token).await {
        error!(error = %e, "Failed to revoke session");
        return internal_error("An error occurred during logout");
    }

    info!(user_id = %auth.user_id(), "User logged out");

    (
        StatusCode::OK,
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid username or password"
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
