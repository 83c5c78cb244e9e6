//! Circulation routes: issuing and returning books.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::routes::catalog::BookIdRequest;
use biblio_core::lending::LendingError;
use biblio_db::CirculationRepository;
use biblio_db::entities::transactions;
use biblio_db::repositories::circulation::CirculationError;

/// Creates the circulation routes. All of them require authentication.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issue", post(issue_book))
        .route("/return", post(return_book))
}

/// POST /issue - Issue an available book to the caller.
async fn issue_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BookIdRequest>,
) -> impl IntoResponse {
    let circulation = CirculationRepository::new((*state.db).clone());

    match circulation.issue(payload.book_id, auth.user_id()).await {
        Ok(record) => {
            info!(book_id = %payload.book_id, user_id = %auth.user_id(), "Book issued");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Book issued",
                    "transaction": transaction_json(&record)
                })),
            )
                .into_response()
        }
        Err(e) => circulation_error(payload.book_id, e),
    }
}

/// POST /return - Return an issued book.
///
/// Any authenticated user may return any issued book; the ledger records
/// who performed the return, not who originally borrowed it.
async fn return_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BookIdRequest>,
) -> impl IntoResponse {
    let circulation = CirculationRepository::new((*state.db).clone());

    match circulation.return_book(payload.book_id, auth.user_id()).await {
        Ok(record) => {
            info!(book_id = %payload.book_id, user_id = %auth.user_id(), "Book returned");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Book returned",
                    "transaction": transaction_json(&record)
                })),
            )
                .into_response()
        }
        Err(e) => circulation_error(payload.book_id, e),
    }
}

fn transaction_json(record: &transactions::Model) -> serde_json::Value {
    json!({
        "id": record.id,
        "bookId": record.book_id,
        "userId": record.user_id,
        "kind": record.kind,
        "createdAt": record.created_at.to_rfc3339(),
    })
}

fn circulation_error(book_id: Uuid, e: CirculationError) -> axum::response::Response {
    match e {
        CirculationError::BookNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "book_not_found",
                "message": "Book not found"
            })),
        )
            .into_response(),
        CirculationError::Conflict(LendingError::AlreadyIssued) => {
            warn!(book_id = %book_id, "Issue rejected - book already issued");
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_issued",
                    "message": "This book is already issued to someone"
                })),
            )
                .into_response()
        }
        CirculationError::Conflict(LendingError::AlreadyAvailable) => {
            warn!(book_id = %book_id, "Return rejected - book not issued");
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_available",
                    "message": "This book is not currently issued"
                })),
            )
                .into_response()
        }
        CirculationError::Database(e) => {
            error!(error = %e, book_id = %book_id, "Database error during circulation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
