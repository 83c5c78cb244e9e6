//! Ledger routes: the caller's own history and the admin-wide view.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use biblio_core::authz::{Action, authorize};
use biblio_db::LedgerRepository;
use biblio_db::entities::sea_orm_active_enums::TransactionKind;
use biblio_db::repositories::ledger::LedgerEntry;

/// Creates the ledger routes. All of them require authentication.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(own_transactions))
        .route("/admin/transactions", get(all_transactions))
}

/// One ledger record as the API presents it.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Record ID.
    pub id: Uuid,
    /// The referenced book.
    #[serde(rename = "bookId")]
    pub book_id: Uuid,
    /// Book title, when the book still exists.
    #[serde(rename = "bookName")]
    pub book_name: Option<String>,
    /// Book author, when the book still exists.
    #[serde(rename = "bookAuthor")]
    pub book_author: Option<String>,
    /// "Issued" or "Returned".
    pub kind: String,
    /// Event timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Acting user's username; only present in the admin view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        let kind = match entry.kind {
            TransactionKind::Issued => "Issued",
            TransactionKind::Returned => "Returned",
        };
        Self {
            id: entry.id,
            book_id: entry.book_id,
            book_name: entry.book_name,
            book_author: entry.book_author,
            kind: kind.to_string(),
            created_at: entry.created_at.to_rfc3339(),
            username: entry.username,
        }
    }
}

/// GET /transactions - The caller's own ledger, newest first.
async fn own_transactions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let ledger = LedgerRepository::new((*state.db).clone());

    match ledger.list_for_user(auth.user_id()).await {
        Ok(entries) => {
            let entries: Vec<LedgerEntryResponse> =
                entries.into_iter().map(LedgerEntryResponse::from).collect();
            (StatusCode::OK, Json(json!({ "transactions": entries }))).into_response()
        }
        Err(e) => {
            error!(error = %e, user_id = %auth.user_id(), "Failed to list user ledger");
            internal_error()
        }
    }
}

/// GET /admin/transactions - The full ledger across all users (admin only).
async fn all_transactions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if authorize(Action::ViewFullLedger, auth.role()).is_err() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "not_authorized",
                "message": "Only admins may view the full ledger"
            })),
        )
            .into_response();
    }

    let ledger = LedgerRepository::new((*state.db).clone());

    match ledger.list_all().await {
        Ok(entries) => {
            let entries: Vec<LedgerEntryResponse> =
                entries.into_iter().map(LedgerEntryResponse::from).collect();
            (StatusCode::OK, Json(json!({ "transactions": entries }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list full ledger");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
