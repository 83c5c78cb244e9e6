//! Catalog routes: listing, adding, and deleting books.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use biblio_core::authz::{Action, authorize};
use biblio_core::catalog::BookDraft;
use biblio_db::entities::books;
use biblio_db::entities::sea_orm_active_enums::LendingState;
use biblio_db::repositories::book::CatalogError;
use biblio_db::BookRepository;

/// Creates the public catalog routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_books))
}

/// Creates the catalog routes that require authentication.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/books", post(add_book))
        .route("/delete", post(delete_book))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for adding a book. Field names follow the original form.
#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    /// Title.
    #[serde(rename = "bookName", default)]
    pub name: String,
    /// Author.
    #[serde(rename = "bookAuthor", default)]
    pub author: String,
    /// Page count; any non-numeric input coerces to 0.
    #[serde(rename = "bookPages", default)]
    pub pages: Option<Value>,
    /// Price; any non-numeric input coerces to 0.
    #[serde(rename = "bookPrice", default)]
    pub price: Option<Value>,
}

/// Request body naming a book.
#[derive(Debug, Deserialize)]
pub struct BookIdRequest {
    /// The book's ID.
    #[serde(rename = "bookId")]
    pub book_id: Uuid,
}

/// Response for a catalog item.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    /// Book ID.
    pub id: Uuid,
    /// Title.
    pub name: String,
    /// Author.
    pub author: String,
    /// Page count.
    pub pages: i32,
    /// Price.
    pub price: Decimal,
    /// Current lending state.
    pub state: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<books::Model> for BookResponse {
    fn from(book: books::Model) -> Self {
        let state = match book.lending_state {
            LendingState::Available => "Available",
            LendingState::Issued => "Issued",
        };
        Self {
            id: book.id,
            name: book.name,
            author: book.author,
            pages: book.pages,
            price: book.price,
            state: state.to_string(),
            created_at: book.created_at.to_rfc3339(),
        }
    }
}

/// Lenient numeric coercion: accepts JSON numbers and numeric strings,
/// anything else becomes `None` (and defaults to 0 downstream).
fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET / - List the catalog, newest first.
async fn list_books(State(state): State<AppState>) -> impl IntoResponse {
    let books = BookRepository::new((*state.db).clone());

    match books.list().await {
        Ok(items) => {
            let items: Vec<BookResponse> = items.into_iter().map(BookResponse::from).collect();
            (StatusCode::OK, Json(json!({ "books": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list books");
            internal_error()
        }
    }
}

/// POST /books - Add a book to the catalog.
async fn add_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddBookRequest>,
) -> impl IntoResponse {
    if let Err(e) = authorize(Action::AddBook, auth.role()) {
        return forbidden(&e.to_string());
    }

    let draft = match BookDraft::new(
        &payload.name,
        &payload.author,
        lenient_i64(payload.pages.as_ref()),
        lenient_decimal(payload.price.as_ref()),
    ) {
        Ok(draft) => draft,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let books = BookRepository::new((*state.db).clone());
    match books.create(&draft).await {
        Ok(book) => {
            info!(book_id = %book.id, user_id = %auth.user_id(), "Book added to catalog");
            (
                StatusCode::CREATED,
                Json(json!({ "book": BookResponse::from(book) })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create book");
            internal_error()
        }
    }
}

/// POST /delete - Delete a book and its ledger history (teacher/admin only).
async fn delete_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BookIdRequest>,
) -> impl IntoResponse {
    if authorize(Action::DeleteBook, auth.role()).is_err() {
        return forbidden("Not authorized to delete books");
    }

    let books = BookRepository::new((*state.db).clone());
    match books.delete(payload.book_id).await {
        Ok(()) => {
            info!(book_id = %payload.book_id, user_id = %auth.user_id(), "Book deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Book and its history deleted" })),
            )
                .into_response()
        }
        Err(CatalogError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "book_not_found",
                "message": "Book not found"
            })),
        )
            .into_response(),
        Err(CatalogError::Database(e)) => {
            error!(error = %e, "Failed to delete book");
            internal_error()
        }
    }
}

fn forbidden(message: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "not_authorized",
            "message": message
        })),
    )
        .into_response()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_i64() {
        assert_eq!(lenient_i64(Some(&json!(412))), Some(412));
        assert_eq!(lenient_i64(Some(&json!("250"))), Some(250));
        assert_eq!(lenient_i64(Some(&json!("lots"))), None);
        assert_eq!(lenient_i64(Some(&json!(null))), None);
        assert_eq!(lenient_i64(None), None);
    }

    #[test]
    fn test_lenient_decimal() {
        assert_eq!(
            lenient_decimal(Some(&json!("9.99"))),
            Some(Decimal::from_str("9.99").unwrap())
        );
        assert_eq!(
            lenient_decimal(Some(&json!(15))),
            Some(Decimal::from(15))
        );
        assert_eq!(lenient_decimal(Some(&json!("free"))), None);
        assert_eq!(lenient_decimal(None), None);
    }
}
