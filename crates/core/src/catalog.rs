//! Catalog item validation and input coercion.
//!
//! Name and author are required; the numeric fields are deliberately
//! lenient: missing, invalid, or negative input becomes 0 instead of
//! failing the request.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures for a new catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogValidationError {
    /// Name is missing or empty.
    #[error("book name is required")]
    MissingName,

    /// Author is missing or empty.
    #[error("book author is required")]
    MissingAuthor,
}

/// A validated draft for a new catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    /// Title, non-empty after trimming.
    pub name: String,
    /// Author, non-empty after trimming.
    pub author: String,
    /// Page count, non-negative.
    pub pages: i32,
    /// Price, non-negative.
    pub price: Decimal,
}

impl BookDraft {
    /// Validates and coerces raw input into a draft.
    ///
    /// Whitespace-only name or author counts as missing. Negative or absent
    /// page counts and prices coerce to 0.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogValidationError` when name or author is missing.
    pub fn new(
        name: &str,
        author: &str,
        pages: Option<i64>,
        price: Option<Decimal>,
    ) -> Result<Self, CatalogValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogValidationError::MissingName);
        }

        let author = author.trim();
        if author.is_empty() {
            return Err(CatalogValidationError::MissingAuthor);
        }

        Ok(Self {
            name: name.to_string(),
            author: author.to_string(),
            pages: coerce_pages(pages),
            price: coerce_price(price),
        })
    }
}

/// Coerces a raw page count to a non-negative `i32`, defaulting to 0.
#[must_use]
pub fn coerce_pages(pages: Option<i64>) -> i32 {
    pages
        .filter(|p| *p >= 0)
        .and_then(|p| i32::try_from(p).ok())
        .unwrap_or(0)
}

/// Coerces a raw price to a non-negative `Decimal`, defaulting to 0.
#[must_use]
pub fn coerce_price(price: Option<Decimal>) -> Decimal {
    price.filter(|p| p.is_sign_positive()).unwrap_or(Decimal::ZERO)
}
