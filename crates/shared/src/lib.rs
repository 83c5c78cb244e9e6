//! Shared types, errors, and configuration for Biblio.
//!
//! This crate provides common types used across all other crates:
//! - Session token issuing and validation
//! - Auth request/response payloads
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod token;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use token::{SessionTokenConfig, SessionTokenService, TokenError};
