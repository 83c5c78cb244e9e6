//! Core business logic for Biblio.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state transitions live here.
//!
//! # Modules
//!
//! - `lending` - The lending state machine for catalog items
//! - `authz` - Role-based authorization gate
//! - `catalog` - Catalog item validation and input coercion
//! - `auth` - Password hashing

pub mod auth;
pub mod authz;
pub mod catalog;
pub mod lending;
