//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod health;
pub mod ledger;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(catalog::protected_routes())
        .merge(circulation::routes())
        .merge(ledger::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(catalog::public_routes())
        .merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use biblio_shared::{SessionTokenConfig, SessionTokenService};
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = AppState {
            db: Arc::new(DatabaseConnection::default()),
            tokens: Arc::new(SessionTokenService::new(SessionTokenConfig::default())),
        };
        api_routes_with_state(state.clone()).with_state(state)
    }

    // No Authorization header must be rejected before any database access.
    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/transactions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/admin/transactions")
                    .header("Authorization", "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
