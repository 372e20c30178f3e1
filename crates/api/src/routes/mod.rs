pub mod auth;
pub mod customer;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /customers                                       list (auth), register (public)
/// /customers/{id}                                  get, update, delete (auth)
/// /customers/{id}/profile-image                    download (public), upload (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/customers", customer::router())
}
