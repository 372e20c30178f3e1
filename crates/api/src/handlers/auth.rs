//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use crm_core::customer::CustomerDto;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`. `username` is the customer's email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthenticationResponse {
    pub token: String,
    pub customer: CustomerDto,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token and the
/// customer's public profile.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthenticationResponse>> {
    let customer = state
        .customers
        .authenticate(&input.username, &input.password)
        .await?;

    let token = issue_token(&state, &customer)?;
    tracing::info!(customer_id = customer.id, "Customer logged in");

    Ok(Json(AuthenticationResponse { token, customer }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign an access token for `customer`.
pub(crate) fn issue_token(state: &AppState, customer: &CustomerDto) -> AppResult<String> {
    generate_access_token(
        customer.id,
        &customer.email,
        &customer.roles,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}
