use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AdminSession;
use crate::server::app::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `POST /api/auth`: exchange admin credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    match state.sessions.login(&request.username, &request.password).await {
        Some(session) => {
            info!(username = %request.username, "Admin logged in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    ok: true,
                    token: Some(session.token),
                }),
            )
        }
        None => {
            warn!(username = %request.username, "Rejected admin login");
            (StatusCode::UNAUTHORIZED, Json(LoginResponse { ok: false, token: None }))
        }
    }
}

/// `DELETE /api/auth`: revoke the presented token.
pub async fn logout(session: AdminSession, State(state): State<AppState>) -> Json<LoginResponse> {
    state.sessions.logout(&session.token).await;
    Json(LoginResponse { ok: true, token: None })
}
