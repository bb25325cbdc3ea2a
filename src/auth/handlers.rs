use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{LoginRequest, LoginResponse, RegisterRequest},
    extractors::{ApiJson, AuthUser},
    jwt::JwtKeys,
    services::{self, required, Registration},
};
use crate::{
    error::AuthError,
    state::AppState,
    users::{PublicUser, UserSummary},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let (Some(email), Some(password)) = (required(&payload.email), payload.password.as_deref())
    else {
        return Err(AuthError::invalid("Email and password are required"));
    };

    let keys = JwtKeys::from_ref(&state);
    let out = services::login(
        state.store.as_ref(),
        &keys,
        email,
        password,
        payload.role.as_deref(),
    )
    .await?;

    Ok(Json(LoginResponse {
        id: out.user.id,
        email: out.user.email,
        role: out.user.role,
        token: out.token,
    }))
}

#[instrument(skip(state, auth, payload), fields(caller_id = auth.0.id))]
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AuthError> {
    let input = Registration {
        name: required(&payload.name),
        email: required(&payload.email),
        password: payload.password.as_deref(),
        role: payload.role.as_deref(),
    };
    let user = services::register(state.store.as_ref(), auth.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, auth), fields(caller_id = auth.0.id))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let me = services::get_self(state.store.as_ref(), auth.0.id).await?;
    Ok(Json(me))
}
