use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{dto::UpdateStudentRequest, services};
use crate::{
    auth::extractors::{ApiJson, AuthUser},
    error::{AuthError, MessageBody},
    state::AppState,
    users::{PublicUser, UserSummary},
};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
}

fn parse_id(raw: &str) -> Result<i64, AuthError> {
    raw.parse::<i64>()
        .map_err(|_| AuthError::invalid("Invalid student id"))
}

#[instrument(skip(state, auth), fields(caller_id = auth.0.id))]
pub async fn list_students(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PublicUser>>, AuthError> {
    let students = services::list_students(state.store.as_ref(), auth.caller()).await?;
    Ok(Json(students))
}

#[instrument(skip(state, auth), fields(caller_id = auth.0.id))]
pub async fn get_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AuthError> {
    let id = parse_id(&id)?;
    let student = services::get_student(state.store.as_ref(), auth.caller(), id).await?;
    Ok(Json(student))
}

#[instrument(skip(state, auth, payload), fields(caller_id = auth.0.id))]
pub async fn update_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStudentRequest>,
) -> Result<Json<UserSummary>, AuthError> {
    let id = parse_id(&id)?;
    let updated =
        services::update_student(state.store.as_ref(), auth.caller(), id, payload).await?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state, auth), fields(caller_id = auth.0.id))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AuthError> {
    let id = parse_id(&id)?;
    services::delete_student(state.store.as_ref(), auth.caller(), id).await?;
    Ok(Json(MessageBody::new("Student deleted")))
}
