use tracing::{info, warn};

use super::dto::UpdateStudentRequest;
use crate::{
    auth::{
        password::{check_password_policy, hash_password},
        policy::{authorize, Action, Caller},
        services::{is_valid_email, normalize_email, required},
    },
    error::AuthError,
    users::{PublicUser, Role, User, UserChanges, UserStore},
};

const NOT_FOUND: AuthError = AuthError::NotFound("Student not found");

/// Only records whose role is exactly `student` are reachable here.
async fn find_student(store: &dyn UserStore, id: i64) -> Result<User, AuthError> {
    match store.find_by_id(id).await? {
        Some(u) if u.role == Role::Student => Ok(u),
        _ => Err(NOT_FOUND),
    }
}

pub async fn list_students(
    store: &dyn UserStore,
    caller: Caller,
) -> Result<Vec<PublicUser>, AuthError> {
    authorize(caller, Action::ListStudents)?;
    let rows = store.list_by_role(Role::Student).await?;
    Ok(rows.into_iter().map(PublicUser::from).collect())
}

pub async fn get_student(
    store: &dyn UserStore,
    caller: Caller,
    id: i64,
) -> Result<PublicUser, AuthError> {
    authorize(caller, Action::ViewStudent(id))?;
    find_student(store, id).await.map(PublicUser::from)
}

pub async fn update_student(
    store: &dyn UserStore,
    caller: Caller,
    id: i64,
    req: UpdateStudentRequest,
) -> Result<User, AuthError> {
    authorize(caller, Action::UpdateStudent(id))?;
    let student = find_student(store, id).await?;

    let mut changes = UserChanges {
        name: required(&req.name).map(|n| n.trim().to_string()),
        ..UserChanges::default()
    };

    if let Some(raw) = required(&req.email) {
        let email = normalize_email(raw);
        if !is_valid_email(&email) {
            return Err(AuthError::invalid("Invalid email"));
        }
        if email != student.email {
            if let Some(other) = store.find_by_email(&email).await? {
                if other.id != id {
                    warn!(%email, student_id = id, "email already in use");
                    return Err(AuthError::DuplicateEmail);
                }
            }
            changes.email = Some(email);
        }
    }

    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        check_password_policy(password)?;
        changes.password_hash = Some(hash_password(password)?);
    }

    let updated = store.update(id, changes).await?.ok_or(NOT_FOUND)?;
    info!(student_id = id, by = caller.id, "student updated");
    Ok(updated)
}

pub async fn delete_student(
    store: &dyn UserStore,
    caller: Caller,
    id: i64,
) -> Result<(), AuthError> {
    authorize(caller, Action::DeleteStudent)?;
    find_student(store, id).await?;
    if !store.delete(id).await? {
        return Err(NOT_FOUND);
    }
    info!(student_id = id, by = caller.id, "student deleted");
    Ok(())
}
