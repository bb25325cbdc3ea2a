use crate::{auth::jwt::ClaimSet, error::AuthError, users::Role};

/// The authenticated party behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

impl From<&ClaimSet> for Caller {
    fn from(c: &ClaimSet) -> Self {
        Self {
            id: c.id,
            role: c.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListStudents,
    ViewStudent(i64),
    UpdateStudent(i64),
    DeleteStudent,
    RegisterUser,
}

pub fn can_access(caller: Caller, action: Action) -> bool {
    let is_admin = caller.role == Role::Admin;
    match action {
        Action::ListStudents | Action::DeleteStudent | Action::RegisterUser => is_admin,
        Action::ViewStudent(target) | Action::UpdateStudent(target) => {
            is_admin || caller.id == target
        }
    }
}

pub fn authorize(caller: Caller, action: Action) -> Result<(), AuthError> {
    if can_access(caller, action) {
        Ok(())
    } else {
        tracing::warn!(caller_id = caller.id, role = %caller.role, ?action, "access denied");
        Err(AuthError::Forbidden)
    }
}
