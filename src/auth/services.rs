use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    jwt::{ClaimSet, JwtKeys},
    password::{check_password_policy, hash_password, verify_against_dummy, verify_password},
    policy::{authorize, Action, Caller},
};
use crate::{
    error::AuthError,
    users::{NewUser, PublicUser, Role, User, UserStore},
};

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Treats absent and blank input the same way.
pub(crate) fn required<'a>(field: &'a Option<String>) -> Option<&'a str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

/// Successful login: the record and its freshly signed token.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
    requested_role: Option<&str>,
) -> Result<LoginOutcome, AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::invalid("Email and password are required"));
    }

    // No role filter here: the role is checked only once identity is confirmed.
    let Some(user) = store.find_by_email(&email).await? else {
        verify_against_dummy(password);
        warn!(%email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    if let Some(requested) = requested_role.filter(|r| !r.is_empty()) {
        if requested.parse::<Role>().ok() != Some(user.role) {
            warn!(user_id = user.id, actual = %user.role, "login role mismatch");
            return Err(AuthError::RoleMismatch);
        }
    }

    let token = keys.issue(&ClaimSet {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    })?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(LoginOutcome { user, token })
}

/// Validated registration input.
pub struct Registration<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub role: Option<&'a str>,
}

pub async fn register<'a>(
    store: &dyn UserStore,
    caller: Caller,
    input: Registration<'a>,
) -> Result<User, AuthError> {
    let present = |v: Option<&'a str>| v.filter(|v| !v.trim().is_empty());
    let (Some(name), Some(email), Some(password)) =
        (present(input.name), present(input.email), present(input.password))
    else {
        return Err(AuthError::invalid("Name, email and password are required"));
    };

    authorize(caller, Action::RegisterUser)?;

    let name = name.trim();
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AuthError::invalid("Invalid email"));
    }
    check_password_policy(password)?;
    let role = match input.role.filter(|r| !r.is_empty()) {
        None => Role::default(),
        Some(r) => r.parse::<Role>().map_err(|e| AuthError::invalid(e.to_string()))?,
    };

    if store.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    // A concurrent insert that slips past the check above surfaces as DuplicateEmail here.
    let user = store
        .create(NewUser {
            name: name.to_string(),
            email,
            password_hash: hash_password(password)?,
            role,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, role = %user.role, by = caller.id, "user registered");
    Ok(user)
}

pub async fn get_self(store: &dyn UserStore, caller_id: i64) -> Result<PublicUser, AuthError> {
    store
        .find_by_id(caller_id)
        .await?
        .map(PublicUser::from)
        .ok_or(AuthError::NotFound("User not found"))
}
