use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Argon2 PHC string. Only [`hash_password`] can build one.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Length policy applied to raw passwords before they reach the hasher.
pub fn check_password_policy(plain: &str) -> Result<(), AuthError> {
    let len = plain.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AuthError::invalid(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(HashedPassword(hash))
}

/// Mismatch and malformed hashes both yield `false`.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        error!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

lazy_static! {
    static ref DUMMY_HASH: String = hash_password("timing-equalizer-not-a-password")
        .map(HashedPassword::into_string)
        .unwrap_or_default();
}

/// Builds the dummy hash up front so the first unknown-email login pays one
/// Argon2 run, not two.
pub fn prepare_dummy_hash() {
    lazy_static::initialize(&DUMMY_HASH);
}

/// Burns one verification so that unknown accounts cost the same as wrong passwords.
pub fn verify_against_dummy(plain: &str) {
    let _ = verify_password(plain, &DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, hash.as_str()));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", hash.as_str()));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("admin12345").unwrap();
        let b = hash_password("admin12345").unwrap();
        assert_ne!(a, b);
        assert!(!a.as_str().contains("admin12345"));
    }

    #[test]
    fn policy_enforces_length_bounds() {
        assert!(check_password_policy("short").is_err());
        assert!(check_password_policy("exactly8").is_ok());
        assert!(check_password_policy(&"x".repeat(128)).is_ok());
        assert!(check_password_policy(&"x".repeat(129)).is_err());
    }

    #[test]
    fn prepared_dummy_hash_is_usable() {
        prepare_dummy_hash();
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
        assert!(!verify_password("timing-equalizer", &DUMMY_HASH));
    }

    #[test]
    fn debug_hides_hash() {
        let hash = hash_password("whatever-pass").unwrap();
        assert_eq!(format!("{:?}", hash), "HashedPassword(..)");
    }
}
