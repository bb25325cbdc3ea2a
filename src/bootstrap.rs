use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{check_password_policy, hash_password, prepare_dummy_hash},
        services::normalize_email,
    },
    config::AdminSeed,
    error::AuthError,
    users::{NewUser, Role, UserStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { id: i64 },
    AlreadyPresent,
}

/// Seeds the administrator at most once for the lifetime of the value.
pub struct AdminBootstrap {
    done: OnceCell<SeedOutcome>,
}

impl AdminBootstrap {
    pub const fn new() -> Self {
        Self {
            done: OnceCell::const_new(),
        }
    }

    pub async fn run(
        &self,
        store: &dyn UserStore,
        seed: &AdminSeed,
    ) -> Result<SeedOutcome, AuthError> {
        prepare_dummy_hash();
        self.done
            .get_or_try_init(|| seed_admin(store, seed))
            .await
            .copied()
    }
}

impl Default for AdminBootstrap {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the administrator when no record holds its email. An existing
/// record is left exactly as it is, including its password.
async fn seed_admin(store: &dyn UserStore, seed: &AdminSeed) -> Result<SeedOutcome, AuthError> {
    let email = normalize_email(&seed.email);

    if let Some(existing) = store.find_by_email(&email).await? {
        if existing.role != Role::Admin {
            warn!(%email, user_id = existing.id, role = %existing.role, "seed admin email belongs to a non-admin account; leaving it untouched");
        }
        return Ok(SeedOutcome::AlreadyPresent);
    }

    check_password_policy(&seed.password)?;
    let created = store
        .create_if_absent(NewUser {
            name: seed.name.trim().to_string(),
            email: email.clone(),
            password_hash: hash_password(&seed.password)?,
            role: Role::Admin,
        })
        .await?;

    match created {
        Some(user) => {
            info!(user_id = user.id, %email, "administrator account created");
            Ok(SeedOutcome::Created { id: user.id })
        }
        None => Ok(SeedOutcome::AlreadyPresent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::password::verify_password, users::memory::InMemoryUserStore};

    fn seed() -> AdminSeed {
        AdminSeed {
            email: "Admin@ISET.TN".into(),
            name: "Administrateur".into(),
            password: "admin123".into(),
        }
    }

    #[tokio::test]
    async fn creates_admin_once() {
        let store = InMemoryUserStore::default();
        let boot = AdminBootstrap::new();

        let first = boot.run(&store, &seed()).await.unwrap();
        assert!(matches!(first, SeedOutcome::Created { .. }));
        assert_eq!(boot.run(&store, &seed()).await.unwrap(), first);

        let admin = store.find_by_email("admin@iset.tn").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("admin123", &admin.password_hash));
    }

    #[tokio::test]
    async fn existing_admin_password_survives_restart() {
        let store = InMemoryUserStore::default();
        AdminBootstrap::new().run(&store, &seed()).await.unwrap();

        let admin = store.find_by_email("admin@iset.tn").await.unwrap().unwrap();
        let changed = crate::users::UserChanges {
            password_hash: Some(hash_password("operator-chosen").unwrap()),
            ..Default::default()
        };
        store.update(admin.id, changed).await.unwrap();

        // A fresh process start.
        let outcome = AdminBootstrap::new().run(&store, &seed()).await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPresent);

        let admin = store.find_by_email("admin@iset.tn").await.unwrap().unwrap();
        assert!(verify_password("operator-chosen", &admin.password_hash));
        assert!(!verify_password("admin123", &admin.password_hash));
    }
}
