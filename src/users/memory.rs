use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, Role, User, UserChanges};

/// In-process store used by the test-suite. Mirrors the unique email constraint.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn insert(&mut self, user: NewUser) -> User {
        self.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: self.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash.into_string(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(row.id, row.clone());
        row
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let g = self.inner.read().await;
        Ok(g.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let g = self.inner.read().await;
        let mut out: Vec<User> = g.rows.values().filter(|u| u.role == role).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut g = self.inner.write().await;
        if g.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        Ok(g.insert(user))
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut g = self.inner.write().await;
        if let Some(email) = changes.email.as_deref() {
            if g.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let Some(row) = g.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash.into_string();
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut g = self.inner.write().await;
        if g.email_taken(&user.email, None) {
            return Ok(None);
        }
        Ok(Some(g.insert(user)))
    }
}

/// Answers every email lookup with "absent" so that only the write-time
/// unique check stands between two records sharing an email, as when a
/// concurrent insert lands between the lookup and the write.
pub struct BlindEmailLookup(pub InMemoryUserStore);

#[async_trait]
impl UserStore for BlindEmailLookup {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.0.find_by_id(id).await
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        self.0.list_by_role(role).await
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        self.0.create(user).await
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        self.0.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.0.delete(id).await
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        self.0.create_if_absent(user).await
    }
}
