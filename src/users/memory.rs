use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User, DEFAULT_ROLE};

/// In-memory user store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    failing: AtomicBool,
}

impl MemoryUserStore {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Make every write fail as if the database were unreachable.
    pub fn fail_writes(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn writable(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn active_mut<'a>(users: &'a mut [User], phone: &str) -> Option<&'a mut User> {
    users.iter_mut().find(|u| u.phone == phone && !u.is_deleted)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_verified(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| u.is_phone_verified && !u.is_deleted)
            .cloned()
            .collect())
    }

    async fn insert(&self, new_user: &NewUser) -> Result<User, StoreError> {
        self.writable()?;
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.phone == new_user.phone) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name.clone(),
            phone: new_user.phone.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: DEFAULT_ROLE.to_string(),
            is_phone_verified: false,
            is_deleted: false,
            job_category: new_user.job_category.clone(),
            job_type: new_user.job_type.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn reactivate(&self, id: Uuid, full_name: &str) -> Result<Option<User>, StoreError> {
        self.writable()?;
        let mut users = self.users.write().await;
        Ok(users
            .iter_mut()
            .find(|u| u.id == id && u.is_deleted)
            .map(|u| {
                u.is_deleted = false;
                u.is_phone_verified = false;
                u.full_name = full_name.to_string();
                u.clone()
            }))
    }

    async fn mark_verified(&self, phone: &str) -> Result<Option<User>, StoreError> {
        self.writable()?;
        let mut users = self.users.write().await;
        Ok(active_mut(&mut users, phone).map(|u| {
            u.is_phone_verified = true;
            u.clone()
        }))
    }

    async fn update_name(
        &self,
        phone: &str,
        full_name: &str,
    ) -> Result<Option<User>, StoreError> {
        self.writable()?;
        let mut users = self.users.write().await;
        Ok(active_mut(&mut users, phone).map(|u| {
            u.full_name = full_name.to_string();
            u.clone()
        }))
    }

    async fn soft_delete(&self, phone: &str) -> Result<Option<User>, StoreError> {
        self.writable()?;
        let mut users = self.users.write().await;
        Ok(active_mut(&mut users, phone).map(|u| {
            u.is_deleted = true;
            u.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, phone: &str) -> NewUser {
        NewUser {
            full_name: name.into(),
            phone: phone.into(),
            email: None,
            password_hash: None,
            job_category: None,
            job_type: None,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_phone() {
        let store = MemoryUserStore::default();
        store.insert(&new_user("Asha", "9876543210")).await.unwrap();
        let err = store
            .insert(&new_user("Ravi", "9876543210"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn phone_mutations_skip_deleted_records() {
        let store = MemoryUserStore::default();
        let user = store.insert(&new_user("Asha", "9876543210")).await.unwrap();
        assert!(store.soft_delete("9876543210").await.unwrap().is_some());

        assert!(store.update_name("9876543210", "Asha K").await.unwrap().is_none());
        assert!(store.mark_verified("9876543210").await.unwrap().is_none());
        assert!(store.soft_delete("9876543210").await.unwrap().is_none());

        let by_id = store.find_by_id(user.id).await.unwrap().expect("still stored");
        assert!(by_id.is_deleted);
    }

    #[tokio::test]
    async fn reactivate_only_applies_to_deleted_records() {
        let store = MemoryUserStore::default();
        let user = store.insert(&new_user("Asha", "9876543210")).await.unwrap();
        assert!(store.reactivate(user.id, "Asha K").await.unwrap().is_none());

        store.mark_verified("9876543210").await.unwrap();
        store.soft_delete("9876543210").await.unwrap();
        let back = store
            .reactivate(user.id, "Asha K")
            .await
            .unwrap()
            .expect("reactivated");
        assert_eq!(back.id, user.id);
        assert_eq!(back.full_name, "Asha K");
        assert!(!back.is_deleted);
        assert!(!back.is_phone_verified);
    }
}
