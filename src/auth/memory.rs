use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::{StoreError, UserRepo},
    repo_types::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Process-local user table. Data is lost on restart.
#[derive(Default)]
pub struct MemoryUserRepo {
    tables: RwLock<Tables>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let key = new_user.email.to_lowercase();
        // check + insert under one write guard
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        let user = new_user.into_user();
        tables.by_email.insert(key, user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Jane Doe".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_lookup() {
        let repo = MemoryUserRepo::new();
        let user = repo.insert(new_user("jane@x.com")).await.expect("insert");

        let by_email = repo.find_by_email("JANE@x.com").await.unwrap().expect("by email");
        assert_eq!(by_email.id, user.id);
        let by_id = repo.find_by_id(user.id).await.unwrap().expect("by id");
        assert_eq!(by_id.email, "jane@x.com");
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = MemoryUserRepo::new();
        repo.insert(new_user("jane@x.com")).await.expect("first insert");
        let err = repo.insert(new_user("Jane@X.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }
}
