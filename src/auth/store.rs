use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::{
    password,
    repo::{StoreError, UserRepo},
    repo_types::{NewUser, User},
    validate,
};

/// Validation, normalization and hashing on top of a [`UserRepo`].
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepo>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, full_name, email, password), fields(email = %email.trim()))]
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, StoreError> {
        let full_name = validate::full_name(full_name).map_err(StoreError::Validation)?;
        let email = validate::email(email).map_err(StoreError::Validation)?;
        validate::password(password).map_err(StoreError::Validation)?;

        let password_hash = hash_blocking(password.to_owned()).await?;
        let user = self
            .repo
            .insert(NewUser {
                full_name,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "user stored");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.repo
            .find_by_email(&validate::normalize_email(email))
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.repo.find_by_id(id).await
    }

    pub async fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, StoreError> {
        let hash = user.password_hash.clone();
        let candidate = candidate.to_owned();
        let ok = tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
            .await
            .context("password verify task")??;
        debug!(user_id = %user.id, ok, "password checked");
        Ok(ok)
    }
}

async fn hash_blocking(plain: String) -> Result<String, StoreError> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .context("password hash task")??;
    Ok(hash)
}
