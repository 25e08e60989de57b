use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::auth::{
    jwt::JwtKeys,
    memory::MemoryUserRepo,
    repo::{PgUserRepo, UserRepo},
    store::CredentialStore,
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Present only when a database is configured; used for migrations.
    pub db: Option<PgPool>,
    pub credentials: CredentialStore,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (db, repo) = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                info!("using postgres user store");
                let repo = Arc::new(PgUserRepo::new(db.clone())) as Arc<dyn UserRepo>;
                (Some(db), repo)
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                (None, Arc::new(MemoryUserRepo::new()) as Arc<dyn UserRepo>)
            }
        };

        Ok(Self::from_parts(config, db, repo))
    }

    pub fn from_parts(config: Arc<AppConfig>, db: Option<PgPool>, repo: Arc<dyn UserRepo>) -> Self {
        let keys = Arc::new(JwtKeys::new(&config.jwt));
        info!(token_ttl_secs = keys.ttl().as_secs(), "token keys loaded");
        Self {
            config,
            db,
            credentials: CredentialStore::new(repo),
            keys,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60 * 24 * 7,
            },
        });
        Self::from_parts(config, None, Arc::new(MemoryUserRepo::new()))
    }
}
