use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{provided, AuthPayload, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        repo::StoreError,
        store::CredentialStore,
    },
    error::ApiError,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const TOKEN_REQUIRED: &str = "Access token required";

/// Register / login / guard, composed from the credential store and the
/// token keys.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    keys: Arc<JwtKeys>,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.credentials.clone(), state.keys.clone())
    }
}

impl AuthService {
    pub fn new(credentials: CredentialStore, keys: Arc<JwtKeys>) -> Self {
        Self { credentials, keys }
    }

    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthPayload, ApiError> {
        let (Some(full_name), Some(email), Some(password)) = (
            provided(&req.full_name),
            provided(&req.email),
            provided(&req.password),
        ) else {
            return Err(ApiError::Validation("All fields are required".into()));
        };

        let user = match self.credentials.create(full_name, email, password).await {
            Ok(u) => u,
            Err(StoreError::Validation(msg)) => {
                warn!(reason = %msg, "registration rejected");
                return Err(ApiError::Validation(msg));
            }
            Err(StoreError::Conflict) => {
                warn!(email = %email.trim(), "email already registered");
                return Err(ApiError::Conflict(
                    "User with this email already exists".into(),
                ));
            }
            Err(StoreError::Internal(e)) => {
                return Err(ApiError::internal(
                    "Internal server error during registration",
                    e,
                ));
            }
        };

        let token = self
            .keys
            .issue(user.id)
            .map_err(|e| ApiError::internal("Internal server error during registration", e))?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthPayload {
            user: PublicUser::from(&user),
            token,
        })
    }

    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthPayload, ApiError> {
        let (Some(email), Some(password)) = (provided(&req.email), provided(&req.password))
        else {
            return Err(ApiError::Validation(
                "Email and password are required".into(),
            ));
        };
        let internal = |e: anyhow::Error| ApiError::internal("Internal server error during login", e);

        // Unknown email and wrong password must look the same to the caller.
        let user = match self.credentials.find_by_email(email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!("login unknown email");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
            Err(e) => return Err(internal(anyhow::Error::new(e))),
        };

        let ok = self
            .credentials
            .verify_password(&user, password)
            .await
            .map_err(|e| internal(anyhow::Error::new(e)))?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self
            .keys
            .issue(user.id)
            .map_err(|e| internal(anyhow::Error::new(e)))?;

        info!(user_id = %user.id, "user logged in");
        Ok(AuthPayload {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Resolves the caller from an `Authorization` header value.
    ///
    /// Missing or non-bearer header and vanished user are 401; a token that
    /// fails signature/expiry checks is 403.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<PublicUser, ApiError> {
        let header = authorization
            .ok_or_else(|| ApiError::Unauthorized(TOKEN_REQUIRED.into()))?;
        let token = bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized(TOKEN_REQUIRED.into()))?;

        let user_id = self.keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Forbidden("Invalid or expired token".into())
        })?;

        let user = self
            .credentials
            .find_by_id(user_id)
            .await
            .map_err(|e| ApiError::internal("Internal server error", anyhow::Error::new(e)))?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "token for unknown user");
                ApiError::Unauthorized("Invalid token".into())
            })?;

        Ok(PublicUser::from(&user))
    }

    /// Handlers only get here once the guard has resolved the user.
    pub fn get_profile(&self, user: PublicUser) -> PublicUser {
        user
    }
}

/// `Bearer <token>`, scheme matched case-insensitively. Anything after the
/// scheme must be a single whitespace-free token.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty() && !token.contains(char::is_whitespace)).then_some(token)
}
