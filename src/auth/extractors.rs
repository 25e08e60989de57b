use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{dto::PublicUser, services::AuthService};
use crate::error::ApiError;

/// The authenticated caller. Extracting it runs the auth guard; a handler that
/// takes `AuthUser` never runs for a rejected request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthUser>() {
            return Ok(resolved.clone());
        }

        // A non-UTF-8 header value is treated like a malformed one.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap_or_default());

        let user = AuthService::from_ref(state).authenticate(header).await?;
        let resolved = AuthUser(user);
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}
