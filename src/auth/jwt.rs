use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::{JwtConfig, MAX_TTL_MINUTES};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signing and verification keys, built once from config at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes.clamp(0, MAX_TTL_MINUTES) as u64 * 60),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn claims_for(&self, user_id: Uuid, issued_at: OffsetDateTime) -> Claims {
        let exp = issued_at + TimeDuration::seconds(self.ttl.as_secs() as i64);
        Claims {
            sub: user_id,
            iat: issued_at.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let token = self.sign(&self.claims_for(user_id, OffsetDateTime::now_utc()))?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(reason = ?e.kind(), "jwt rejected");
            TokenError::Invalid(e)
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60 * 24 * 7,
        })
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("issue");
        assert_eq!(keys.verify(&token).expect("verify"), user_id);
    }

    #[test]
    fn token_lives_seven_days() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc();
        let claims = keys.claims_for(Uuid::new_v4(), now);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert_eq!(keys.ttl(), Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let keys = JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: i64::MAX,
        });
        assert_eq!(keys.ttl(), Duration::from_secs(MAX_TTL_MINUTES as u64 * 60));
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("issue");
        assert_eq!(keys.verify(&token).expect("verify"), user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let eight_days_ago = OffsetDateTime::now_utc() - TimeDuration::days(8);
        let token = keys
            .sign(&keys.claims_for(Uuid::new_v4(), eight_days_ago))
            .expect("sign");
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn just_expired_token_gets_no_leeway() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let mut claims = keys.claims_for(Uuid::new_v4(), OffsetDateTime::now_utc());
        claims.exp = (OffsetDateTime::now_utc().unix_timestamp() - 5) as usize;
        let token = keys.sign(&claims).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = make_keys("secret-a", "iss", "aud")
            .issue(Uuid::new_v4())
            .expect("issue");
        assert!(make_keys("secret-b", "iss", "aud").verify(&token).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(Uuid::new_v4()).expect("issue");
        let (head, sig) = token.rsplit_once('.').expect("three segments");
        let first = sig.chars().next().expect("signature");
        let swapped = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{head}.{swapped}{}", &sig[1..]);
        assert!(keys.verify(&tampered).is_err());
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let token = make_keys("same-secret", "good-iss", "good-aud")
            .issue(Uuid::new_v4())
            .expect("issue");
        assert!(make_keys("same-secret", "bad-iss", "good-aud").verify(&token).is_err());
        assert!(make_keys("same-secret", "good-iss", "bad-aud").verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        for bad in ["", "abc", "a.b.c", "not.a.jwt.at.all"] {
            assert!(matches!(keys.verify(bad), Err(TokenError::Invalid(_))), "{bad}");
        }
    }
}
