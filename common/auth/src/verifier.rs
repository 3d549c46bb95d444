use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::AuthResult;

#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let key = DecodingKey::from_secret(config.secret.as_bytes());
        Self { config, key }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_aud = false;
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &self.key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(tenant = %claims.tenant, "verified JWT successfully");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::signer::{TokenSigner, TokenSubject};
    use chrono::{Duration, Utc};

    fn config() -> JwtConfig {
        JwtConfig::new("unit-test-secret", "meal-service")
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: "7c3a2b10-0000-4000-8000-000000000001".to_string(),
            email: "ana@example.com".to_string(),
            tenant: "T1".to_string(),
            role: "Cook".to_string(),
        }
    }

    #[test]
    fn verifier_accepts_freshly_issued_token() {
        let signer = TokenSigner::new(&config());
        let verifier = JwtVerifier::new(config());

        let issued = signer.issue(&subject()).expect("issue");
        let claims = verifier.verify(&issued.token).expect("verification succeeds");

        assert_eq!(claims.subject, subject().user_id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.tenant, "T1");
        assert_eq!(claims.role, "Cook");
        assert_eq!(claims.issuer, "meal-service");
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn verifier_accepts_token_near_end_of_window() {
        let signer = TokenSigner::new(&config());
        let verifier = JwtVerifier::new(config());

        let issued = signer
            .issue_at(&subject(), Utc::now() - Duration::minutes(59))
            .expect("issue");
        assert!(verifier.verify(&issued.token).is_ok());
    }

    #[test]
    fn verifier_rejects_expired_token() {
        let signer = TokenSigner::new(&config());
        let verifier = JwtVerifier::new(config());

        let issued = signer
            .issue_at(&subject(), Utc::now() - Duration::minutes(61))
            .expect("issue");
        let err = verifier.verify(&issued.token).expect_err("expired");
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[test]
    fn verifier_rejects_foreign_signature() {
        let signer = TokenSigner::new(&JwtConfig::new("someone-else", "meal-service"));
        let verifier = JwtVerifier::new(config());

        let issued = signer.issue(&subject()).expect("issue");
        assert!(matches!(
            verifier.verify(&issued.token),
            Err(AuthError::Verification(_))
        ));
    }

    #[test]
    fn verifier_rejects_other_issuer() {
        let signer = TokenSigner::new(&JwtConfig::new("unit-test-secret", "other"));
        let verifier = JwtVerifier::new(config());

        let issued = signer.issue(&subject()).expect("issue");
        assert!(verifier.verify(&issued.token).is_err());
    }

    #[test]
    fn verifier_rejects_garbage() {
        let verifier = JwtVerifier::new(config());
        assert!(matches!(
            verifier.verify("not-a-token"),
            Err(AuthError::Verification(_))
        ));
    }
}
