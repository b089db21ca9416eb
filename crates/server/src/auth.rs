//! Operator credentials and JWT issuing/validation.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use configs::ServerConfig;

use crate::errors::{ApiError, StartupError};

const TOKEN_TTL_HOURS: i64 = 12;

/// The single seeded operator account and the token signing secret.
pub struct AuthState {
    jwt_secret: String,
    admin_username: String,
    admin_password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl AuthState {
    pub fn new(cfg: &ServerConfig) -> Result<Self, StartupError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(cfg.admin_password.as_bytes(), &salt)
            .map_err(|e| StartupError::InvalidConfig(format!("admin password hash: {e}")))?
            .to_string();
        Ok(Self {
            jwt_secret: cfg.jwt_secret.clone(),
            admin_username: cfg.admin_username.clone(),
            admin_password_hash: hash,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.admin_username {
            return false;
        }
        PasswordHash::new(&self.admin_password_hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }

    pub fn issue_token(&self, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(|e| ApiError::internal(format!("token generation failed: {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &key, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_and_wrong_secret_fails() {
        let auth = AuthState::new(&ServerConfig::default()).unwrap();
        assert!(auth.verify("admin", "password123"));
        assert!(!auth.verify("admin", "nope"));
        assert!(!auth.verify("root", "password123"));

        let token = auth.issue_token("admin").unwrap();
        assert_eq!(auth.validate_token(&token).unwrap().sub, "admin");

        let other = AuthState::new(&ServerConfig { jwt_secret: "other".into(), ..ServerConfig::default() }).unwrap();
        assert!(other.validate_token(&token).is_err());
    }
}
