//! Caller identity supplied by the session layer

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::Role;
use crate::error::AppError;

/// JWT claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks
    pub fn require_staff(&self) -> Result<(), AppError> {
        match self.role {
            Role::Staff | Role::Admin => Ok(()),
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role >= Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "petugas".to_string(),
            role,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = claims(Role::Admin).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, "petugas");
        assert_eq!(parsed.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = claims(Role::Staff).create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_every_role_is_staff() {
        for role in [Role::Staff, Role::Admin] {
            assert!(claims(role).require_staff().is_ok());
        }
    }

    #[test]
    fn test_admin_required() {
        assert!(claims(Role::Staff).require_admin().is_err());
        assert!(claims(Role::Admin).require_admin().is_ok());
        assert!(claims(Role::Staff).require_staff().is_ok());
    }
}
