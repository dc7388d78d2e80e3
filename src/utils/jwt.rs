use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

/// Caller identity carried by the bearer token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub fn create_token(user: &user::Model, secret: &str, expiration_hours: i64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "desk@fleet360.local".to_string(),
            password_hash: String::new(),
            name: "Front Desk".to_string(),
            role: UserRole::Staff,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_token_carries_identity() {
        let user = staff_user();
        let token = create_token(&user, "secret", 1).unwrap();
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Staff);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = create_token(&staff_user(), "secret", 1).unwrap();
        let err = verify_token(&token, "another-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_token(&staff_user(), "secret", -2).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }
}
