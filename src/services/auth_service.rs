//! Authentication service - credential checks and JWT issuance.
//!
//! Access tokens authorize API calls; refresh tokens are only accepted by
//! [`AuthService::refresh`]. Both carry the principal's groups so requests
//! never hit the credential store.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, MSG_BLANK, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Kind of a signed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub groups: Vec<String>,
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned after a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    /// JWT refresh token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Fresh access token minted from a refresh token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue an access/refresh pair
    async fn login(&self, username: String, password: String) -> AppResult<TokenPair>;

    /// Exchange a refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken>;

    /// Decode an access token. Refresh tokens are rejected.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Create a principal with the given groups
    async fn create_user(
        &self,
        username: String,
        password: String,
        groups: Vec<String>,
    ) -> AppResult<User>;
}

/// Concrete implementation of AuthService over a user repository.
pub struct Authenticator<R: UserRepository> {
    users: Arc<R>,
    config: Config,
}

impl<R: UserRepository> Authenticator<R> {
    pub fn new(users: Arc<R>, config: Config) -> Self {
        Self { users, config }
    }

    fn access_lifetime(&self) -> Duration {
        Duration::minutes(self.config.access_token_minutes)
    }

    fn refresh_lifetime(&self) -> Duration {
        Duration::days(self.config.refresh_token_days)
    }

    fn sign(&self, user: &User, kind: TokenKind, lifetime: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            groups: user.groups.clone(),
            token_type: kind,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?)
    }

    fn decode_claims(&self, token: &str, expected: TokenKind) -> AppResult<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?
        .claims;

        if claims.token_type != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    fn access_token(&self, user: &User) -> AppResult<AccessToken> {
        Ok(AccessToken {
            access: self.sign(user, TokenKind::Access, self.access_lifetime())?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_minutes * SECONDS_PER_MINUTE,
        })
    }
}

#[async_trait]
impl<R: UserRepository> AuthService for Authenticator<R> {
    async fn login(&self, username: String, password: String) -> AppResult<TokenPair> {
        let user = match self.users.find_by_username(&username).await? {
            Some(user) => user,
            None => {
                // Unknown usernames cost the same as a wrong password
                Password::verify_dummy(&password);
                return Err(AppError::InvalidCredentials);
            }
        };

        let password_valid = Password::from_hash(user.password_hash.as_str()).verify(&password);
        if !password_valid || !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let access = self.access_token(&user)?;
        let refresh = self.sign(&user, TokenKind::Refresh, self.refresh_lifetime())?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(TokenPair {
            access: access.access,
            refresh,
            token_type: access.token_type,
            expires_in: access.expires_in,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = self.decode_claims(refresh_token, TokenKind::Refresh)?;

        // Group changes take effect on the next refresh
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        self.access_token(&user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.decode_claims(token, TokenKind::Access)
    }

    async fn create_user(
        &self,
        username: String,
        password: String,
        groups: Vec<String>,
    ) -> AppResult<User> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::field("username", MSG_BLANK));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .users
            .create(username, password_hash, normalize_groups(groups))
            .await?;

        tracing::info!(user_id = %user.id, groups = ?user.groups, "User created");
        Ok(user)
    }
}

/// Trim group names, drop blanks and repeats. First occurrence keeps its place.
fn normalize_groups(groups: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty() && seen.insert(g.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;

    fn config() -> Config {
        Config::new("postgres://unused", "test-secret-key-for-testing-only-32chars").unwrap()
    }

    fn stored_user() -> User {
        User::new(
            Uuid::new_v4(),
            "jaffna.clerk".to_string(),
            Password::new("SecurePass123!").unwrap().into_string(),
            vec!["JaffnaBranch".to_string(), "JaffnaTeam".to_string()],
        )
    }

    #[tokio::test]
    async fn test_login_tokens_carry_groups() {
        let user = stored_user();
        let returned = user.clone();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(returned.clone())));

        let auth = Authenticator::new(Arc::new(repo), config());
        let tokens = auth
            .login("jaffna.clerk".to_string(), "SecurePass123!".to_string())
            .await
            .unwrap();

        let claims = auth.verify_token(&tokens.access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.groups, user.groups);
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(tokens.expires_in, 3600);

        assert!(matches!(
            auth.verify_token(&tokens.refresh),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));

        let auth = Authenticator::new(Arc::new(repo), config());
        let err = auth
            .login("ghost".to_string(), "whatever123".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_rereads_groups() {
        let mut user = stored_user();
        let mut repo = MockUserRepository::new();
        let for_login = user.clone();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(for_login.clone())));
        user.groups = vec!["HeadOffice".to_string()];
        let for_refresh = user.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(for_refresh.clone())));

        let auth = Authenticator::new(Arc::new(repo), config());
        let tokens = auth
            .login("jaffna.clerk".to_string(), "SecurePass123!".to_string())
            .await
            .unwrap();
        let fresh = auth.refresh(&tokens.refresh).await.unwrap();

        let claims = auth.verify_token(&fresh.access).unwrap();
        assert_eq!(claims.groups, vec!["HeadOffice".to_string()]);
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let auth = Authenticator::new(Arc::new(MockUserRepository::new()), config());
        assert!(auth.verify_token("not.a.jwt").is_err());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_is_conflict() {
        let existing = stored_user();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().never();

        let auth = Authenticator::new(Arc::new(repo), config());
        let err = auth
            .create_user("jaffna.clerk".into(), "SecurePass123!".into(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_user_stores_each_group_once_in_order() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|username, _, groups| {
                *username == "kandy.clerk" && *groups == ["KandyBranch", "KandyTeam"]
            })
            .times(1)
            .returning(|username, hash, groups| Ok(User::new(Uuid::new_v4(), username, hash, groups)));

        let auth = Authenticator::new(Arc::new(repo), config());
        let user = auth
            .create_user(
                " kandy.clerk ".into(),
                "SecurePass123!".into(),
                vec![
                    "KandyBranch".into(),
                    " KandyTeam".into(),
                    "KandyBranch".into(),
                    "".into(),
                    "KandyTeam".into(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(user.groups, vec!["KandyBranch", "KandyTeam"]);
    }

    #[tokio::test]
    async fn test_create_user_blank_username_is_field_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().never();
        repo.expect_create().never();

        let auth = Authenticator::new(Arc::new(repo), config());
        let err = auth
            .create_user("   ".into(), "SecurePass123!".into(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap()["username"], vec![MSG_BLANK.to_string()]);
    }
}
