use crate::entities::user::{self, Role};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// The caller resolved from the store by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

/// HS256 keys plus token lifetime, built once from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn generate_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::GenerationFail)?;

        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::GenerationFail)
    }

    /// Checks signature and expiry only; no store access.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                Err(AuthError::TokenExpired)
            }
            Err(_) => Err(AuthError::InvalidToken),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token is missing!")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("User not found")]
    UnknownSubject,
    #[error("Admin access required")]
    Forbidden,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Database error: {0}")]
    Store(#[from] DbErr),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                ApiError::Unauthorized(message)
            }
            AuthError::UnknownSubject => ApiError::NotFound(message),
            AuthError::Forbidden => ApiError::Forbidden(message),
            AuthError::GenerationFail | AuthError::Store(_) => ApiError::Internal(message),
        }
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<TokenKeys>,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Verifies the token and re-reads its subject, so deleted users are
/// rejected even while their signature is still valid.
pub async fn authenticate(
    db: &DatabaseConnection,
    keys: &TokenKeys,
    header: Option<&str>,
) -> Result<user::Model, AuthError> {
    let token = bearer_token(header)?;
    let claims = keys.validate_token(token)?;

    user::Entity::find_by_id(claims.user_id)
        .one(db)
        .await?
        .ok_or(AuthError::UnknownSubject)
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(&state.db, &state.keys, header).await {
        Ok(user) => {
            debug!(user_id = user.id, "authenticated request");
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Must be layered inside [`auth_middleware`].
pub async fn role_middleware(State(required): State<Role>, req: Request, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.role == required => next.run(req).await,
        Some(_) => ApiError::from(AuthError::Forbidden).into_response(),
        None => ApiError::from(AuthError::MissingToken).into_response(),
    }
}
