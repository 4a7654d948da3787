// src/handlers/auth.rs
// DOCUMENTATION: Token authentication helper for protected handlers

use crate::errors::ApiError;
use crate::models::User;
use crate::services::UserService;
use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use sqlx::PgPool;

/// Resolve the `Authorization: Token <key>` header to the calling user
/// DOCUMENTATION: Called first by every protected handler; fails with 401
pub async fn authenticate(req: &HttpRequest, pool: &PgPool) -> Result<User, ApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            log::warn!("Authorization header is not valid ASCII");
            ApiError::Unauthorized(
                "Invalid token header. Token string should not contain invalid characters."
                    .to_string(),
            )
        })?),
        None => None,
    };

    UserService::authenticate_token(pool, header).await
}
