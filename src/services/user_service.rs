// src/services/user_service.rs
// DOCUMENTATION: Account management and token authentication
// PURPOSE: Intermediary between user handlers and the user/token repositories

use crate::db::{NewUser, TokenRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, User};
use crate::services::password::PasswordHasher;
use crate::services::token::{self, INVALID_TOKEN};
use sqlx::PgPool;
use validator::Validate;

const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

/// Lowercase the domain part of an email address, keeping the local part
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// PBKDF2 is deliberately slow, keep it off the async workers
async fn hash_password(hasher: PasswordHasher, password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            log::error!("Password hashing task failed: {}", e);
            ApiError::InternalError
        })
}

async fn verify_password(
    hasher: PasswordHasher,
    password: String,
    encoded: String,
) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
        .await
        .map_err(|e| {
            log::error!("Password verification task failed: {}", e);
            ApiError::InternalError
        })
}

pub struct UserService;

impl UserService {
    /// Create a regular account
    pub async fn create_user(
        pool: &PgPool,
        hasher: PasswordHasher,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, ApiError> {
        Self::create_account(pool, hasher, email, password, name, false).await
    }

    /// Create an account with staff and superuser flags set
    pub async fn create_superuser(
        pool: &PgPool,
        hasher: PasswordHasher,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        Self::create_account(pool, hasher, email, password, "", true).await
    }

    async fn create_account(
        pool: &PgPool,
        hasher: PasswordHasher,
        email: &str,
        password: &str,
        name: &str,
        privileged: bool,
    ) -> Result<User, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Users must have an email address.".to_string(),
            ));
        }

        let email = normalize_email(email);
        let password_hash = hash_password(hasher, password.to_string()).await?;

        UserRepository::create(
            pool,
            &NewUser {
                email: &email,
                name,
                password_hash: &password_hash,
                is_staff: privileged,
                is_superuser: privileged,
            },
        )
        .await
    }

    /// Handle POST /api/user/create
    pub async fn register(
        pool: &PgPool,
        hasher: PasswordHasher,
        req: CreateUserRequest,
    ) -> Result<User, ApiError> {
        req.validate()?;
        Self::create_user(pool, hasher, &req.email, &req.password, &req.name).await
    }

    /// Return the active user matching the credentials
    /// DOCUMENTATION: Unknown emails still pay for one hash so response time
    /// does not reveal which accounts exist. A hash produced under different
    /// settings is upgraded on success.
    pub async fn authenticate(
        pool: &PgPool,
        hasher: PasswordHasher,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = match UserRepository::find_by_email(pool, &normalize_email(email)).await? {
            Some(user) => user,
            None => {
                hash_password(hasher, password.to_string()).await?;
                return Ok(None);
            }
        };

        if !Self::check_password(hasher, &user, password).await? || !user.is_active {
            return Ok(None);
        }

        let rehashed = if hasher.needs_rehash(&user.password) {
            Some(hash_password(hasher, password.to_string()).await?)
        } else {
            None
        };
        UserRepository::record_login(pool, user.id, rehashed.as_deref()).await?;

        Ok(Some(user))
    }

    /// Compare a raw password with the user's stored hash
    pub async fn check_password(
        hasher: PasswordHasher,
        user: &User,
        raw: &str,
    ) -> Result<bool, ApiError> {
        verify_password(hasher, raw.to_string(), user.password.clone()).await
    }

    /// Handle POST /api/user/token
    pub async fn issue_token(
        pool: &PgPool,
        hasher: PasswordHasher,
        req: TokenRequest,
    ) -> Result<TokenResponse, ApiError> {
        if req.validate().is_err() {
            return Err(ApiError::ValidationError(BAD_CREDENTIALS.to_string()));
        }

        let user = Self::authenticate(pool, hasher, &req.email, &req.password)
            .await?
            .ok_or_else(|| {
                log::warn!("Token requested with invalid credentials");
                ApiError::ValidationError(BAD_CREDENTIALS.to_string())
            })?;

        let auth_token =
            TokenRepository::get_or_create(pool, user.id, &token::generate_key()).await?;
        Ok(TokenResponse {
            token: auth_token.key,
        })
    }

    /// Resolve the Authorization header value to an active user
    pub async fn authenticate_token(
        pool: &PgPool,
        header: Option<&str>,
    ) -> Result<User, ApiError> {
        let key = token::parse_authorization(header)?;

        let user = TokenRepository::find_user_by_key(pool, key)
            .await?
            .ok_or_else(|| {
                log::warn!("Request with unknown token");
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            })?;

        if !user.is_active {
            log::warn!("Request from inactive user {}", user.id);
            return Err(ApiError::Unauthorized(
                "User inactive or deleted.".to_string(),
            ));
        }

        Ok(user)
    }

    /// Handle PUT/PATCH /api/user/me
    pub async fn update_user(
        pool: &PgPool,
        hasher: PasswordHasher,
        user: &User,
        req: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        req.validate()?;

        let email = req
            .email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| user.email.clone());
        let name = req.name.unwrap_or_else(|| user.name.clone());
        let password_hash = match req.password {
            Some(password) => hash_password(hasher, password).await?,
            None => user.password.clone(),
        };

        UserRepository::update(pool, user.id, &email, &name, &password_hash).await
    }
}
